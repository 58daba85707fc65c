//! Face detection collaborator interface
//!
//! The cascade itself is external; this module defines the contract the
//! frame loop calls into, plus [`ThreadedDetector`], which runs any
//! detector on a worker thread and buffers the most recent completed
//! result so a slow cascade never stalls the render clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::frame::LumaBuffer;
use crate::pipeline::Detection;

/// Per-frame face detector.
///
/// Given a luma buffer (dimensions carried on the buffer), returns an
/// ordered sequence of detections, possibly empty. Must be
/// deterministic per input buffer and must not mutate it.
/// Implementations may be stateful, hence `&mut self`.
pub trait FaceDetector {
    fn detect(&mut self, luma: &LumaBuffer) -> Vec<Detection>;
}

/// Detector that never reports a face. Placeholder for wiring the demo
/// shell before a real cascade is plugged in, and the no-detection stub
/// in tests.
pub struct NullDetector;

impl FaceDetector for NullDetector {
    fn detect(&mut self, _luma: &LumaBuffer) -> Vec<Detection> {
        Vec::new()
    }
}

/// Runs a detector on a dedicated thread.
///
/// `detect` submits the luma buffer without blocking (dropping it if the
/// worker is still busy) and returns the latest completed result. The
/// frame loop therefore never skips more than the current tick's worth
/// of detection work.
pub struct ThreadedDetector {
    latest: Arc<Mutex<Vec<Detection>>>,
    sender: Option<Sender<LumaBuffer>>,
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
}

impl ThreadedDetector {
    pub fn new<D>(mut inner: D) -> Result<Self, String>
    where
        D: FaceDetector + Send + 'static,
    {
        let latest = Arc::new(Mutex::new(Vec::new()));
        let running = Arc::new(AtomicBool::new(true));

        let (sender, receiver) = crossbeam_channel::bounded::<LumaBuffer>(2);

        let latest_clone = latest.clone();
        let running_clone = running.clone();

        let thread_handle = std::thread::Builder::new()
            .name("face-detect".to_string())
            .spawn(move || {
                log::info!("Face detection thread started");
                while let Ok(luma) = receiver.recv() {
                    let detections = inner.detect(&luma);
                    *latest_clone.lock() = detections;
                }
                running_clone.store(false, Ordering::Release);
                log::info!("Face detection thread stopped");
            })
            .map_err(|e| format!("Failed to spawn detection thread: {}", e))?;

        Ok(Self {
            latest,
            sender: Some(sender),
            running,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the worker thread.
    pub fn stop(&mut self) {
        // Dropping the sender ends the worker's recv loop.
        self.sender = None;
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl FaceDetector for ThreadedDetector {
    fn detect(&mut self, luma: &LumaBuffer) -> Vec<Detection> {
        if let Some(ref sender) = self.sender {
            let _ = sender.try_send(luma.clone());
        }
        self.latest.lock().clone()
    }
}

impl Drop for ThreadedDetector {
    fn drop(&mut self) {
        self.stop();
    }
}
