//! Camera frame source
//!
//! Captures frames with nokhwa on a background thread and exposes them
//! through the [`FrameSource`] trait. Device acquisition is asynchronous
//! on every platform, so the source reports [`SourcePoll::NotReady`]
//! until the first frame has actually arrived; the frame loop degrades
//! gracefully on those ticks instead of blocking the render clock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use parking_lot::Mutex;

use crate::frame::RawFrame;

/// Result of polling the frame source on a tick.
pub enum SourcePoll {
    /// A new frame, at the pipeline's fixed dimensions.
    Ready(RawFrame),
    /// No new frame this tick (device still initializing, or no capture
    /// completed since the last poll).
    NotReady,
}

/// Synchronous, non-blocking frame supplier polled once per tick.
pub trait FrameSource {
    fn poll_frame(&mut self) -> SourcePoll;
}

/// Numbered frame slot shared with the capture thread.
type FrameSlot = Arc<Mutex<Option<(u64, RawFrame)>>>;

/// Camera capture running on a background thread.
///
/// Triple-buffered: the capture thread rotates through three slots and
/// publishes the index of the most recent complete frame, so the render
/// thread never waits on a capture in progress. Each captured frame is
/// delivered at most once; polling again before the next capture
/// completes yields `NotReady`.
pub struct CameraCapture {
    frames: [FrameSlot; 3],
    latest_frame_idx: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
    width: u32,
    height: u32,
    frame_count: Arc<AtomicU64>,
    last_delivered: Option<u64>,
}

impl CameraCapture {
    /// Open camera `camera_index` and start capturing at a fixed
    /// `width` x `height`. Frames the device delivers at any other
    /// resolution are resampled to the requested size on the capture
    /// thread, so the pipeline's dimensions never change mid-stream.
    pub fn new(camera_index: u32, width: u32, height: u32) -> Result<Self, String> {
        let frames: [FrameSlot; 3] = [
            Arc::new(Mutex::new(None)),
            Arc::new(Mutex::new(None)),
            Arc::new(Mutex::new(None)),
        ];
        let latest_frame_idx = Arc::new(AtomicU64::new(0));
        let running = Arc::new(AtomicBool::new(true));
        let frame_count = Arc::new(AtomicU64::new(0));

        let frames_clone = frames.clone();
        let latest_frame_idx_clone = latest_frame_idx.clone();
        let running_clone = running.clone();
        let frame_count_clone = frame_count.clone();

        let thread_handle = std::thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || {
                Self::capture_thread(
                    camera_index,
                    width,
                    height,
                    frames_clone,
                    latest_frame_idx_clone,
                    running_clone,
                    frame_count_clone,
                );
            })
            .map_err(|e| format!("Failed to spawn capture thread: {}", e))?;

        Ok(Self {
            frames,
            latest_frame_idx,
            running,
            thread_handle: Some(thread_handle),
            width,
            height,
            frame_count,
            last_delivered: None,
        })
    }

    fn capture_thread(
        camera_index: u32,
        width: u32,
        height: u32,
        frames: [FrameSlot; 3],
        latest_frame_idx: Arc<AtomicU64>,
        running: Arc<AtomicBool>,
        frame_count: Arc<AtomicU64>,
    ) {
        log::info!("Starting camera capture thread (camera {})", camera_index);

        let index = CameraIndex::Index(camera_index);
        let requested =
            RequestedFormat::new::<RgbAFormat>(RequestedFormatType::AbsoluteHighestResolution);

        let mut camera = match Camera::new(index.clone(), requested) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to open camera with highest resolution: {:?}", e);
                let fallback = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::None);
                match Camera::new(index, fallback) {
                    Ok(c) => c,
                    Err(e2) => {
                        log::error!("Failed to open camera: {:?}", e2);
                        return;
                    }
                }
            }
        };

        if let Err(e) = camera.open_stream() {
            log::error!("Failed to open camera stream: {:?}", e);
            return;
        }

        log::info!(
            "Camera opened: {} ({}x{})",
            camera.info().human_name(),
            camera.resolution().width(),
            camera.resolution().height()
        );

        let mut write_idx: u64 = 0;

        while running.load(Ordering::Acquire) {
            match camera.frame() {
                Ok(frame) => {
                    let decoded = match frame.decode_image::<RgbAFormat>() {
                        Ok(image) => image,
                        Err(e) => {
                            log::warn!("Failed to decode frame: {:?}", e);
                            continue;
                        }
                    };

                    let src_w = frame.resolution().width();
                    let src_h = frame.resolution().height();
                    let mut rgba = decoded.into_raw();
                    if src_w != width || src_h != height {
                        rgba = resample_rgba(&rgba, src_w, src_h, width, height);
                    }

                    let raw = match RawFrame::new(rgba, width, height) {
                        Ok(raw) => raw,
                        Err(e) => {
                            log::warn!("Dropping malformed capture: {}", e);
                            continue;
                        }
                    };

                    let frame_num = frame_count.fetch_add(1, Ordering::Relaxed);
                    let slot = (write_idx % 3) as usize;
                    *frames[slot].lock() = Some((frame_num, raw));

                    latest_frame_idx.store(write_idx, Ordering::Release);
                    write_idx = write_idx.wrapping_add(1);
                }
                Err(e) => {
                    log::warn!("Failed to capture frame: {:?}", e);
                    std::thread::sleep(std::time::Duration::from_millis(10));
                }
            }
        }

        log::info!("Camera capture thread stopped");
    }

    /// The fixed stream resolution.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Frames captured since startup.
    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop capturing and join the thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl FrameSource for CameraCapture {
    fn poll_frame(&mut self) -> SourcePoll {
        let idx = self.latest_frame_idx.load(Ordering::Acquire);
        let slot = (idx % 3) as usize;
        let latest = self.frames[slot].lock().clone();
        match latest {
            Some((number, raw)) if self.last_delivered != Some(number) => {
                self.last_delivered = Some(number);
                SourcePoll::Ready(raw)
            }
            _ => SourcePoll::NotReady,
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Nearest-neighbor resample of an RGBA buffer to the target size.
fn resample_rgba(data: &[u8], src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Vec<u8> {
    let mut output = vec![0u8; (dst_w * dst_h * 4) as usize];
    let x_ratio = src_w as f32 / dst_w as f32;
    let y_ratio = src_h as f32 / dst_h as f32;

    for y in 0..dst_h {
        for x in 0..dst_w {
            let src_x = ((x as f32 * x_ratio) as u32).min(src_w - 1);
            let src_y = ((y as f32 * y_ratio) as u32).min(src_h - 1);
            let src_idx = ((src_y * src_w + src_x) * 4) as usize;
            let dst_idx = ((y * dst_w + x) * 4) as usize;
            output[dst_idx..dst_idx + 4].copy_from_slice(&data[src_idx..src_idx + 4]);
        }
    }

    output
}
