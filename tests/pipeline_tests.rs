//! End-to-end frame loop tests with stub collaborators.

use std::collections::VecDeque;
use std::sync::Arc;

use image::RgbaImage;
use parking_lot::Mutex;

use face_overlay::camera::{FrameSource, SourcePoll};
use face_overlay::detect::FaceDetector;
use face_overlay::error::PipelineError;
use face_overlay::frame::{LumaBuffer, RawFrame};
use face_overlay::overlay::{OverlayError, OverlayPlayer};
use face_overlay::pipeline::{
    AnchorPolicy, Detection, FrameLoopController, OverlayTransform, PresentSurface,
};

fn solid_frame(r: u8, g: u8, b: u8, width: u32, height: u32) -> RawFrame {
    let data: Vec<u8> = (0..width * height).flat_map(|_| [r, g, b, 255]).collect();
    RawFrame::new(data, width, height).unwrap()
}

struct ScriptedSource {
    polls: VecDeque<SourcePoll>,
}

impl ScriptedSource {
    fn new(polls: Vec<SourcePoll>) -> Self {
        Self {
            polls: polls.into(),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn poll_frame(&mut self) -> SourcePoll {
        self.polls.pop_front().unwrap_or(SourcePoll::NotReady)
    }
}

#[derive(Default)]
struct DetectorStats {
    calls: usize,
    last_luma: Option<LumaBuffer>,
}

struct StubDetector {
    stats: Arc<Mutex<DetectorStats>>,
    script: VecDeque<Vec<Detection>>,
}

impl StubDetector {
    fn new(script: Vec<Vec<Detection>>) -> (Self, Arc<Mutex<DetectorStats>>) {
        let stats = Arc::new(Mutex::new(DetectorStats::default()));
        (
            Self {
                stats: stats.clone(),
                script: script.into(),
            },
            stats,
        )
    }
}

impl FaceDetector for StubDetector {
    fn detect(&mut self, luma: &LumaBuffer) -> Vec<Detection> {
        let mut stats = self.stats.lock();
        stats.calls += 1;
        stats.last_luma = Some(luma.clone());
        self.script.pop_front().unwrap_or_default()
    }
}

#[derive(Default)]
struct PlayerStats {
    advances: usize,
    placements: Vec<Option<OverlayTransform>>,
}

struct StubPlayer {
    stats: Arc<Mutex<PlayerStats>>,
    native: (u32, u32),
    fail_on_advance: Option<usize>,
}

impl StubPlayer {
    fn new(native: (u32, u32)) -> (Self, Arc<Mutex<PlayerStats>>) {
        let stats = Arc::new(Mutex::new(PlayerStats::default()));
        (
            Self {
                stats: stats.clone(),
                native,
                fail_on_advance: None,
            },
            stats,
        )
    }

    fn failing_on(mut self, advance: usize) -> Self {
        self.fail_on_advance = Some(advance);
        self
    }
}

impl OverlayPlayer for StubPlayer {
    fn native_size(&self) -> (u32, u32) {
        self.native
    }

    fn advance_and_composite(
        &mut self,
        _target: &mut RgbaImage,
        placement: Option<&OverlayTransform>,
    ) -> Result<(), OverlayError> {
        let mut stats = self.stats.lock();
        stats.advances += 1;
        stats.placements.push(placement.copied());
        if self.fail_on_advance == Some(stats.advances) {
            return Err(OverlayError::Decode("stub decode failure".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct SurfaceStats {
    presented: Vec<RgbaImage>,
}

struct StubSurface {
    stats: Arc<Mutex<SurfaceStats>>,
}

impl StubSurface {
    fn new() -> (Self, Arc<Mutex<SurfaceStats>>) {
        let stats = Arc::new(Mutex::new(SurfaceStats::default()));
        (
            Self {
                stats: stats.clone(),
            },
            stats,
        )
    }
}

impl PresentSurface for StubSurface {
    fn present(&mut self, image: &RgbaImage) -> anyhow::Result<()> {
        self.stats.lock().presented.push(image.clone());
        Ok(())
    }
}

#[test]
fn test_all_black_frame_end_to_end() {
    let source = ScriptedSource::new(vec![SourcePoll::Ready(solid_frame(0, 0, 0, 4, 4))]);
    let (detector, det_stats) = StubDetector::new(vec![]);
    let (player, player_stats) = StubPlayer::new((40, 40));
    let (mut surface, surface_stats) = StubSurface::new();

    let mut controller = FrameLoopController::new(source, detector, player, 4, 4);
    let report = controller.tick(&mut surface).unwrap();

    assert!(report.processed);
    assert_eq!(report.face_count, 0);
    assert_eq!(report.anchor, None);

    // The detector saw an all-zero luma buffer of the right size.
    let det = det_stats.lock();
    assert_eq!(det.calls, 1);
    let luma = det.last_luma.as_ref().unwrap();
    assert_eq!(luma.width, 4);
    assert_eq!(luma.height, 4);
    assert!(luma.data.iter().all(|&v| v == 0));

    // The overlay advanced but was given no placement.
    let player = player_stats.lock();
    assert_eq!(player.advances, 1);
    assert_eq!(player.placements, vec![None]);

    // Presented image is black-opaque, byte-identical to the input.
    let presented = surface_stats.lock();
    assert_eq!(presented.presented.len(), 1);
    assert!(presented.presented[0]
        .pixels()
        .all(|p| p.0 == [0, 0, 0, 255]));
}

#[test]
fn test_not_ready_represents_prior_image_untouched() {
    let source = ScriptedSource::new(vec![
        SourcePoll::Ready(solid_frame(200, 10, 10, 4, 4)),
        SourcePoll::NotReady,
    ]);
    let (detector, det_stats) = StubDetector::new(vec![]);
    let (player, player_stats) = StubPlayer::new((40, 40));
    let (mut surface, surface_stats) = StubSurface::new();

    let mut controller = FrameLoopController::new(source, detector, player, 4, 4);
    let first = controller.tick(&mut surface).unwrap();
    let second = controller.tick(&mut surface).unwrap();

    assert!(first.processed);
    assert!(!second.processed);

    // Skipped tick: no detector call, no player advance.
    assert_eq!(det_stats.lock().calls, 1);
    assert_eq!(player_stats.lock().advances, 1);

    // The prior image was re-presented unchanged.
    let presented = surface_stats.lock();
    assert_eq!(presented.presented.len(), 2);
    assert_eq!(presented.presented[0], presented.presented[1]);
}

#[test]
fn test_player_advances_once_per_completed_tick() {
    let source = ScriptedSource::new(vec![
        SourcePoll::Ready(solid_frame(0, 0, 0, 4, 4)),
        SourcePoll::Ready(solid_frame(0, 0, 0, 4, 4)),
        SourcePoll::Ready(solid_frame(0, 0, 0, 4, 4)),
    ]);
    let (detector, _) = StubDetector::new(vec![]);
    let (player, player_stats) = StubPlayer::new((40, 40));
    let (mut surface, _) = StubSurface::new();

    let mut controller = FrameLoopController::new(source, detector, player, 4, 4);
    for _ in 0..3 {
        controller.tick(&mut surface).unwrap();
    }

    // No face ever appeared, yet playback advanced every tick.
    let player = player_stats.lock();
    assert_eq!(player.advances, 3);
    assert!(player.placements.iter().all(|p| p.is_none()));
}

#[test]
fn test_anchor_placement_and_hold_last_policy() {
    let detection = Detection {
        row_center: 120.0,
        col_center: 300.0,
        size: 40.0,
    };
    let frames = vec![
        SourcePoll::Ready(solid_frame(0, 0, 0, 640, 480)),
        SourcePoll::Ready(solid_frame(0, 0, 0, 640, 480)),
    ];
    let source = ScriptedSource::new(frames);
    // Face on the first frame only.
    let (detector, _) = StubDetector::new(vec![vec![detection], vec![]]);
    let (player, player_stats) = StubPlayer::new((40, 40));
    let (mut surface, _) = StubSurface::new();

    let mut controller = FrameLoopController::new(source, detector, player, 640, 480)
        .with_policy(AnchorPolicy::HoldLast);

    let first = controller.tick(&mut surface).unwrap();
    let anchor = first.anchor.unwrap();
    // row maps to y, col to x; radius = 40 * 1.5.
    assert_eq!(anchor.x, 300.0);
    assert_eq!(anchor.y, 120.0);
    assert_eq!(anchor.radius, 60.0);

    let expected = OverlayTransform {
        scale: 1.5,
        offset_x: 270.0,
        offset_y: 90.0,
    };
    assert_eq!(player_stats.lock().placements, vec![Some(expected)]);

    // Faceless frame: the held anchor keeps the overlay placed.
    let second = controller.tick(&mut surface).unwrap();
    assert_eq!(second.face_count, 0);
    assert_eq!(second.anchor, Some(anchor));
    assert_eq!(
        player_stats.lock().placements,
        vec![Some(expected), Some(expected)]
    );
}

#[test]
fn test_clear_policy_hides_overlay_on_faceless_frames() {
    let detection = Detection {
        row_center: 50.0,
        col_center: 60.0,
        size: 20.0,
    };
    let source = ScriptedSource::new(vec![
        SourcePoll::Ready(solid_frame(0, 0, 0, 100, 100)),
        SourcePoll::Ready(solid_frame(0, 0, 0, 100, 100)),
    ]);
    let (detector, _) = StubDetector::new(vec![vec![detection], vec![]]);
    let (player, player_stats) = StubPlayer::new((40, 40));
    let (mut surface, _) = StubSurface::new();

    let mut controller = FrameLoopController::new(source, detector, player, 100, 100)
        .with_policy(AnchorPolicy::Clear);

    let first = controller.tick(&mut surface).unwrap();
    assert!(first.anchor.is_some());

    let second = controller.tick(&mut surface).unwrap();
    assert_eq!(second.anchor, None);

    let player = player_stats.lock();
    assert_eq!(player.advances, 2);
    assert!(player.placements[0].is_some());
    assert!(player.placements[1].is_none());
}

#[test]
fn test_overlay_failure_is_contained() {
    let source = ScriptedSource::new(vec![
        SourcePoll::Ready(solid_frame(30, 30, 30, 4, 4)),
        SourcePoll::Ready(solid_frame(30, 30, 30, 4, 4)),
    ]);
    let (detector, det_stats) = StubDetector::new(vec![]);
    let (player, player_stats) = StubPlayer::new((40, 40));
    let player = player.failing_on(1);
    let (mut surface, surface_stats) = StubSurface::new();

    let mut controller = FrameLoopController::new(source, detector, player, 4, 4);

    // The decode error does not abort the tick.
    let first = controller.tick(&mut surface).unwrap();
    assert!(first.processed);
    assert!(!first.overlay_active);

    // The player is never driven again; the rest keeps running.
    let second = controller.tick(&mut surface).unwrap();
    assert!(second.processed);
    assert!(!second.overlay_active);
    assert_eq!(player_stats.lock().advances, 1);
    assert_eq!(det_stats.lock().calls, 2);
    assert_eq!(surface_stats.lock().presented.len(), 2);
}

#[test]
fn test_frame_size_change_aborts_tick() {
    let source = ScriptedSource::new(vec![SourcePoll::Ready(solid_frame(0, 0, 0, 2, 2))]);
    let (detector, det_stats) = StubDetector::new(vec![]);
    let (player, player_stats) = StubPlayer::new((40, 40));
    let (mut surface, surface_stats) = StubSurface::new();

    let mut controller = FrameLoopController::new(source, detector, player, 4, 4);
    let err = controller.tick(&mut surface).unwrap_err();

    match err {
        PipelineError::FrameSizeChanged {
            expected_w,
            expected_h,
            actual_w,
            actual_h,
        } => {
            assert_eq!((expected_w, expected_h), (4, 4));
            assert_eq!((actual_w, actual_h), (2, 2));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The aborted tick touched nothing downstream.
    assert_eq!(det_stats.lock().calls, 0);
    assert_eq!(player_stats.lock().advances, 0);
    assert!(surface_stats.lock().presented.is_empty());
}
