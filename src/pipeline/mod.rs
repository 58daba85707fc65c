//! Per-frame processing pipeline
//!
//! One tick turns a raw camera frame into a presented image: luma
//! conversion for the detector, background reconstruction, detection
//! reduction to an anchor, overlay placement, and compositing via the
//! overlay player. The [`FrameLoopController`] orchestrates the steps
//! and owns all cross-tick state.

pub mod anchor;
pub mod background;
pub mod luma;
pub mod transform;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::camera::{FrameSource, SourcePoll};
use crate::detect::FaceDetector;
use crate::error::PipelineError;
use crate::overlay::OverlayPlayer;

pub use anchor::{Anchor, Detection, RADIUS_SCALE};
pub use transform::OverlayTransform;

/// What to do with the anchor on frames where the detector reports
/// no faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorPolicy {
    /// Keep the last known anchor; the overlay stays where the face was
    /// last seen. Matches the original application's behavior.
    #[default]
    HoldLast,
    /// Drop the anchor immediately; the overlay disappears until a face
    /// is detected again.
    Clear,
}

/// Receives one composed image per tick.
pub trait PresentSurface {
    fn present(&mut self, image: &RgbaImage) -> anyhow::Result<()>;
}

/// Outcome of a single tick, for logging and UI status.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    /// False when the frame source was not ready and the prior image
    /// was re-presented untouched.
    pub processed: bool,
    /// Detections reported for this frame.
    pub face_count: usize,
    /// The anchor in effect this tick (after the retention policy).
    pub anchor: Option<Anchor>,
    /// False once the overlay player has failed terminally.
    pub overlay_active: bool,
}

/// Orchestrates one full pipeline pass per render tick.
///
/// Owns the only cross-tick state in the core: the previously presented
/// background, the last known anchor, and the overlay-failure latch.
pub struct FrameLoopController<S, D, P> {
    source: S,
    detector: D,
    player: P,
    width: u32,
    height: u32,
    policy: AnchorPolicy,
    background: RgbaImage,
    last_anchor: Option<Anchor>,
    overlay_failed: bool,
}

impl<S, D, P> FrameLoopController<S, D, P>
where
    S: FrameSource,
    D: FaceDetector,
    P: OverlayPlayer,
{
    /// Create a controller for a fixed `width` x `height` stream.
    /// Dimensions are set once here and never renegotiated.
    pub fn new(source: S, detector: D, player: P, width: u32, height: u32) -> Self {
        Self {
            source,
            detector,
            player,
            width,
            height,
            policy: AnchorPolicy::default(),
            background: RgbaImage::new(width, height),
            last_anchor: None,
            overlay_failed: false,
        }
    }

    pub fn with_policy(mut self, policy: AnchorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The image presented on the most recent tick.
    pub fn presented(&self) -> &RgbaImage {
        &self.background
    }

    /// Run one full pipeline pass and present the result.
    pub fn tick<V: PresentSurface>(
        &mut self,
        surface: &mut V,
    ) -> Result<TickReport, PipelineError> {
        let raw = match self.source.poll_frame() {
            SourcePoll::Ready(frame) => frame,
            SourcePoll::NotReady => {
                // Degrade gracefully: re-present the prior background
                // without touching the detector or the overlay player.
                surface.present(&self.background)?;
                return Ok(TickReport {
                    processed: false,
                    face_count: 0,
                    anchor: self.last_anchor,
                    overlay_active: !self.overlay_failed,
                });
            }
        };

        if raw.width() != self.width || raw.height() != self.height {
            return Err(PipelineError::FrameSizeChanged {
                expected_w: self.width,
                expected_h: self.height,
                actual_w: raw.width(),
                actual_h: raw.height(),
            });
        }

        let luma = luma::to_luma(&raw);
        let mut composed = background::reconstruct(&raw);

        let detections = self.detector.detect(&luma);
        let face_count = detections.len();

        let effective = match anchor::reduce(&detections) {
            Some(found) => {
                self.last_anchor = Some(found);
                Some(found)
            }
            None => match self.policy {
                AnchorPolicy::HoldLast => self.last_anchor,
                AnchorPolicy::Clear => {
                    self.last_anchor = None;
                    None
                }
            },
        };

        // The player advances exactly once per completed tick, anchor
        // or not, so overlay playback continuity does not depend on
        // detection success.
        if !self.overlay_failed {
            let (overlay_w, overlay_h) = self.player.native_size();
            let placement =
                effective.map(|a| transform::place(&a, overlay_w, overlay_h));
            if let Err(e) = self
                .player
                .advance_and_composite(&mut composed, placement.as_ref())
            {
                // Terminal for the overlay only; background and
                // detection keep running.
                log::error!("overlay player failed, disabling overlay: {e}");
                self.overlay_failed = true;
            }
        }

        surface.present(&composed)?;
        self.background = composed;

        Ok(TickReport {
            processed: true,
            face_count,
            anchor: effective,
            overlay_active: !self.overlay_failed,
        })
    }
}
