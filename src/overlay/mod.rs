//! Overlay video collaborator interface
//!
//! The overlay's compressed bitstream decoder is external; this module
//! defines the player contract the frame loop drives once per tick,
//! the CPU compositing helper shared by player implementations, and a
//! procedural [`TestPatternPlayer`] used by the demo binary and tests.

use image::RgbaImage;
use thiserror::Error;

use crate::pipeline::OverlayTransform;

/// Errors from the overlay player. Any of these is terminal for the
/// player: the frame loop stops driving it and keeps presenting the
/// background alone.
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("failed to decode overlay frame: {0}")]
    Decode(String),
    #[error("overlay stream ended")]
    EndOfStream,
}

/// Stateful overlay video player.
///
/// `advance_and_composite` decodes the next frame, advances playback by
/// exactly one frame, and draws onto `target` at the given placement.
/// With no placement the frame still advances but nothing is drawn, so
/// playback continuity is independent of detection success.
pub trait OverlayPlayer {
    /// Native pixel dimensions of the overlay's frames.
    fn native_size(&self) -> (u32, u32);

    fn advance_and_composite(
        &mut self,
        target: &mut RgbaImage,
        placement: Option<&OverlayTransform>,
    ) -> Result<(), OverlayError>;
}

/// Draw `frame` onto `target`, scaled and positioned per `placement`.
///
/// Nearest-neighbor sampling, alpha-over blending, clipped to the
/// target bounds. A non-positive scale draws nothing.
pub fn composite(frame: &RgbaImage, target: &mut RgbaImage, placement: &OverlayTransform) {
    if placement.scale <= 0.0 || frame.width() == 0 || frame.height() == 0 {
        return;
    }

    let out_w = (frame.width() as f32 * placement.scale).round() as i64;
    let out_h = (frame.height() as f32 * placement.scale).round() as i64;
    let left = placement.offset_x.round() as i64;
    let top = placement.offset_y.round() as i64;

    for oy in 0..out_h {
        let ty = top + oy;
        if ty < 0 || ty >= target.height() as i64 {
            continue;
        }
        for ox in 0..out_w {
            let tx = left + ox;
            if tx < 0 || tx >= target.width() as i64 {
                continue;
            }

            let sx = ((ox as f32 / placement.scale) as u32).min(frame.width() - 1);
            let sy = ((oy as f32 / placement.scale) as u32).min(frame.height() - 1);
            let src = frame.get_pixel(sx, sy);

            let alpha = src[3] as u32;
            if alpha == 0 {
                continue;
            }

            let dst = target.get_pixel_mut(tx as u32, ty as u32);
            for c in 0..3 {
                let s = src[c] as u32;
                let d = dst[c] as u32;
                dst[c] = ((s * alpha + d * (255 - alpha) + 127) / 255) as u8;
            }
            dst[3] = dst[3].max(src[3]);
        }
    }
}

/// Decoder-free overlay player producing an animated procedural clip.
///
/// Stands in for a real video player when no bitstream decoder is
/// wired up: a pulsing disc on a transparent background, advancing one
/// frame per call like any other player.
pub struct TestPatternPlayer {
    width: u32,
    height: u32,
    frame_index: u64,
}

impl TestPatternPlayer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_index: 0,
        }
    }

    /// Frames decoded (and advanced past) so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn generate_frame(&self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width, self.height);
        let cx = self.width as f32 / 2.0;
        let cy = self.height as f32 / 2.0;
        let max_r = cx.min(cy);
        // Disc radius pulses over a 60-frame cycle.
        let phase = (self.frame_index % 60) as f32 / 60.0;
        let pulse = 0.85 + 0.15 * (phase * std::f32::consts::TAU).sin();
        let disc_r = max_r * pulse;

        for y in 0..self.height {
            for x in 0..self.width {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                let px = img.get_pixel_mut(x, y);
                if dist <= disc_r * 0.8 {
                    *px = image::Rgba([40, 90, 200, 255]);
                } else if dist <= disc_r {
                    *px = image::Rgba([240, 240, 240, 255]);
                }
                // Outside the disc stays fully transparent.
            }
        }
        img
    }
}

impl OverlayPlayer for TestPatternPlayer {
    fn native_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn advance_and_composite(
        &mut self,
        target: &mut RgbaImage,
        placement: Option<&OverlayTransform>,
    ) -> Result<(), OverlayError> {
        let frame = self.generate_frame();
        self.frame_index += 1;
        if let Some(placement) = placement {
            composite(&frame, target, placement);
        }
        Ok(())
    }
}
