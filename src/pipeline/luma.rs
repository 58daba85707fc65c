//! RGBA to luma conversion for the face detector.

use crate::frame::{LumaBuffer, RawFrame};

// ITU-R BT.709 luma coefficients.
const WEIGHT_R: f32 = 0.2126;
const WEIGHT_G: f32 = 0.7152;
const WEIGHT_B: f32 = 0.0722;

/// Convert an RGBA frame to a single-channel luma buffer.
///
/// Per pixel: `luma = trunc(0.5 + 0.2126·R + 0.7152·G + 0.0722·B)`
/// (round half up). Alpha is ignored. The weighted sum of 0-255 inputs
/// cannot exceed 255, so no clamp is needed. Pure function; safe to call
/// concurrently on independent frames.
pub fn to_luma(frame: &RawFrame) -> LumaBuffer {
    let data = frame.data();
    let mut luma = Vec::with_capacity(frame.pixel_count());

    for px in data.chunks_exact(4) {
        let r = px[0] as f32;
        let g = px[1] as f32;
        let b = px[2] as f32;
        luma.push((0.5 + WEIGHT_R * r + WEIGHT_G * g + WEIGHT_B * b) as u8);
    }

    LumaBuffer {
        data: luma,
        width: frame.width(),
        height: frame.height(),
    }
}
