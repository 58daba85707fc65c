//! Raw frame to displayable background image.

use image::RgbaImage;

use crate::frame::RawFrame;

/// Rebuild the displayable background from a raw frame.
///
/// Byte-identity mapping: each output pixel's R,G,B,A channels are
/// copied verbatim from the corresponding input pixel. A fresh image is
/// allocated per frame so the result can never blend two captures.
pub fn reconstruct(frame: &RawFrame) -> RgbaImage {
    RgbaImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .expect("RawFrame length is validated at construction")
}
