//! Placement of the overlay relative to an anchor.

use super::anchor::Anchor;

/// Uniform scale and top-left offset that place the overlay's frame
/// centered on an anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Compute the overlay placement for an anchor.
///
/// `scale = radius / overlay_w` — uniform, derived from width only, so
/// the overlay keeps its native aspect ratio. The offsets place the
/// SCALED frame's center on (x, y):
/// `offset_x = x - (scale * overlay_w) / 2` (which equals `x - radius/2`),
/// `offset_y = y - (scale * overlay_h) / 2`.
/// The two half-extents coincide only for square overlays; centering on
/// the scaled height keeps non-square clips centered too.
pub fn place(anchor: &Anchor, overlay_w: u32, overlay_h: u32) -> OverlayTransform {
    let scale = anchor.radius / overlay_w as f32;
    OverlayTransform {
        scale,
        offset_x: anchor.x - (scale * overlay_w as f32) / 2.0,
        offset_y: anchor.y - (scale * overlay_h as f32) / 2.0,
    }
}
