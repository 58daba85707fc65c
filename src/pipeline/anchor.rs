//! Reduction of per-frame face detections to a single anchor.

/// One candidate face region reported by the detector.
///
/// Coordinates are in the detector's space: `row_center` runs along the
/// display's vertical axis, `col_center` along the horizontal axis.
/// `size` is in the detector's native units and is never negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub row_center: f32,
    pub col_center: f32,
    pub size: f32,
}

/// The face position/size selected for a frame, in display coordinates.
///
/// Valid for exactly one frame. Absent is distinct from radius 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Magnification applied to the detected face size so the overlay
/// extends beyond the raw face box.
pub const RADIUS_SCALE: f32 = 1.5;

/// Reduce a frame's detections to zero-or-one anchor.
///
/// Empty input yields `None`. Otherwise the anchor comes from the LAST
/// detection in the sequence; detections carry no confidence order, and
/// last-wins is the compatibility-mandated tie-break. Do not change it
/// to first- or largest-wins without product sign-off.
///
/// The detector's (row, col) axes are mapped to display (y, x) here,
/// exactly once: `x = col_center`, `y = row_center`.
pub fn reduce(detections: &[Detection]) -> Option<Anchor> {
    detections.last().map(|det| Anchor {
        x: det.col_center,
        y: det.row_center,
        radius: det.size * RADIUS_SCALE,
    })
}
