//! Per-frame pixel buffers
//!
//! `RawFrame` is the interleaved RGBA buffer handed in by the frame
//! source; `LumaBuffer` is the single-channel derivative consumed by the
//! face detector. Buffer-length validity is established at construction,
//! so the downstream converters never re-check it.

use crate::error::PipelineError;

/// One camera frame: interleaved R,G,B,A bytes, row-major, fixed size.
///
/// Immutable for the duration of a tick; the pipeline only reads it.
#[derive(Clone, Debug)]
pub struct RawFrame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl RawFrame {
    /// Wrap an RGBA byte buffer, validating its length against the
    /// declared dimensions. A wrong length is a programmer error on the
    /// caller's side and aborts the tick.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self, PipelineError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(PipelineError::BadFrameLength {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, length `width * height * 4`.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of pixels in the frame.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Single-channel brightness buffer, one byte per pixel.
///
/// Produced fresh each tick by the colorspace converter and discarded
/// after detection.
#[derive(Clone, Debug)]
pub struct LumaBuffer {
    /// Luma samples, length `width * height`.
    pub data: Vec<u8>,
    /// Buffer width in pixels.
    pub width: u32,
    /// Buffer height in pixels.
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_frame_valid_length() {
        let frame = RawFrame::new(vec![0u8; 4 * 4 * 4], 4, 4).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 4);
        assert_eq!(frame.pixel_count(), 16);
        assert_eq!(frame.data().len(), 64);
    }

    #[test]
    fn test_raw_frame_rejects_wrong_length() {
        let err = RawFrame::new(vec![0u8; 63], 4, 4).unwrap_err();
        match err {
            PipelineError::BadFrameLength {
                expected, actual, ..
            } => {
                assert_eq!(expected, 64);
                assert_eq!(actual, 63);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
