//! Pipeline error taxonomy.
//!
//! Precondition violations abort the tick and surface to the caller.
//! Transient source unavailability is not an error (see
//! [`crate::camera::SourcePoll::NotReady`]); an overlay decode failure is
//! contained inside the frame loop and never reaches this type.

use thiserror::Error;

/// Errors that abort a pipeline tick.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("raw frame is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BadFrameLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error(
        "frame size changed mid-stream: got {actual_w}x{actual_h}, pipeline fixed at {expected_w}x{expected_h}"
    )]
    FrameSizeChanged {
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },
    #[error(transparent)]
    Present(#[from] anyhow::Error),
}
