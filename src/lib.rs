//! Face Overlay - anchor a synthetic video clip to a detected face
//!
//! Captures camera frames, derives a luma buffer for an external face
//! detector, reduces the detections to a single anchor, and composites
//! an overlay video onto the live background at that anchor. The face
//! cascade itself and the overlay's bitstream decoder are external
//! collaborators plugged in through the `detect` and `overlay` traits.

pub mod camera;
pub mod config;
pub mod detect;
pub mod error;
pub mod frame;
pub mod overlay;
pub mod pipeline;

pub use config::AppConfig;
pub use error::PipelineError;
pub use frame::{LumaBuffer, RawFrame};
pub use pipeline::{AnchorPolicy, FrameLoopController, TickReport};
