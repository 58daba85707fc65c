//! Application configuration.
//!
//! Resolution and camera settings are fixed at startup; the pipeline
//! never renegotiates dimensions mid-stream.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pipeline::AnchorPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Capture and display width in pixels.
    pub width: u32,
    /// Capture and display height in pixels.
    pub height: u32,
    /// Camera device index (0 = default).
    pub camera_index: u32,
    /// Render clock rate driving the frame loop.
    pub target_fps: usize,
    /// Native width of the overlay clip's frames.
    pub overlay_width: u32,
    /// Native height of the overlay clip's frames.
    pub overlay_height: u32,
    /// What happens to the anchor on faceless frames.
    pub anchor_policy: AnchorPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            camera_index: 0,
            target_fps: 30,
            overlay_width: 160,
            overlay_height: 160,
            anchor_policy: AnchorPolicy::HoldLast,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file. A missing file yields the
    /// defaults; a malformed file is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }
}
