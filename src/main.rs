//! Face Overlay - Main Entry Point
//!
//! Demo shell wiring real collaborators into the frame loop: nokhwa
//! camera capture, a threaded detector slot (the cascade itself plugs
//! in through the `FaceDetector` trait), a procedural overlay player,
//! and a minifb window as the presentation surface.

use std::path::Path;

use image::RgbaImage;
use minifb::{Key, Window, WindowOptions};

use face_overlay::camera::CameraCapture;
use face_overlay::detect::{NullDetector, ThreadedDetector};
use face_overlay::overlay::TestPatternPlayer;
use face_overlay::pipeline::PresentSurface;
use face_overlay::{AppConfig, FrameLoopController};

const WINDOW_TITLE: &str = "Face Overlay - ESC to exit";
const DEFAULT_CONFIG_PATH: &str = "face-overlay.json";

/// minifb window accepting one composed image per tick.
struct WindowSurface {
    window: Window,
    argb: Vec<u32>,
}

impl WindowSurface {
    fn new(width: u32, height: u32, target_fps: usize) -> anyhow::Result<Self> {
        let mut window = Window::new(
            WINDOW_TITLE,
            width as usize,
            height as usize,
            WindowOptions::default(),
        )
        .map_err(|e| anyhow::anyhow!("failed to create window: {e}"))?;
        window.set_target_fps(target_fps);
        Ok(Self {
            window,
            argb: Vec::with_capacity((width * height) as usize),
        })
    }
}

impl PresentSurface for WindowSurface {
    fn present(&mut self, image: &RgbaImage) -> anyhow::Result<()> {
        // Pack RGBA bytes to the 0RGB u32 layout minifb expects.
        self.argb.clear();
        self.argb.extend(image.as_raw().chunks_exact(4).map(|px| {
            let r = px[0] as u32;
            let g = px[1] as u32;
            let b = px[2] as u32;
            (r << 16) | (g << 8) | b
        }));
        self.window
            .update_with_buffer(&self.argb, image.width() as usize, image.height() as usize)
            .map_err(|e| anyhow::anyhow!("failed to present frame: {e}"))?;
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(Path::new(&config_path))?;

    log::info!(
        "Face Overlay {}x{} @ {} fps (camera {})",
        config.width,
        config.height,
        config.target_fps,
        config.camera_index
    );

    let camera = CameraCapture::new(config.camera_index, config.width, config.height)
        .map_err(anyhow::Error::msg)?;
    // A real cascade implements FaceDetector and replaces NullDetector
    // here; ThreadedDetector keeps it off the render clock either way.
    let detector = ThreadedDetector::new(NullDetector).map_err(anyhow::Error::msg)?;
    let player = TestPatternPlayer::new(config.overlay_width, config.overlay_height);

    let mut controller =
        FrameLoopController::new(camera, detector, player, config.width, config.height)
            .with_policy(config.anchor_policy);
    let mut surface = WindowSurface::new(config.width, config.height, config.target_fps)?;

    log::info!("Face Overlay ready, ESC to exit");

    while surface.window.is_open() && !surface.window.is_key_down(Key::Escape) {
        let report = controller.tick(&mut surface)?;
        if report.processed {
            log::debug!(
                "tick: faces={} anchor={:?} overlay_active={}",
                report.face_count,
                report.anchor,
                report.overlay_active
            );
        }
    }

    log::info!("Shutting down");
    Ok(())
}
