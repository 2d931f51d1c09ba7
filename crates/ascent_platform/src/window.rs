use std::sync::Arc;
use winit::dpi::LogicalSize;
use winit::error::OsError;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Ascent".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, OsError> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_min_inner_size(LogicalSize::new(320, 240))
        .with_inner_size(LogicalSize::new(config.width, config.height));

    let window = event_loop.create_window(attrs)?;
    let size = window.inner_size();
    log::info!(
        "window '{}' created at {}x{} (scale {:.2})",
        config.title,
        size.width,
        size.height,
        window.scale_factor()
    );
    Ok(Arc::new(window))
}

/// Initial viewport width in logical pixels, used for the small-screen check.
pub fn logical_width(window: &Window) -> f64 {
    window
        .inner_size()
        .to_logical::<f64>(window.scale_factor())
        .width
}
