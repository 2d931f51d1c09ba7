pub mod window;

pub use window::{create_window, logical_width, PlatformConfig};
