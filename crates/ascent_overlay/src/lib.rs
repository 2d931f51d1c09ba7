mod experience_overlay;
mod scene_painter;

pub use experience_overlay::{ExperienceOverlay, OverlayActions, OverlayStats, OverlayView};
pub use scene_painter::{ndc_to_screen, typewriter_len};
