//! Experience tuning loaded from `assets/config/experience.json`.
//!
//! Every field has a default; a missing file means "all defaults".

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::Deserialize;

use crate::dialog::DialogConfig;
use crate::error::ContentError;
use crate::loading::LoadingConfig;
use crate::motion::MotionConfig;
use crate::music::MusicConfig;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Fraction of the remaining distance covered per step by a snap.
    pub snap_approach: f32,
    /// A snap ends once within this distance of its target.
    pub snap_tolerance: f32,
    /// Section snaps aim this far above the section's lower bound.
    pub section_offset: f32,
    /// Planet snaps aim this far below the planet.
    pub planet_offset: f32,
    /// Camera framing relative to the astronaut (`x` is absolute).
    pub follow_offset: Vec3,
    pub camera_start: Vec3,
    pub intro_duration: f32,
    pub return_duration: f32,
    pub dock_duration: f32,
    /// Docked camera distance as a multiple of the exhibit radius.
    pub dock_distance_factor: f32,
    /// Scale applied to a clicked exhibit.
    pub highlight_scale: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            snap_approach: 0.05,
            snap_tolerance: 0.1,
            section_offset: 1.0,
            planet_offset: 1.0,
            follow_offset: Vec3::new(0.0, 2.0, 15.0),
            camera_start: Vec3::new(0.0, 0.0, 50.0),
            intro_duration: 1.0,
            return_duration: 0.5,
            dock_duration: 1.5,
            dock_distance_factor: 1.25,
            highlight_scale: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Target offset per wheel pixel.
    pub scroll_scale: f32,
    /// Target offset per arrow key press.
    pub key_step: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            scroll_scale: -0.045,
            key_step: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub fov_y: f32,
    /// Below this initial width the experience shows a notice instead.
    pub min_width: u32,
    /// Click-to-dock on exhibits. Experimental.
    pub exhibit_docking: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fov_y: 60.0,
            min_width: 800,
            exhibit_docking: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperienceConfig {
    pub motion: MotionConfig,
    pub navigation: NavigationConfig,
    pub dialog: DialogConfig,
    pub input: InputConfig,
    pub loading: LoadingConfig,
    pub view: ViewConfig,
    pub music: MusicConfig,
}

impl ExperienceConfig {
    /// Reject values that would stall or invert motion.
    pub fn validate(&self, origin: &str) -> Result<(), ContentError> {
        let m = &self.motion;
        if m.gain_divisor <= 0.0 {
            return Err(ContentError::invalid(origin, "motion.gain_divisor must be > 0"));
        }
        if m.max_velocity <= 0.0 || m.rest_epsilon < 0.0 {
            return Err(ContentError::invalid(origin, "motion velocity limits must be positive"));
        }
        if m.decay_floor <= 0.0 {
            return Err(ContentError::invalid(origin, "motion.decay_floor must be > 0"));
        }
        if !(0.0..=1.0).contains(&m.soft_stop_factor) {
            return Err(ContentError::invalid(origin, "motion.soft_stop_factor must be in [0, 1]"));
        }
        let n = &self.navigation;
        if !(n.snap_approach > 0.0 && n.snap_approach <= 1.0) {
            return Err(ContentError::invalid(origin, "navigation.snap_approach must be in (0, 1]"));
        }
        if n.snap_tolerance <= 0.0 {
            return Err(ContentError::invalid(origin, "navigation.snap_tolerance must be > 0"));
        }
        if !(self.dialog.hold_approach > 0.0 && self.dialog.hold_approach <= 1.0) {
            return Err(ContentError::invalid(origin, "dialog.hold_approach must be in (0, 1]"));
        }
        if self.dialog.window_radius < 0.0 {
            return Err(ContentError::invalid(origin, "dialog.window_radius must be >= 0"));
        }
        if !(self.view.fov_y > 0.0 && self.view.fov_y < 180.0) {
            return Err(ContentError::invalid(origin, "view.fov_y must be in (0, 180)"));
        }
        if !(0.0..=1.0).contains(&self.music.volume) {
            return Err(ContentError::invalid(origin, "music.volume must be in [0, 1]"));
        }
        Ok(())
    }
}

pub fn parse_config(raw: &str, origin: &str) -> Result<ExperienceConfig, ContentError> {
    let config: ExperienceConfig =
        serde_json::from_str(raw).map_err(|source| ContentError::Parse {
            origin: origin.to_string(),
            source,
        })?;
    config.validate(origin)?;
    Ok(config)
}

/// Load the config file, or defaults when it does not exist.
pub fn load_config_from_path(path: &Path) -> Result<ExperienceConfig, ContentError> {
    if !path.exists() {
        log::info!("no config at {}, using defaults", path.display());
        return Ok(ExperienceConfig::default());
    }
    let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&raw, &path.display().to_string())
}
