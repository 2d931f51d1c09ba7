//! Per-frame arbitration.
//!
//! `Navigator` owns every piece of mutable navigation state and advances it
//! in a fixed order each step:
//!
//! 1. pending section snap, otherwise section highlighting
//! 2. pending planet snap
//! 3. camera and depth-of-field tweens
//! 4. motion and dialog triggers, only when no snap is pending
//! 5. camera follow
//!
//! Input handlers (see `handlers`) run between steps and only go through the
//! guarded transitions on `NavigationState`.

use glam::Vec3;

use crate::camera::CameraRig;
use crate::config::ExperienceConfig;
use crate::content::Journey;
use crate::dialog::DialogSystem;
use crate::motion::{Drive, MotionModel};
use crate::navigation::{FocusMode, NavigationSnapshot, NavigationState, Snap};
use crate::presentation::PresentationIntent;
use crate::tween::{Ease, TweenProperty, TweenSpec, TweenTag, Tweener};

/// What one step produced, for the presentation layer and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub snapshot: NavigationSnapshot,
    pub astronaut: Option<Vec3>,
    pub camera: Vec3,
    pub velocity: f32,
    pub intents: Vec<PresentationIntent>,
}

pub struct Navigator {
    pub config: ExperienceConfig,
    pub(crate) journey: Journey,
    pub(crate) nav: NavigationState,
    pub(crate) motion: MotionModel,
    pub(crate) dialogs: DialogSystem,
    pub(crate) tweens: Tweener,
    pub(crate) camera: CameraRig,
    pub(crate) astronaut: Option<Vec3>,
    pub(crate) revealed: bool,
    pub(crate) depth_of_field: Option<f32>,
    active_section: Option<usize>,
    pub(crate) intents: Vec<PresentationIntent>,
}

impl Navigator {
    pub fn new(config: ExperienceConfig, journey: Journey, aspect: f32) -> Self {
        let camera = CameraRig::new(config.navigation.camera_start, config.view.fov_y, aspect);
        Self {
            motion: MotionModel::new(config.motion),
            dialogs: DialogSystem::new(config.dialog),
            config,
            journey,
            nav: NavigationState::new(),
            tweens: Tweener::new(),
            camera,
            astronaut: None,
            revealed: false,
            depth_of_field: None,
            active_section: None,
            intents: Vec::new(),
        }
    }

    pub fn journey(&self) -> &Journey {
        &self.journey
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    pub fn motion(&self) -> &MotionModel {
        &self.motion
    }

    pub fn dialogs(&self) -> &DialogSystem {
        &self.dialogs
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn astronaut(&self) -> Option<Vec3> {
        self.astronaut
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn active_section(&self) -> Option<usize> {
        self.active_section
    }

    pub fn depth_of_field(&self) -> Option<f32> {
        self.depth_of_field
    }

    /// Enable depth-of-field refocusing, starting at `focus`.
    pub fn enable_depth_of_field(&mut self, focus: f32) {
        self.depth_of_field = Some(focus);
    }

    /// Place the astronaut at its spawn point once its model is loaded.
    pub fn spawn_astronaut(&mut self) {
        let spawn = self.journey.astronaut.spawn;
        log::info!("astronaut spawned at {spawn}");
        self.astronaut = Some(spawn);
    }

    /// Move the astronaut directly, clamped to the band. Velocity is kept.
    pub fn place_astronaut(&mut self, y: f32) {
        let band = self.journey.band;
        if let Some(astronaut) = self.astronaut.as_mut() {
            astronaut.y = band.clamp(y);
        }
    }

    /// Hand control to the user: start the camera intro.
    pub fn reveal(&mut self) {
        if self.revealed {
            return;
        }
        self.revealed = true;
        let Some(astronaut) = self.astronaut else {
            log::warn!("revealed without an astronaut");
            return;
        };
        let nav = self.config.navigation;
        self.tweens.start(TweenSpec {
            property: TweenProperty::CameraPosition,
            from: self.camera.position,
            to: self.framing(astronaut),
            duration: nav.intro_duration,
            ease: Ease::Power4Out,
            tag: TweenTag::CameraIntro,
        });
    }

    /// Camera position that frames the astronaut.
    pub(crate) fn framing(&self, astronaut: Vec3) -> Vec3 {
        let offset = self.config.navigation.follow_offset;
        Vec3::new(offset.x, astronaut.y + offset.y, astronaut.z + offset.z)
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        self.nav.snapshot()
    }

    /// Advance one fixed step of `dt` seconds at simulated time `now`.
    pub fn update(&mut self, dt: f32, now: f64) -> FrameReport {
        if let Some(mut astronaut) = self.astronaut {
            match self.nav.pending_snap() {
                Some(Snap::Section(index)) => self.advance_section_snap(index, &mut astronaut),
                _ => self.highlight_sections(astronaut.y),
            }

            if let Some(Snap::Planet(index)) = self.nav.pending_snap() {
                self.advance_planet_snap(index, &mut astronaut);
            }

            self.advance_tweens(dt);

            if self.nav.pending_snap().is_none() {
                if self.nav.can_move() {
                    let drive = if self.nav.is_free() {
                        Drive::Free
                    } else {
                        Drive::Restrained
                    };
                    astronaut.y = self.motion.advance(astronaut.y, drive, self.journey.band, dt);
                }
                self.dialogs.update(
                    &self.journey.checkpoints,
                    &mut astronaut,
                    self.journey.astronaut.height,
                    &mut self.nav,
                    &mut self.motion,
                    now,
                    &mut self.intents,
                );
            }

            self.astronaut = Some(astronaut);
            self.follow(astronaut);
        } else {
            self.advance_tweens(dt);
        }

        let snapshot = self.nav.snapshot();
        debug_assert!(snapshot.is_consistent(), "inconsistent navigation {snapshot:?}");
        FrameReport {
            snapshot,
            astronaut: self.astronaut,
            camera: self.camera.position,
            velocity: self.motion.velocity(),
            intents: std::mem::take(&mut self.intents),
        }
    }

    fn advance_section_snap(&mut self, index: usize, astronaut: &mut Vec3) {
        let Some(range) = self.journey.section(index).map(|s| s.range()) else {
            self.nav.finish_snap();
            return;
        };
        let settling = matches!(
            self.nav.mode(),
            FocusMode::SectionSnap { settling: true, .. }
        );
        if range.contains(astronaut.y) && !settling {
            self.nav.finish_snap();
            return;
        }
        self.nav.mark_section_settling();
        let target = range.min_y + self.config.navigation.section_offset;
        self.approach(astronaut, target);
    }

    fn advance_planet_snap(&mut self, index: usize, astronaut: &mut Vec3) {
        let Some(planet_y) = self.journey.planet(index).map(|p| p.position.y) else {
            self.nav.finish_snap();
            return;
        };
        let target = planet_y - self.config.navigation.planet_offset;
        self.approach(astronaut, target);
    }

    /// Shared snap law: zero velocity, lerp toward `target`, end within tolerance.
    fn approach(&mut self, astronaut: &mut Vec3, target: f32) {
        let nav = self.config.navigation;
        self.motion.stop();
        astronaut.y += (target - astronaut.y) * nav.snap_approach;
        if (astronaut.y - target).abs() <= nav.snap_tolerance {
            self.nav.finish_snap();
        }
    }

    fn highlight_sections(&mut self, y: f32) {
        let containing = self
            .journey
            .sections
            .iter()
            .position(|s| s.range().contains(y));
        self.set_active_section(containing);
    }

    pub(crate) fn set_active_section(&mut self, next: Option<usize>) {
        if next == self.active_section {
            return;
        }
        if let Some(previous) = self.active_section {
            self.intents.push(PresentationIntent::SetSectionActive {
                index: previous,
                active: false,
            });
        }
        if let Some(index) = next {
            self.intents.push(PresentationIntent::SetSectionActive {
                index,
                active: true,
            });
        }
        self.active_section = next;
    }

    fn advance_tweens(&mut self, dt: f32) {
        for sample in self.tweens.advance(dt) {
            match sample.property {
                TweenProperty::CameraPosition => self.camera.position = sample.value,
                TweenProperty::DepthOfFieldFocus => {
                    self.depth_of_field = Some(sample.value.x);
                    self.intents
                        .push(PresentationIntent::DepthOfFieldFocus(sample.value.x));
                }
            }
            if !sample.finished {
                continue;
            }
            match sample.tag {
                TweenTag::ReturnToAstronaut => {
                    self.nav.release_planet_focus();
                }
                TweenTag::DockExhibit(index) => {
                    self.intents.push(PresentationIntent::ShowExhibitDetails(index));
                }
                TweenTag::CameraIntro => log::debug!("camera intro finished"),
                TweenTag::Refocus => {}
            }
        }
    }

    fn follow(&mut self, astronaut: Vec3) {
        if !self.revealed
            || self.nav.planet_focus().is_some()
            || self.tweens.is_tweening(TweenProperty::CameraPosition)
        {
            return;
        }
        self.camera.position.y = astronaut.y + self.config.navigation.follow_offset.y;
    }
}
