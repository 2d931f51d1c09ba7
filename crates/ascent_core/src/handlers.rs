//! Input handlers.
//!
//! Each handler re-checks its own guards against the current navigation
//! state and returns whether it changed anything. Refused input is dropped
//! silently; that is the normal outcome while another directive owns the
//! astronaut.

use glam::{Vec2, Vec3};

use crate::camera::Ray;
use crate::content::Journey;
use crate::director::Navigator;
use crate::input::{InputEvent, Key};
use crate::presentation::PresentationIntent;
use crate::tween::{Ease, TweenProperty, TweenSpec, TweenTag};

/// Something sized to the viewport.
pub trait Resizable {
    fn resize(&mut self, width: u32, height: u32);
}

/// Push a new viewport size to every target. Zero-sized viewports (minimized
/// windows) are skipped.
pub fn handle_resize(targets: &mut [&mut dyn Resizable], width: u32, height: u32) {
    if width == 0 || height == 0 {
        log::debug!("ignoring resize to {width}x{height}");
        return;
    }
    log::info!("resize to {width}x{height}");
    for target in targets.iter_mut() {
        target.resize(width, height);
    }
}

impl Resizable for Navigator {
    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }
}

/// Ray queries against the scene's interactive objects.
pub trait ScenePicker {
    fn hits_contact(&self, ray: &Ray) -> bool;
    /// Nearest exhibit hit by the ray.
    fn pick_exhibit(&self, ray: &Ray) -> Option<usize>;
}

/// Sphere hitboxes: planets by size, the contact beacon by its pick radius.
impl ScenePicker for Journey {
    fn hits_contact(&self, ray: &Ray) -> bool {
        ray.intersect_sphere(self.contact.position, self.contact.pick_radius)
            .is_some()
    }

    fn pick_exhibit(&self, ray: &Ray) -> Option<usize> {
        self.planets
            .iter()
            .enumerate()
            .filter_map(|(index, planet)| {
                ray.intersect_sphere(planet.position, planet.size)
                    .map(|distance| (index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

impl Navigator {
    /// Route one queued event. Everything is dropped until the experience
    /// has been revealed.
    pub fn dispatch(&mut self, event: InputEvent, picker: &dyn ScenePicker) -> bool {
        if !self.revealed {
            log::trace!("dropping {event:?} before reveal");
            return false;
        }
        match event {
            InputEvent::Wheel { delta_y } => self.on_wheel(delta_y),
            InputEvent::Key { key: Key::Escape, .. } | InputEvent::CloseContact => {
                self.on_close_contact()
            }
            InputEvent::Key { key, shift } => match (key.slot(), shift) {
                (Some(slot), false) => self.on_navigate_section(slot),
                (Some(slot), true) => self.on_navigate_planet(slot),
                (None, _) => self.on_key(key),
            },
            InputEvent::Click { ndc, over_ui } => self.on_click(ndc, over_ui, picker),
            InputEvent::NavigateSection(index) => self.on_navigate_section(index),
            InputEvent::NavigatePlanet(index) => self.on_navigate_planet(index),
        }
    }

    pub fn on_wheel(&mut self, delta_y: f32) -> bool {
        if delta_y == 0.0 || self.tweens.is_tweening(TweenProperty::CameraPosition) {
            return false;
        }
        self.steer_by(delta_y * self.config.input.scroll_scale)
    }

    pub fn on_key(&mut self, key: Key) -> bool {
        let step = self.config.input.key_step;
        match key {
            Key::Up => self.steer_by(step),
            Key::Down => self.steer_by(-step),
            _ => false,
        }
    }

    /// Shared wheel/key path: guards, then either return the camera from a
    /// planet or steer the astronaut by `offset`.
    fn steer_by(&mut self, offset: f32) -> bool {
        if self.nav.pending_snap().is_some() || !self.nav.can_move() || self.nav.contact_shown()
        {
            return false;
        }
        let Some(astronaut) = self.astronaut else {
            return false;
        };
        if self.nav.planet_focus().is_some() {
            return self.return_to_astronaut(astronaut);
        }
        self.motion
            .steer(astronaut.y, astronaut.y + offset, self.journey.band);
        true
    }

    fn return_to_astronaut(&mut self, astronaut: Vec3) -> bool {
        if self.tweens.is_tweening(TweenProperty::CameraPosition) {
            return false;
        }
        let nav = self.config.navigation;
        self.tweens.start(TweenSpec {
            property: TweenProperty::CameraPosition,
            from: self.camera.position,
            to: self.framing(astronaut),
            duration: nav.return_duration,
            ease: Ease::Power2Out,
            tag: TweenTag::ReturnToAstronaut,
        });
        self.refocus(self.camera.position.distance(astronaut), nav.return_duration, Ease::Power2Out);
        self.intents.push(PresentationIntent::HideExhibitDetails);
        true
    }

    fn refocus(&mut self, focus: f32, duration: f32, ease: Ease) {
        let Some(current) = self.depth_of_field else {
            return;
        };
        self.tweens.start(TweenSpec::scalar(
            TweenProperty::DepthOfFieldFocus,
            current,
            focus,
            duration,
            ease,
            TweenTag::Refocus,
        ));
    }

    pub fn on_click(&mut self, ndc: Vec2, over_ui: bool, picker: &dyn ScenePicker) -> bool {
        if over_ui || self.nav.pending_snap().is_some() || self.nav.contact_shown() {
            return false;
        }
        let ray = self.camera.ray_through(ndc);

        if self.nav.dialog_lock().is_some() {
            if picker.hits_contact(&ray) {
                return self.open_contact();
            }
            return self.nav.dismiss_dialog();
        }

        if !self.nav.is_free() {
            return false;
        }
        if picker.hits_contact(&ray) {
            return self.open_contact();
        }
        let Some(index) = picker.pick_exhibit(&ray) else {
            return false;
        };
        self.intents.push(PresentationIntent::HighlightExhibit {
            index,
            scale: self.config.navigation.highlight_scale,
        });
        if self.config.view.exhibit_docking {
            self.dock_on_exhibit(index);
        }
        true
    }

    fn open_contact(&mut self) -> bool {
        if !self.nav.open_contact() {
            return false;
        }
        self.motion.stop();
        self.intents.push(PresentationIntent::ShowContact);
        true
    }

    /// Experimental: move the camera beside an exhibit and show its details.
    fn dock_on_exhibit(&mut self, index: usize) -> bool {
        if self.tweens.is_tweening(TweenProperty::CameraPosition) {
            return false;
        }
        let Some(planet) = self.journey.planet(index) else {
            return false;
        };
        let center = planet.position;
        let nav = self.config.navigation;
        let safe_distance = planet.size * nav.dock_distance_factor;
        let sideways = self.camera.visible_width_at(safe_distance) / 6.0;
        let side = if center.x < 0.0 { -1.0 } else { 1.0 };
        let target = Vec3::new(
            center.x + sideways * side,
            center.y,
            center.z + safe_distance,
        );
        if !self.nav.focus_planet(index) {
            return false;
        }
        self.intents.push(PresentationIntent::HideExhibitDetails);
        self.tweens.start(TweenSpec {
            property: TweenProperty::CameraPosition,
            from: self.camera.position,
            to: target,
            duration: nav.dock_duration,
            ease: Ease::Power2InOut,
            tag: TweenTag::DockExhibit(index),
        });
        self.refocus(center.distance(target), nav.dock_duration, Ease::Power2InOut);
        true
    }

    pub fn on_navigate_section(&mut self, index: usize) -> bool {
        let Some(range) = self.journey.section(index).map(|s| s.range()) else {
            return false;
        };
        let Some(astronaut) = self.astronaut else {
            return false;
        };
        if !self.nav.request_section(index) {
            return false;
        }
        self.set_active_section(Some(index));
        if range.contains(astronaut.y) {
            log::debug!("already inside section {index}, snap cleared");
            self.nav.finish_snap();
        }
        true
    }

    pub fn on_navigate_planet(&mut self, index: usize) -> bool {
        if self.journey.planet(index).is_none() || self.astronaut.is_none() {
            return false;
        }
        self.nav.request_planet(index)
    }

    pub fn on_close_contact(&mut self) -> bool {
        if !self.nav.close_contact() {
            return false;
        }
        self.intents.push(PresentationIntent::HideContact);
        true
    }
}
