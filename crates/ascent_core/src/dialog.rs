//! Proximity-triggered dialog checkpoints.
//!
//! Panels are created the first time a checkpoint enters the visibility
//! window around the astronaut and live for the rest of the session. The
//! first checkpoint found inside the window becomes the active one; becoming
//! active requests a dialog lock, and while that lock is held the astronaut
//! is drawn toward a fixed offset below the checkpoint.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::Deserialize;

use crate::content::DialogCheckpoint;
use crate::motion::MotionModel;
use crate::navigation::NavigationState;
use crate::presentation::PresentationIntent;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialogConfig {
    /// Half-height of the visibility window around the astronaut.
    pub window_radius: f32,
    /// The held astronaut settles this far below the checkpoint.
    pub hold_offset: f32,
    /// Fraction of the remaining distance covered per step while held.
    pub hold_approach: f32,
    /// Seconds between instantiating a panel and its first reveal.
    pub reveal_delay: f64,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            window_radius: 2.0,
            hold_offset: 1.0,
            hold_approach: 0.05,
            reveal_delay: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Panel {
    reveal_at: f64,
    visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DialogSystem {
    pub config: DialogConfig,
    panels: BTreeMap<u32, Panel>,
    visited: BTreeMap<u32, bool>,
    active: Option<u32>,
}

impl DialogSystem {
    pub fn new(config: DialogConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn active(&self) -> Option<u32> {
        self.active
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn is_instantiated(&self, id: u32) -> bool {
        self.panels.contains_key(&id)
    }

    pub fn is_visible(&self, id: u32) -> bool {
        self.panels.get(&id).is_some_and(|p| p.visible)
    }

    /// Set the first time the panel is shown, never cleared.
    pub fn is_visited(&self, id: u32) -> bool {
        self.visited.get(&id).copied().unwrap_or(false)
    }

    /// One trigger pass. Only call while no snap directive is pending.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        checkpoints: &[DialogCheckpoint],
        astronaut: &mut Vec3,
        astronaut_height: f32,
        nav: &mut NavigationState,
        motion: &mut MotionModel,
        now: f64,
        intents: &mut Vec<PresentationIntent>,
    ) {
        let radius = self.config.window_radius;
        let (low, high) = (astronaut.y - radius, astronaut.y + radius);
        let mut claimed = false;

        for checkpoint in checkpoints {
            let id = checkpoint.id;
            let y = checkpoint.position.y;

            if y < low || y > high {
                self.leave(id, nav, intents);
                continue;
            }

            if !self.panels.contains_key(&id) {
                let anchor = Vec3::new(
                    checkpoint.position.x,
                    y + astronaut_height / 2.0,
                    astronaut.z,
                );
                log::debug!("dialog {id} instantiated at {anchor}");
                self.panels.insert(
                    id,
                    Panel {
                        reveal_at: now + self.config.reveal_delay,
                        visible: false,
                    },
                );
                intents.push(PresentationIntent::InstantiatePanel { id, anchor });
            }

            if !claimed {
                claimed = true;
                self.claim(id, nav);
                if nav.dialog_lock() == Some(id) {
                    motion.stop();
                    let target = y - self.config.hold_offset;
                    astronaut.y += (target - astronaut.y) * self.config.hold_approach;
                }
            }

            if let Some(panel) = self.panels.get_mut(&id) {
                if !panel.visible && now >= panel.reveal_at {
                    panel.visible = true;
                    self.visited.insert(id, true);
                    intents.push(PresentationIntent::ShowPanel(id));
                }
            }
        }
    }

    fn claim(&mut self, id: u32, nav: &mut NavigationState) {
        if self.active == Some(id) {
            return;
        }
        if let Some(previous) = self.active.replace(id) {
            nav.release_dialog_lock(previous);
        }
        nav.engage_dialog_lock(id);
    }

    fn leave(&mut self, id: u32, nav: &mut NavigationState, intents: &mut Vec<PresentationIntent>) {
        if let Some(panel) = self.panels.get_mut(&id) {
            if panel.visible {
                panel.visible = false;
                intents.push(PresentationIntent::HidePanel(id));
            }
        }
        if self.active == Some(id) {
            self.active = None;
            nav.release_dialog_lock(id);
        }
    }
}
