//! Focus state machine.
//!
//! Exactly one directive owns the astronaut and camera at any time. The mode
//! is a tagged enum, so a pending section snap, a pending planet snap, a
//! dialog lock and the contact modal cannot coexist. Every transition goes
//! through a method that checks its own guard; an illegal request returns
//! `false` and leaves the mode untouched.
//!
//! Priority, highest first: contact modal, snap directives, dialog lock, free.
//! Higher-priority modes are only entered from `Free` (or, for the contact
//! modal, from a dialog lock), so a lower-priority request can never displace
//! a higher one.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusMode {
    /// Ordinary scroll/key control, camera framing the astronaut.
    #[default]
    Free,
    /// Interpolating toward a section boundary. `settling` is set once the
    /// snap has started moving, which disables the "already inside" shortcut.
    SectionSnap { index: usize, settling: bool },
    /// Interpolating toward a planet's height.
    PlanetSnap { index: usize },
    /// Astronaut held next to an active dialog checkpoint.
    DialogLock { checkpoint: u32 },
    /// A planet holds the camera (experimental docking path).
    PlanetFocus { index: usize },
    /// The contact overlay owns all input.
    ContactModal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snap {
    Section(usize),
    Planet(usize),
}

/// Flat view of the navigation state with `-1` sentinels for "none".
/// Useful for logging and invariant checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationSnapshot {
    pub can_move: bool,
    pub current_focus: i32,
    pub contact_shown: bool,
    pub go_to_section: i32,
    pub go_to_planet: i32,
}

impl NavigationSnapshot {
    /// At most one snap directive, and never a snap alongside the contact modal.
    pub fn is_consistent(&self) -> bool {
        let snaps = (self.go_to_section >= 0) as u8 + (self.go_to_planet >= 0) as u8;
        snaps <= 1 && !(self.contact_shown && snaps > 0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    mode: FocusMode,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> FocusMode {
        self.mode
    }

    pub fn is_free(&self) -> bool {
        self.mode == FocusMode::Free
    }

    pub fn pending_snap(&self) -> Option<Snap> {
        match self.mode {
            FocusMode::SectionSnap { index, .. } => Some(Snap::Section(index)),
            FocusMode::PlanetSnap { index } => Some(Snap::Planet(index)),
            _ => None,
        }
    }

    pub fn dialog_lock(&self) -> Option<u32> {
        match self.mode {
            FocusMode::DialogLock { checkpoint } => Some(checkpoint),
            _ => None,
        }
    }

    pub fn planet_focus(&self) -> Option<usize> {
        match self.mode {
            FocusMode::PlanetFocus { index } => Some(index),
            _ => None,
        }
    }

    pub fn contact_shown(&self) -> bool {
        self.mode == FocusMode::ContactModal
    }

    /// False only while a dialog holds the astronaut.
    pub fn can_move(&self) -> bool {
        !matches!(self.mode, FocusMode::DialogLock { .. })
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        let (go_to_section, go_to_planet) = match self.mode {
            FocusMode::SectionSnap { index, .. } => (index as i32, -1),
            FocusMode::PlanetSnap { index } => (-1, index as i32),
            _ => (-1, -1),
        };
        NavigationSnapshot {
            can_move: self.can_move(),
            current_focus: self.planet_focus().map_or(-1, |index| index as i32),
            contact_shown: self.contact_shown(),
            go_to_section,
            go_to_planet,
        }
    }

    pub fn request_section(&mut self, index: usize) -> bool {
        if !self.is_free() {
            return self.refuse("section snap");
        }
        self.transition(FocusMode::SectionSnap {
            index,
            settling: false,
        });
        true
    }

    pub fn request_planet(&mut self, index: usize) -> bool {
        if !self.is_free() {
            return self.refuse("planet snap");
        }
        self.transition(FocusMode::PlanetSnap { index });
        true
    }

    /// Mark a pending section snap as in motion.
    pub fn mark_section_settling(&mut self) {
        if let FocusMode::SectionSnap { index, settling: false } = self.mode {
            self.mode = FocusMode::SectionSnap {
                index,
                settling: true,
            };
        }
    }

    /// Clear whichever snap directive is pending.
    pub fn finish_snap(&mut self) -> bool {
        if self.pending_snap().is_none() {
            return self.refuse("finish snap");
        }
        self.transition(FocusMode::Free);
        true
    }

    pub fn engage_dialog_lock(&mut self, checkpoint: u32) -> bool {
        if !self.is_free() {
            return self.refuse("dialog lock");
        }
        self.transition(FocusMode::DialogLock { checkpoint });
        true
    }

    /// Release the lock held by `checkpoint`. Locks held by other checkpoints stay.
    pub fn release_dialog_lock(&mut self, checkpoint: u32) -> bool {
        if self.dialog_lock() != Some(checkpoint) {
            return self.refuse("dialog release");
        }
        self.transition(FocusMode::Free);
        true
    }

    /// Release whatever dialog lock is held (pointer dismissal).
    pub fn dismiss_dialog(&mut self) -> bool {
        if self.dialog_lock().is_none() {
            return self.refuse("dialog dismissal");
        }
        self.transition(FocusMode::Free);
        true
    }

    pub fn open_contact(&mut self) -> bool {
        if !matches!(self.mode, FocusMode::Free | FocusMode::DialogLock { .. }) {
            return self.refuse("contact modal");
        }
        self.transition(FocusMode::ContactModal);
        true
    }

    pub fn close_contact(&mut self) -> bool {
        if !self.contact_shown() {
            return self.refuse("contact close");
        }
        self.transition(FocusMode::Free);
        true
    }

    pub fn focus_planet(&mut self, index: usize) -> bool {
        if !self.is_free() {
            return self.refuse("planet focus");
        }
        self.transition(FocusMode::PlanetFocus { index });
        true
    }

    pub fn release_planet_focus(&mut self) -> bool {
        if self.planet_focus().is_none() {
            return self.refuse("planet focus release");
        }
        self.transition(FocusMode::Free);
        true
    }

    fn transition(&mut self, next: FocusMode) {
        log::debug!("focus {:?} -> {:?}", self.mode, next);
        self.mode = next;
    }

    fn refuse(&self, attempt: &str) -> bool {
        log::trace!("ignored {attempt} request while {:?}", self.mode);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_free() {
        let state = NavigationState::new();
        assert!(state.is_free());
        let snap = state.snapshot();
        assert!(snap.can_move);
        assert_eq!(snap.current_focus, -1);
        assert_eq!(snap.go_to_section, -1);
        assert_eq!(snap.go_to_planet, -1);
        assert!(!snap.contact_shown);
    }

    #[test]
    fn snaps_only_start_from_free() {
        let mut state = NavigationState::new();
        assert!(state.request_section(2));
        assert!(!state.request_planet(1));
        assert_eq!(state.pending_snap(), Some(Snap::Section(2)));

        assert!(state.finish_snap());
        assert!(state.request_planet(1));
        assert!(!state.request_section(0));
        assert_eq!(state.pending_snap(), Some(Snap::Planet(1)));
    }

    #[test]
    fn dialog_lock_cannot_preempt_a_snap() {
        let mut state = NavigationState::new();
        state.request_section(1);
        assert!(!state.engage_dialog_lock(3));
        assert_eq!(state.pending_snap(), Some(Snap::Section(1)));
    }

    #[test]
    fn dialog_lock_blocks_movement_and_snaps() {
        let mut state = NavigationState::new();
        assert!(state.engage_dialog_lock(4));
        assert!(!state.can_move());
        assert!(!state.request_section(0));
        assert!(!state.request_planet(0));
        assert!(!state.release_dialog_lock(5), "other checkpoint cannot release");
        assert!(state.release_dialog_lock(4));
        assert!(state.can_move());
    }

    #[test]
    fn contact_modal_masks_everything_until_closed() {
        let mut state = NavigationState::new();
        state.engage_dialog_lock(1);
        assert!(state.open_contact());
        assert!(state.contact_shown());
        assert!(!state.request_section(0));
        assert!(!state.request_planet(0));
        assert!(!state.engage_dialog_lock(2));
        assert!(!state.focus_planet(0));
        assert!(!state.release_dialog_lock(1));
        assert!(state.close_contact());
        assert!(state.is_free());
    }

    #[test]
    fn contact_cannot_open_during_snap() {
        let mut state = NavigationState::new();
        state.request_planet(0);
        assert!(!state.open_contact());
        assert!(state.snapshot().is_consistent());
    }

    #[test]
    fn planet_focus_round_trip() {
        let mut state = NavigationState::new();
        assert!(state.focus_planet(2));
        assert_eq!(state.snapshot().current_focus, 2);
        assert!(!state.request_section(0));
        assert!(state.release_planet_focus());
        assert!(state.is_free());
        assert!(!state.release_planet_focus());
    }

    #[test]
    fn settling_flag_only_applies_to_section_snaps() {
        let mut state = NavigationState::new();
        state.mark_section_settling();
        assert!(state.is_free());

        state.request_section(3);
        state.mark_section_settling();
        assert_eq!(
            state.mode(),
            FocusMode::SectionSnap {
                index: 3,
                settling: true
            }
        );
    }

    #[test]
    fn every_reachable_mode_has_a_consistent_snapshot() {
        let modes = [
            FocusMode::Free,
            FocusMode::SectionSnap {
                index: 0,
                settling: true,
            },
            FocusMode::PlanetSnap { index: 1 },
            FocusMode::DialogLock { checkpoint: 2 },
            FocusMode::PlanetFocus { index: 3 },
            FocusMode::ContactModal,
        ];
        for mode in modes {
            let state = NavigationState { mode };
            assert!(state.snapshot().is_consistent(), "{mode:?}");
        }
    }
}
