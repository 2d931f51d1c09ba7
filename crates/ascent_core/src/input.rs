//! Navigation input as an ordered event queue.
//!
//! Device events arrive between frames in any number. They are queued in
//! receipt order and drained once per frame before the fixed steps run, so
//! every handler sees the navigation state left behind by the previous event
//! and the state is consistent after each one.
//!
//! Keys are discrete: an auto-repeated press is queued again, the way a held
//! arrow key keeps nudging the astronaut.

use std::collections::VecDeque;

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Escape,
    /// Top-row digit `0..=9`.
    Digit(u8),
}

impl Key {
    /// Zero-based navigation slot for digits `1..=9`.
    pub fn slot(self) -> Option<usize> {
        match self {
            Self::Digit(d @ 1..=9) => Some(usize::from(d - 1)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Wheel delta in pixels, positive when scrolling down the page.
    Wheel { delta_y: f32 },
    Key { key: Key, shift: bool },
    /// Primary-button press at a normalized device position.
    Click { ndc: Vec2, over_ui: bool },
    NavigateSection(usize),
    NavigatePlanet(usize),
    CloseContact,
}

#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
    /// Last known cursor position in physical pixels.
    pub cursor: (f64, f64),
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        log::trace!("queued {event:?}");
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every queued event in receipt order.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Map a physical cursor position to normalized device coordinates.
pub fn cursor_to_ndc(cursor: (f64, f64), width: u32, height: u32) -> Option<Vec2> {
    if width == 0 || height == 0 {
        return None;
    }
    let x = (cursor.0 / f64::from(width)) * 2.0 - 1.0;
    let y = -(cursor.1 / f64::from(height)) * 2.0 + 1.0;
    Some(Vec2::new(x as f32, y as f32))
}
