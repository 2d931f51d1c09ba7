//! Desired visual state emitted by the runtime.
//!
//! The core never touches presentation primitives. It emits intents, and the
//! presentation layer folds them into a `PresentationState` it can draw from.

use std::collections::BTreeMap;

use glam::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub enum PresentationIntent {
    /// A dialog panel was created for the first time.
    InstantiatePanel { id: u32, anchor: Vec3 },
    ShowPanel(u32),
    HidePanel(u32),
    SetSectionActive { index: usize, active: bool },
    ShowContact,
    HideContact,
    HighlightExhibit { index: usize, scale: f32 },
    ShowExhibitDetails(usize),
    HideExhibitDetails,
    DepthOfFieldFocus(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelView {
    pub anchor: Vec3,
    pub visible: bool,
    /// Seconds since the panel was instantiated.
    pub age: f32,
}

#[derive(Debug, Clone, Default)]
pub struct PresentationState {
    pub panels: BTreeMap<u32, PanelView>,
    pub active_sections: Vec<bool>,
    pub contact_visible: bool,
    pub highlighted: BTreeMap<usize, f32>,
    pub exhibit_details: Option<usize>,
    pub depth_of_field_focus: Option<f32>,
}

impl PresentationState {
    pub fn new(section_count: usize) -> Self {
        Self {
            active_sections: vec![false; section_count],
            ..Self::default()
        }
    }

    pub fn apply(&mut self, intent: &PresentationIntent) {
        match *intent {
            PresentationIntent::InstantiatePanel { id, anchor } => {
                self.panels.entry(id).or_insert(PanelView {
                    anchor,
                    visible: false,
                    age: 0.0,
                });
            }
            PresentationIntent::ShowPanel(id) => {
                if let Some(panel) = self.panels.get_mut(&id) {
                    panel.visible = true;
                }
            }
            PresentationIntent::HidePanel(id) => {
                if let Some(panel) = self.panels.get_mut(&id) {
                    panel.visible = false;
                }
            }
            PresentationIntent::SetSectionActive { index, active } => {
                if let Some(flag) = self.active_sections.get_mut(index) {
                    *flag = active;
                }
            }
            PresentationIntent::ShowContact => self.contact_visible = true,
            PresentationIntent::HideContact => self.contact_visible = false,
            PresentationIntent::HighlightExhibit { index, scale } => {
                self.highlighted.insert(index, scale);
            }
            PresentationIntent::ShowExhibitDetails(index) => self.exhibit_details = Some(index),
            PresentationIntent::HideExhibitDetails => self.exhibit_details = None,
            PresentationIntent::DepthOfFieldFocus(focus) => {
                self.depth_of_field_focus = Some(focus);
            }
        }
    }

    pub fn apply_all<'a>(&mut self, intents: impl IntoIterator<Item = &'a PresentationIntent>) {
        for intent in intents {
            self.apply(intent);
        }
    }

    /// Age every panel; drives the typewriter reveal.
    pub fn tick(&mut self, dt: f32) {
        for panel in self.panels.values_mut() {
            panel.age += dt.max(0.0);
        }
    }

    pub fn visible_panels(&self) -> impl Iterator<Item = (u32, &PanelView)> {
        self.panels
            .iter()
            .filter(|(_, p)| p.visible)
            .map(|(id, p)| (*id, p))
    }
}
