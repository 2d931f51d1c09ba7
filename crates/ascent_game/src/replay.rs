use ascent_core::config::ExperienceConfig;
use ascent_core::content::Journey;
use ascent_core::director::{FrameReport, Navigator};
use ascent_core::input::{InputEvent, Key};
use ascent_core::presentation::PresentationState;
use glam::Vec2;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Delivered before the first repetition only.
    #[serde(default)]
    pub events: Vec<ReplayEvent>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ReplayEvent {
    Wheel(f32),
    Up,
    Down,
    Digit {
        digit: u8,
        #[serde(default)]
        shift: bool,
    },
    Escape,
    Click([f32; 2]),
    Section(usize),
    Planet(usize),
    CloseContact,
}

impl ReplayEvent {
    fn to_input(self) -> InputEvent {
        let key = |key| InputEvent::Key { key, shift: false };
        match self {
            Self::Wheel(delta_y) => InputEvent::Wheel { delta_y },
            Self::Up => key(Key::Up),
            Self::Down => key(Key::Down),
            Self::Digit { digit, shift } => InputEvent::Key {
                key: Key::Digit(digit),
                shift,
            },
            Self::Escape => key(Key::Escape),
            Self::Click([x, y]) => InputEvent::Click {
                ndc: Vec2::new(x, y),
                over_ui: false,
            },
            Self::Section(index) => InputEvent::NavigateSection(index),
            Self::Planet(index) => InputEvent::NavigatePlanet(index),
            Self::CloseContact => InputEvent::CloseContact,
        }
    }
}

impl ReplaySequence {
    /// One entry per fixed step: the events to dispatch before it.
    pub fn expanded_inputs(&self) -> Vec<Vec<InputEvent>> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for repeat in 0..frame.repeat.max(1) {
                if repeat == 0 {
                    out.push(frame.events.iter().map(|e| e.to_input()).collect());
                } else {
                    out.push(Vec::new());
                }
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

pub struct ReplayOutcome {
    /// One report per fixed step.
    pub reports: Vec<FrameReport>,
    pub presentation: PresentationState,
    pub navigator: Navigator,
}

/// Drive a revealed navigator through the script.
pub fn run_replay(replay: &ReplaySequence, journey: Journey) -> ReplayOutcome {
    let picker = journey.clone();
    let mut presentation = PresentationState::new(journey.sections.len());
    let mut navigator = Navigator::new(ExperienceConfig::default(), journey, 16.0 / 9.0);
    navigator.spawn_astronaut();
    navigator.reveal();

    let mut now = 0.0_f64;
    let mut reports = Vec::new();
    for events in replay.expanded_inputs() {
        for event in events {
            navigator.dispatch(event, &picker);
        }
        now += f64::from(replay.fixed_dt);
        let report = navigator.update(replay.fixed_dt, now);
        presentation.apply_all(&report.intents);
        presentation.tick(replay.fixed_dt);
        reports.push(report);
    }
    ReplayOutcome {
        reports,
        presentation,
        navigator,
    }
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascent_core::navigation::FocusMode;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "ascent_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn quiet_journey() -> Journey {
        let mut journey = Journey::builtin().expect("built-in journey");
        journey.checkpoints.clear();
        journey
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "fixed_dt": 0.016666667,
              "frames": [
                { "events": [{ "wheel": -120.0 }, "up"], "repeat": 3 },
                { "events": [{ "digit": { "digit": 2, "shift": true } }] }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 4);
        assert_eq!(expanded[0].len(), 2);
        assert!(expanded[1].is_empty());
        assert_eq!(
            expanded[3],
            vec![InputEvent::Key {
                key: Key::Digit(2),
                shift: true
            }]
        );

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay must fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "repeat": 90 },
                { "events": [{ "wheel": -400.0 }], "repeat": 40 },
                { "events": ["up", "up"], "repeat": 60 },
                { "events": [{ "click": [0.0, 0.0] }], "repeat": 30 },
                { "events": [{ "section": 1 }], "repeat": 200 },
                { "events": [{ "wheel": 300.0 }], "repeat": 120 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let journey = Journey::builtin().expect("built-in journey");
        let run_a = run_replay(&replay, journey.clone());
        let run_b = run_replay(&replay, journey);

        assert_eq!(run_a.reports, run_b.reports);
        assert_eq!(run_a.presentation.panels, run_b.presentation.panels);
        assert_eq!(
            run_a.presentation.active_sections,
            run_b.presentation.active_sections
        );
        assert_eq!(
            run_a.navigator.navigation().mode(),
            run_b.navigator.navigation().mode()
        );
        assert!(run_a
            .reports
            .iter()
            .all(|report| report.snapshot.is_consistent()));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn scripted_section_jump_settles_inside_the_section() {
        let replay = ReplaySequence {
            fixed_dt: default_dt(),
            frames: vec![
                ReplayFrame {
                    events: Vec::new(),
                    repeat: 90,
                },
                ReplayFrame {
                    events: vec![ReplayEvent::Section(2)],
                    repeat: 300,
                },
            ],
        };
        let journey = quiet_journey();
        let skills = journey.sections[2].range();
        let outcome = run_replay(&replay, journey);

        assert_eq!(outcome.navigator.navigation().mode(), FocusMode::Free);
        let y = outcome.navigator.astronaut().expect("astronaut spawned").y;
        assert!(skills.contains(y), "astronaut at {y} outside {skills:?}");
        assert_eq!(
            outcome.presentation.active_sections,
            vec![false, false, true, false]
        );
    }

    #[test]
    fn section_jump_onto_a_checkpoint_engages_its_dialog() {
        let replay = ReplaySequence {
            fixed_dt: default_dt(),
            frames: vec![
                ReplayFrame {
                    events: Vec::new(),
                    repeat: 90,
                },
                ReplayFrame {
                    events: vec![ReplayEvent::Section(2)],
                    repeat: 300,
                },
            ],
        };
        let outcome = run_replay(&replay, Journey::builtin().expect("built-in journey"));

        assert_eq!(
            outcome.navigator.navigation().mode(),
            FocusMode::DialogLock { checkpoint: 1 }
        );
        assert!(outcome.navigator.dialogs().is_visited(1));
        assert!(outcome
            .presentation
            .panels
            .get(&1)
            .is_some_and(|panel| panel.visible));
    }
}
