//! Read-only journey dataset: navigable band, page sections, planet exhibits,
//! dialog checkpoints and the contact beacon.
//!
//! The runtime only reads positions, ids and text from here. Validation is
//! strict on ordering and identifiers so the state machine can index sections
//! and look up checkpoints without re-checking.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::Deserialize;

use crate::error::ContentError;
use crate::motion::Band;

const SUPPORTED_VERSION: &str = "0.1";
const BUILTIN_JOURNEY: &str = include_str!("../../../assets/content/journey.json");

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Journey {
    pub version: String,
    pub journey_id: String,
    pub band: Band,
    pub astronaut: AstronautSpec,
    pub sections: Vec<SectionBoundary>,
    #[serde(default)]
    pub planets: Vec<PlanetExhibit>,
    #[serde(default)]
    pub checkpoints: Vec<DialogCheckpoint>,
    pub contact: ContactBeacon,
    #[serde(default)]
    pub assets: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct AstronautSpec {
    pub spawn: Vec3,
    pub height: f32,
}

/// One navigable page section. Sections are listed in navigation order.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SectionBoundary {
    pub name: String,
    pub min_y: f32,
    pub max_y: f32,
}

impl SectionBoundary {
    pub fn range(&self) -> Band {
        Band::new(self.min_y, self.max_y)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PlanetExhibit {
    pub name: String,
    pub position: Vec3,
    pub size: f32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub links: Vec<ExhibitLink>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ExhibitLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DialogCheckpoint {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    pub text: String,
    pub position: Vec3,
    #[serde(default)]
    pub facts: Vec<String>,
}

impl DialogCheckpoint {
    /// Accent color parsed from `#RRGGBB`, white when malformed.
    pub fn color_rgb(&self) -> [u8; 3] {
        parse_hex_color(&self.color).unwrap_or([255, 255, 255])
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct ContactBeacon {
    pub position: Vec3,
    pub pick_radius: f32,
}

impl Journey {
    /// The journey shipped with the binary.
    pub fn builtin() -> Result<Self, ContentError> {
        parse_journey(BUILTIN_JOURNEY, "built-in journey")
    }

    pub fn planet(&self, index: usize) -> Option<&PlanetExhibit> {
        self.planets.get(index)
    }

    pub fn section(&self, index: usize) -> Option<&SectionBoundary> {
        self.sections.get(index)
    }

    pub fn checkpoint(&self, id: u32) -> Option<&DialogCheckpoint> {
        self.checkpoints.iter().find(|c| c.id == id)
    }
}

pub fn load_journey_from_path(path: &Path) -> Result<Journey, ContentError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_journey(&raw, &path.display().to_string())
}

pub fn parse_journey(raw: &str, origin: &str) -> Result<Journey, ContentError> {
    let journey: Journey = serde_json::from_str(raw).map_err(|source| ContentError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    validate_journey(&journey, origin)?;
    Ok(journey)
}

fn validate_journey(journey: &Journey, origin: &str) -> Result<(), ContentError> {
    if journey.version != SUPPORTED_VERSION {
        return Err(ContentError::invalid(
            origin,
            format!("unsupported version '{}'", journey.version),
        ));
    }
    if journey.band.min_y >= journey.band.max_y {
        return Err(ContentError::invalid(origin, "band is empty"));
    }
    if journey.astronaut.height <= 0.0 {
        return Err(ContentError::invalid(origin, "astronaut height must be > 0"));
    }
    validate_sections(journey, origin)?;

    for planet in &journey.planets {
        if planet.size <= 0.0 {
            return Err(ContentError::invalid(
                origin,
                format!("planet '{}' has non-positive size", planet.name),
            ));
        }
    }

    let mut ids = HashSet::new();
    for checkpoint in &journey.checkpoints {
        if !ids.insert(checkpoint.id) {
            return Err(ContentError::invalid(
                origin,
                format!("duplicate checkpoint id {}", checkpoint.id),
            ));
        }
    }

    if journey.contact.pick_radius <= 0.0 {
        return Err(ContentError::invalid(origin, "contact pick_radius must be > 0"));
    }
    Ok(())
}

/// Sections may be listed in any order but must tile the band exactly.
fn validate_sections(journey: &Journey, origin: &str) -> Result<(), ContentError> {
    if journey.sections.is_empty() {
        return Err(ContentError::invalid(origin, "sections array is empty"));
    }

    let mut ranges: Vec<Band> = journey.sections.iter().map(|s| s.range()).collect();
    if let Some(section) = journey.sections.iter().find(|s| s.min_y >= s.max_y) {
        return Err(ContentError::invalid(
            origin,
            format!("section '{}' is empty", section.name),
        ));
    }
    ranges.sort_by(|a, b| a.min_y.total_cmp(&b.min_y));

    let (first, last) = (ranges[0], ranges[ranges.len() - 1]);
    if first.min_y != journey.band.min_y || last.max_y != journey.band.max_y {
        return Err(ContentError::invalid(
            origin,
            "sections do not cover the navigable band",
        ));
    }
    for pair in ranges.windows(2) {
        if pair[0].max_y != pair[1].min_y {
            return Err(ContentError::invalid(
                origin,
                format!(
                    "sections are not contiguous at y={} / y={}",
                    pair[0].max_y, pair[1].min_y
                ),
            ));
        }
    }
    Ok(())
}

fn parse_hex_color(raw: &str) -> Option<[u8; 3]> {
    let hex = raw.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

fn default_color() -> String {
    "#FFFFFF".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "ascent_journey_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn minimal(sections: &str) -> String {
        format!(
            r#"{{
              "version": "0.1",
              "journey_id": "test",
              "band": {{ "min_y": 0.0, "max_y": 100.0 }},
              "astronaut": {{ "spawn": [0.0, 0.0, 0.0], "height": 2.0 }},
              "sections": {sections},
              "contact": {{ "position": [0.0, 90.0, 0.0], "pick_radius": 2.0 }}
            }}"#
        )
    }

    #[test]
    fn builtin_journey_is_valid() {
        let journey = Journey::builtin().expect("built-in journey should parse");
        assert_eq!(journey.band, Band::new(-5.0, 475.0));
        assert_eq!(journey.sections.len(), 4);
        assert_eq!(journey.planets.len(), 5);
        assert_eq!(journey.checkpoints.len(), 10);
        assert_eq!(journey.checkpoint(1).map(|c| c.position.y), Some(30.0));
        assert_eq!(journey.checkpoint(9).map(|c| c.color_rgb()), Some([0xE9, 0x54, 0x20]));
    }

    #[test]
    fn load_journey_from_path_parses_minimal_file() {
        let path = temp_file_path("minimal");
        fs::write(
            &path,
            minimal(r#"[{ "name": "a", "min_y": 50.0, "max_y": 100.0 }, { "name": "b", "min_y": 0.0, "max_y": 50.0 }]"#),
        )
        .expect("write temp file");

        let journey = load_journey_from_path(&path).expect("minimal journey should load");
        assert!(journey.planets.is_empty());
        assert!(journey.checkpoints.is_empty());
        assert_eq!(journey.section(0).map(|s| s.name.as_str()), Some("a"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_gap_between_sections() {
        let raw = minimal(
            r#"[{ "name": "a", "min_y": 0.0, "max_y": 40.0 }, { "name": "b", "min_y": 50.0, "max_y": 100.0 }]"#,
        );
        let err = parse_journey(&raw, "gap").expect_err("gap should fail");
        assert!(err.to_string().contains("not contiguous"));
    }

    #[test]
    fn rejects_sections_not_covering_band() {
        let raw = minimal(r#"[{ "name": "a", "min_y": 0.0, "max_y": 90.0 }]"#);
        let err = parse_journey(&raw, "short").expect_err("short coverage should fail");
        assert!(err.to_string().contains("do not cover"));
    }

    #[test]
    fn rejects_duplicate_checkpoint_ids() {
        let mut journey = Journey::builtin().expect("builtin");
        let duplicate = journey.checkpoints[0].clone();
        journey.checkpoints.push(duplicate);
        let err = validate_journey(&journey, "dup").expect_err("duplicate ids should fail");
        assert!(err.to_string().contains("duplicate checkpoint id 0"));
    }

    #[test]
    fn rejects_unknown_version() {
        let raw = minimal(r#"[{ "name": "a", "min_y": 0.0, "max_y": 100.0 }]"#)
            .replace("\"0.1\"", "\"9.9\"");
        let err = parse_journey(&raw, "version").expect_err("bad version should fail");
        assert!(matches!(err, ContentError::Invalid { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = temp_file_path("missing");
        let err = load_journey_from_path(&path).expect_err("missing file should fail");
        assert!(matches!(err, ContentError::Io { .. }));
    }

    #[test]
    fn hex_color_parsing() {
        assert_eq!(parse_hex_color("#4FC3F7"), Some([0x4F, 0xC3, 0xF7]));
        assert_eq!(parse_hex_color("4FC3F7"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }
}
