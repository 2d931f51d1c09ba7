//! Schematic scene layer painted behind the UI.
//!
//! Every world position goes through the shared `CameraRig`, so what is drawn
//! here lines up with what the picker hits.

use ascent_core::camera::CameraRig;
use egui::{pos2, Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, TextureHandle};
use glam::{Vec2, Vec3};

use crate::experience_overlay::OverlayView;

const TYPEWRITER_DELAY: f32 = 0.2;
const TYPEWRITER_CHAR: f32 = 0.015;
const STAR_COUNT: usize = 400;

/// Controls panel, placed beside the spawn point.
pub const INSTRUCTIONS_ANCHOR: Vec3 = Vec3::new(7.5, -3.0, 0.0);
pub const INSTRUCTIONS: [&str; 3] = [
    "Scroll to move",
    "Use arrows to move",
    "Click to interact",
];

const PLANET_COLORS: [Color32; 5] = [
    Color32::from_rgb(0xd9, 0x8c, 0x5f),
    Color32::from_rgb(0x6f, 0x9c, 0xd8),
    Color32::from_rgb(0xb3, 0x7f, 0xd1),
    Color32::from_rgb(0x7f, 0xc8, 0x9a),
    Color32::from_rgb(0xe0, 0xc0, 0x6a),
];

/// Map normalized device coordinates into a screen rectangle (y down).
pub fn ndc_to_screen(ndc: Vec2, screen: Rect) -> Pos2 {
    pos2(
        screen.left() + (ndc.x + 1.0) * 0.5 * screen.width(),
        screen.top() + (1.0 - ndc.y) * 0.5 * screen.height(),
    )
}

/// Characters revealed `age` seconds after a panel was instantiated.
pub fn typewriter_len(age: f32, char_count: usize) -> usize {
    if age < TYPEWRITER_DELAY {
        return 0;
    }
    let typed = ((age - TYPEWRITER_DELAY) / TYPEWRITER_CHAR).floor() as usize;
    typed.min(char_count)
}

/// Screen position of the controls panel, if its anchor is in view.
pub fn instructions_position(camera: &CameraRig, screen: Rect) -> Option<Pos2> {
    let pos = ndc_to_screen(camera.project(INSTRUCTIONS_ANCHOR)?, screen);
    screen.contains(pos).then_some(pos)
}

/// Deterministic star field filling the band's depth shell.
pub(crate) fn star_field(band_min: f32, band_max: f32) -> Vec<Vec3> {
    let mut seed: u32 = 0x9e37_79b9;
    let mut next = move || {
        // xorshift32
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        seed as f32 / u32::MAX as f32
    };
    let span = band_max - band_min + 100.0;
    (0..STAR_COUNT)
        .map(|_| {
            Vec3::new(
                (next() - 0.5) * 600.0,
                band_min - 50.0 + next() * span,
                -60.0 - next() * 300.0,
            )
        })
        .collect()
}

/// World units to screen points at the depth of `world`.
fn world_scale(camera: &CameraRig, world: Vec3, screen: Rect) -> f32 {
    let distance = (camera.position.z - world.z).max(camera.near);
    screen.height() / camera.visible_height_at(distance)
}

pub(crate) fn paint_scene(
    painter: &Painter,
    screen: Rect,
    view: &OverlayView<'_>,
    stars: &[Vec3],
    background: Option<&TextureHandle>,
) {
    let camera = view.camera;
    let band = view.journey.band;

    if let Some(texture) = background {
        let progress = ((camera.position.y - band.min_y) / band.height().max(1.0)).clamp(0.0, 1.0);
        let top = 0.5 * (1.0 - progress);
        let uv = Rect::from_min_max(pos2(0.0, top), pos2(1.0, top + 0.5));
        painter.image(texture.id(), screen, uv, Color32::WHITE);
    }

    for star in stars {
        if let Some(ndc) = camera.project(*star) {
            let pos = ndc_to_screen(ndc, screen);
            if screen.contains(pos) {
                painter.circle_filled(pos, 1.0, Color32::from_gray(200));
            }
        }
    }

    for (index, planet) in view.journey.planets.iter().enumerate() {
        let Some(ndc) = camera.project(planet.position) else {
            continue;
        };
        let scale = view
            .presentation
            .highlighted
            .get(&index)
            .copied()
            .unwrap_or(1.0);
        let center = ndc_to_screen(ndc, screen);
        let radius = planet.size * scale * world_scale(camera, planet.position, screen);
        let color = PLANET_COLORS[index % PLANET_COLORS.len()];
        painter.circle_filled(center, radius, color);
        if scale > 1.0 {
            painter.circle_stroke(center, radius + 2.0, Stroke::new(2.0, Color32::WHITE));
        }
        painter.text(
            center + egui::vec2(0.0, radius + 6.0),
            Align2::CENTER_TOP,
            &planet.name,
            FontId::proportional(13.0),
            Color32::from_gray(220),
        );
    }

    for checkpoint in &view.journey.checkpoints {
        let Some(ndc) = camera.project(checkpoint.position) else {
            continue;
        };
        let [r, g, b] = checkpoint.color_rgb();
        painter.circle_stroke(
            ndc_to_screen(ndc, screen),
            4.0,
            Stroke::new(1.5, Color32::from_rgb(r, g, b)),
        );
    }

    let beacon = view.journey.contact;
    if let Some(ndc) = camera.project(beacon.position) {
        let center = ndc_to_screen(ndc, screen);
        let pulse = 1.0 + 0.15 * (view.time as f32 * 3.0).sin();
        let radius = beacon.pick_radius * pulse * world_scale(camera, beacon.position, screen);
        painter.circle_filled(center, radius, Color32::from_rgba_unmultiplied(90, 200, 255, 60));
        painter.circle_stroke(center, radius, Stroke::new(2.0, Color32::from_rgb(90, 200, 255)));
    }

    if let Some(astronaut) = view.astronaut {
        if let Some(ndc) = camera.project(astronaut) {
            let center = ndc_to_screen(ndc, screen);
            let height = view.journey.astronaut.height * world_scale(camera, astronaut, screen);
            let body = Rect::from_center_size(center, egui::vec2(height * 0.45, height));
            painter.rect_filled(body, height * 0.2, Color32::from_gray(235));
            painter.circle_filled(
                center - egui::vec2(0.0, height * 0.25),
                height * 0.18,
                Color32::from_rgb(40, 60, 90),
            );
        }
    }
}
