//! Experience UI rendered via egui on top of the scene.
//!
//! Integration pattern: egui requires a three-phase render split because
//! `egui_wgpu::Renderer::render()` needs a `RenderPass<'static>`, while
//! `begin_render_pass` borrows the encoder. The phases are:
//!
//!   1. `prepare()` -- run egui UI logic, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! The overlay only reads the runtime's state. Anything the user asks for
//! (a section, a planet, closing the contact modal, music) comes back as
//! `OverlayActions` for the caller to act on.

use ascent_core::camera::CameraRig;
use ascent_core::content::Journey;
use ascent_core::loading::{IndicatorState, LoadingLedger, ProgressIndicator};
use ascent_core::music::{MusicPrompt, MusicState};
use ascent_core::presentation::PresentationState;
use egui::{Align2, Color32, RichText};
use glam::Vec3;
use winit::window::Window;

use crate::scene_painter::{self, ndc_to_screen, typewriter_len, INSTRUCTIONS};

const DIALOG_WIDTH: f32 = 280.0;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub fps: f64,
    pub frame_time_ms: f64,
    pub steps_this_frame: u32,
    /// Current focus mode (e.g. "Free", "DialogLock { checkpoint: 3 }")
    pub focus_label: String,
    pub velocity: f32,
    pub astronaut_y: Option<f32>,
    /// Device tier label (e.g. "Tier 2 (mid)")
    pub tier_label: String,
    pub stages: String,
    pub ledger: LoadingLedger,
}

/// Everything one frame of UI reads.
pub struct OverlayView<'a> {
    pub journey: &'a Journey,
    pub presentation: &'a PresentationState,
    pub camera: &'a CameraRig,
    pub astronaut: Option<Vec3>,
    /// Shown while assets are loading; `None` once the experience is ready.
    pub loading: Option<&'a ProgressIndicator>,
    /// Navigation controls are live only after the reveal.
    pub interactive: bool,
    pub small_screen: bool,
    pub music: &'a MusicState,
    pub stats: Option<OverlayStats>,
    pub time: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayActions {
    pub navigate_section: Option<usize>,
    pub navigate_planet: Option<usize>,
    pub close_contact: bool,
    /// Answer to the "play music?" question.
    pub music_answer: Option<bool>,
    pub toggle_music: bool,
}

pub struct ExperienceOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub stats_visible: bool,
    background: Option<egui::TextureHandle>,
    stars: Vec<Vec3>,
    pointer_over_ui: bool,
}

impl ExperienceOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
        journey: &Journey,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            stats_visible: false,
            background: None,
            stars: scene_painter::star_field(journey.band.min_y, journey.band.max_y),
            pointer_over_ui: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    pub fn toggle_stats(&mut self) {
        self.stats_visible = !self.stats_visible;
        log::info!("Stats window: {}", if self.stats_visible { "ON" } else { "OFF" });
    }

    /// Whether the pointer was over an interactive panel last frame.
    pub fn pointer_over_ui(&self) -> bool {
        self.pointer_over_ui
    }

    /// Register the decoded background image (RGBA8).
    pub fn set_background(&mut self, size: [usize; 2], rgba: &[u8]) {
        if size[0] * size[1] * 4 != rgba.len() {
            log::warn!(
                "background is {}x{} but has {} bytes, ignoring",
                size[0],
                size[1],
                rgba.len()
            );
            return;
        }
        let image = egui::ColorImage::from_rgba_unmultiplied(size, rgba);
        self.background = Some(self.egui_ctx.load_texture(
            "background",
            image,
            egui::TextureOptions::LINEAR,
        ));
        log::debug!("background texture registered ({}x{})", size[0], size[1]);
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        view: &OverlayView<'_>,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let stars = &self.stars;
        let background = self.background.as_ref();
        let stats_visible = self.stats_visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if view.small_screen {
                small_screen_notice(ctx);
                return;
            }

            let screen = ctx.screen_rect();
            let painter = ctx.layer_painter(egui::LayerId::background());
            scene_painter::paint_scene(&painter, screen, view, stars, background);

            if let Some(indicator) = view.loading {
                loading_indicator(ctx, indicator);
            }
            if view.interactive {
                navigation_bar(ctx, view, &mut actions);
                instructions_panel(ctx, view, screen);
            }
            dialog_panels(ctx, view, screen);
            exhibit_details(ctx, view);
            if view.presentation.contact_visible {
                contact_modal(ctx, &mut actions);
            }
            music_controls(ctx, view.music, &mut actions);
            if stats_visible {
                if let Some(ref stats) = view.stats {
                    stats_window(ctx, stats);
                }
            }
        });
        self.pointer_over_ui = self.egui_ctx.is_pointer_over_area();

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures that egui no longer needs. Call after rendering.
    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn small_screen_notice(ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.centered_and_justified(|ui| {
            ui.heading("This experience needs a wider window. Please come back on a larger screen.");
        });
    });
}

fn loading_indicator(ctx: &egui::Context, indicator: &ProgressIndicator) {
    egui::Area::new(egui::Id::new("loading"))
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                let text = RichText::new(&indicator.text);
                let text = match indicator.state {
                    IndicatorState::Error => text.color(Color32::from_rgb(240, 90, 90)),
                    IndicatorState::Complete => text.color(Color32::from_rgb(120, 220, 140)),
                    IndicatorState::Loading => text,
                };
                ui.label(text);
                ui.add(
                    egui::ProgressBar::new(indicator.percent / 100.0)
                        .desired_width(320.0)
                        .show_percentage(),
                );
            });
        });
}

fn navigation_bar(ctx: &egui::Context, view: &OverlayView<'_>, actions: &mut OverlayActions) {
    egui::TopBottomPanel::top("navigation").show(ctx, |ui| {
        ui.horizontal(|ui| {
            for (index, section) in view.journey.sections.iter().enumerate() {
                let active = view
                    .presentation
                    .active_sections
                    .get(index)
                    .copied()
                    .unwrap_or(false);
                if ui.selectable_label(active, &section.name).clicked() {
                    actions.navigate_section = Some(index);
                }
            }
            if !view.journey.planets.is_empty() {
                ui.separator();
                ui.menu_button("Exhibits", |ui| {
                    for (index, planet) in view.journey.planets.iter().enumerate() {
                        if ui.button(&planet.name).clicked() {
                            actions.navigate_planet = Some(index);
                            ui.close_menu();
                        }
                    }
                });
            }
        });
    });
}

fn instructions_panel(ctx: &egui::Context, view: &OverlayView<'_>, screen: egui::Rect) {
    let Some(pos) = scene_painter::instructions_position(view.camera, screen) else {
        return;
    };
    egui::Area::new(egui::Id::new("instructions"))
        .fixed_pos(pos)
        .pivot(Align2::LEFT_CENTER)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(RichText::new("Controls").strong());
                for line in INSTRUCTIONS {
                    ui.label(line);
                }
            });
        });
}

fn dialog_panels(ctx: &egui::Context, view: &OverlayView<'_>, screen: egui::Rect) {
    for (id, panel) in view.presentation.visible_panels() {
        let Some(checkpoint) = view.journey.checkpoint(id) else {
            continue;
        };
        let Some(ndc) = view.camera.project(panel.anchor) else {
            continue;
        };
        let [r, g, b] = checkpoint.color_rgb();
        let accent = Color32::from_rgb(r, g, b);
        let char_count = checkpoint.text.chars().count();
        let typed = typewriter_len(panel.age, char_count);

        egui::Area::new(egui::Id::new(("dialog", id)))
            .fixed_pos(ndc_to_screen(ndc, screen))
            .pivot(Align2::LEFT_BOTTOM)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(DIALOG_WIDTH);
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&checkpoint.title).strong().color(accent));
                        if let Some(badge) = &checkpoint.badge {
                            ui.label(RichText::new(badge).small().color(accent));
                        }
                    });
                    if !checkpoint.theme.is_empty() {
                        ui.label(RichText::new(&checkpoint.theme).italics());
                    }
                    let shown: String = checkpoint.text.chars().take(typed).collect();
                    ui.label(shown);
                    if typed == char_count {
                        for fact in &checkpoint.facts {
                            ui.label(format!("\u{2022} {fact}"));
                        }
                    }
                });
            });
    }
}

fn exhibit_details(ctx: &egui::Context, view: &OverlayView<'_>) {
    let Some(planet) = view
        .presentation
        .exhibit_details
        .and_then(|index| view.journey.planet(index))
    else {
        return;
    };
    egui::Window::new(&planet.name)
        .id(egui::Id::new("exhibit_details"))
        .anchor(Align2::RIGHT_CENTER, [-24.0, 0.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            if !planet.description.is_empty() {
                ui.label(&planet.description);
            }
            if !planet.tech.is_empty() {
                ui.separator();
                ui.label(RichText::new(planet.tech.join(" \u{00b7} ")).small());
            }
            for link in &planet.links {
                ui.hyperlink_to(&link.title, &link.url);
            }
        });
}

fn contact_modal(ctx: &egui::Context, actions: &mut OverlayActions) {
    egui::Window::new("Contact")
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .collapsible(false)
        .resizable(false)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.label("Thanks for making the climb. Reach out and say hello.");
            ui.add_space(8.0);
            if ui.button("Close").clicked() {
                actions.close_contact = true;
            }
        });
}

fn music_controls(ctx: &egui::Context, music: &MusicState, actions: &mut OverlayActions) {
    if music.prompt() == MusicPrompt::Asking {
        egui::Window::new("Music")
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .collapsible(false)
            .resizable(false)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.label("Play background music during the climb?");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        actions.music_answer = Some(true);
                    }
                    if ui.button("No").clicked() {
                        actions.music_answer = Some(false);
                    }
                });
            });
    }
    if music.toggle_visible() {
        egui::Area::new(egui::Id::new("music_toggle"))
            .anchor(Align2::RIGHT_BOTTOM, [-16.0, -16.0])
            .show(ctx, |ui| {
                let label = if music.is_playing() { "Stop music" } else { "Play music" };
                if ui.button(label).clicked() {
                    actions.toggle_music = true;
                }
            });
    }
}

fn stats_window(ctx: &egui::Context, stats: &OverlayStats) {
    egui::Window::new("Stats")
        .default_pos([10.0, 40.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", stats.fps));
            ui.label(format!("Frame time: {:.2} ms", stats.frame_time_ms));
            ui.label(format!("Steps this frame: {}", stats.steps_this_frame));
            ui.separator();
            ui.label(format!("Focus: {}", stats.focus_label));
            ui.label(format!("Velocity: {:.4}", stats.velocity));
            match stats.astronaut_y {
                Some(y) => ui.label(format!("Astronaut y: {y:.2}")),
                None => ui.label("Astronaut: not spawned"),
            };
            ui.separator();
            ui.label(format!("Fidelity: {}", stats.tier_label));
            ui.label(format!("Stages: {}", stats.stages));
            ui.label(format!(
                "Assets: {}/{}{}",
                stats.ledger.loaded_resources,
                stats.ledger.total_resources,
                if stats.ledger.completion_fired { " (latched)" } else { "" }
            ));
        });
}
