//! Ascent -- main loop and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. Device
//! events are translated into `InputEvent`s and queued as they arrive. All
//! simulation runs inside `RedrawRequested` using a **fixed-timestep** model
//! (see `FrameClock`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. resolve one queued asset and poll the loading barrier
//!   3. drain queued input through the navigator's guarded handlers
//!   4. `while should_step()` -- advance the navigator in fixed-dt slices
//!   5. clear the scene pass, composite the egui overlay, present
//!
//! Motion constants are tuned per 60 Hz step, which is why the navigator
//! never sees the raw frame delta.

mod assets;
mod audio;
#[cfg(test)]
mod replay;

use std::path::Path;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use ascent_core::handlers::{handle_resize, Resizable};
use ascent_core::input::{cursor_to_ndc, InputEvent, InputQueue, Key};
use ascent_core::loading::BarrierSignal;
use ascent_core::music::MusicState;
use ascent_core::{
    load_config_from_path, load_journey_from_path, DeviceTier, ExperienceConfig, FrameClock,
    Journey, LoadingBarrier, Navigator, PipelinePlan, PresentationState,
};
use ascent_overlay::{ExperienceOverlay, OverlayActions, OverlayStats, OverlayView};
use ascent_platform::window::{logical_width, PlatformConfig};
use ascent_render::{Compositor, GpuContext};
use assets::{AssetQueue, LoadedAsset};
use audio::MusicPlayer;

const CONFIG_PATH: &str = "assets/config/experience.json";
const JOURNEY_PATH: &str = "assets/content/journey.json";
const ASSET_ROOT: &str = "assets";
/// Browser-equivalent pixels per wheel line.
const WHEEL_LINE_PIXELS: f32 = 100.0;

/// Everything that exists once the window and GPU surface are available.
///
/// Ownership is split into three conceptual groups:
///  - **Runtime** (clock, input queue, navigator, presentation) -- advanced every frame
///  - **Loading** (barrier, asset queue) -- drives the reveal, idle afterwards
///  - **Music** (preference, player) -- asked about once the experience is ready
///  - **GPU resources** (context, compositor, overlay) -- sized by resize events
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    clock: FrameClock,
    input: InputQueue,
    navigator: Navigator,
    /// Hitboxes for click picking; the navigator keeps its own copy.
    picker: Journey,
    presentation: PresentationState,

    barrier: LoadingBarrier,
    assets: AssetQueue,

    music: MusicState,
    player: MusicPlayer,

    compositor: Compositor,
    overlay: ExperienceOverlay,
    tier: DeviceTier,
    small_screen: bool,
    shift_held: bool,
    background_set: bool,
}

impl EngineState {
    fn new(window: Arc<Window>) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let (width, height) = gpu.size;

        let config = load_config_from_path(Path::new(CONFIG_PATH)).unwrap_or_else(|err| {
            log::error!("{err}; falling back to default configuration");
            ExperienceConfig::default()
        });
        let journey = match load_journey_from_path(Path::new(JOURNEY_PATH)) {
            Ok(journey) => journey,
            Err(err) => {
                log::error!("{err}; falling back to the built-in journey");
                Journey::builtin().map_err(|e| e.to_string())?
            }
        };
        log::info!(
            "journey '{}': {} sections, {} exhibits, {} dialogs",
            journey.journey_id,
            journey.sections.len(),
            journey.planets.len(),
            journey.checkpoints.len()
        );

        let tier = DeviceTier::detect(&gpu.adapter_name);
        let compositor = Compositor::new(PipelinePlan::compose(tier), width, height);

        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let mut navigator = Navigator::new(config, journey.clone(), aspect);
        if let Some(focus) = compositor.depth_of_field_focus() {
            navigator.enable_depth_of_field(focus);
        }

        let small_screen = logical_width(&window) < f64::from(config.view.min_width);
        if small_screen {
            log::warn!(
                "window narrower than {}px, showing the small-screen notice",
                config.view.min_width
            );
        }

        let overlay = ExperienceOverlay::new(&gpu.device, gpu.surface_format, &window, &journey);

        Ok(Self {
            window,
            gpu,
            clock: FrameClock::new(),
            input: InputQueue::new(),
            presentation: PresentationState::new(journey.sections.len()),
            barrier: LoadingBarrier::new(config.loading),
            assets: AssetQueue::new(ASSET_ROOT, &journey.assets),
            music: MusicState::new(),
            player: MusicPlayer::new(config.music.volume),
            picker: journey,
            navigator,
            compositor,
            overlay,
            tier,
            small_screen,
            shift_held: false,
            background_set: false,
        })
    }

    /// Camera height within the band, `0.0` at the bottom.
    fn altitude(&self) -> f32 {
        let band = self.navigator.journey().band;
        let y = self.navigator.camera().position.y;
        ((y - band.min_y) / band.height().max(1.0)).clamp(0.0, 1.0)
    }

    fn on_loaded_asset(&mut self, asset: LoadedAsset) {
        match asset {
            LoadedAsset::Texture { url, size, rgba } => {
                if self.background_set {
                    log::debug!("texture {url} loaded, no slot for it");
                    return;
                }
                self.overlay.set_background(size, &rgba);
                self.background_set = true;
                log::info!("background texture {url} ready");
            }
            LoadedAsset::Audio { url, bytes } => {
                if self.player.set_track(&url, bytes) {
                    self.music.set_available();
                }
            }
            LoadedAsset::Blob { url, kind, bytes } => {
                log::debug!("{} {url} ready ({bytes} bytes)", kind.label());
            }
        }
    }

    fn on_barrier_signal(&mut self, signal: BarrierSignal) {
        match signal {
            BarrierSignal::AssetsLoaded { forced } => {
                if forced {
                    log::warn!("asset loading released without every asset");
                }
                self.navigator.spawn_astronaut();
            }
            BarrierSignal::ExperienceReady { forced } => {
                log::info!(
                    "experience ready{}",
                    if forced { " (frame wait timed out)" } else { "" }
                );
                self.navigator.reveal();
                self.music.on_ready();
            }
        }
    }

    fn apply_overlay_actions(&mut self, actions: OverlayActions) {
        if let Some(index) = actions.navigate_section {
            self.input.push(InputEvent::NavigateSection(index));
        }
        if let Some(index) = actions.navigate_planet {
            self.input.push(InputEvent::NavigatePlanet(index));
        }
        if actions.close_contact {
            self.input.push(InputEvent::CloseContact);
        }

        let command = match actions.music_answer {
            Some(play) => self.music.answer(play),
            None if actions.toggle_music => self.music.toggle(),
            None => None,
        };
        if let Some(command) = command {
            self.player.apply(command);
            log::info!(
                "music {}",
                if self.player.is_playing() { "playing" } else { "stopped" }
            );
        }
    }

    fn stats(&self) -> OverlayStats {
        OverlayStats {
            fps: self.clock.smoothed_fps,
            frame_time_ms: self.clock.smoothed_frame_time_ms,
            steps_this_frame: self.clock.steps_this_frame,
            focus_label: format!("{:?}", self.navigator.navigation().mode()),
            velocity: self.navigator.motion().velocity(),
            astronaut_y: self.navigator.astronaut().map(|a| a.y),
            tier_label: self.tier.label().to_string(),
            stages: self.compositor.plan().describe(),
            ledger: self.barrier.ledger(),
        }
    }

    /// Loading, input and fixed-step simulation for one frame.
    fn simulate(&mut self) {
        self.clock.begin_frame();

        if self.small_screen {
            self.input.clear();
            while self.clock.should_step() {}
            return;
        }

        let now = self.clock.total_time;
        if !self.assets.is_finished() {
            if let Some(asset) = self.assets.pump(&mut self.barrier, now) {
                self.on_loaded_asset(asset);
            }
        }
        for signal in self.barrier.poll(now) {
            self.on_barrier_signal(signal);
        }

        for event in self.input.drain() {
            self.navigator.dispatch(event, &self.picker);
        }

        let dt = self.clock.fixed_dt as f32;
        while self.clock.should_step() {
            let report = self.navigator.update(dt, self.clock.total_time);
            self.presentation.apply_all(&report.intents);
            self.presentation.tick(dt);
        }

        if let Some(focus) = self.presentation.depth_of_field_focus {
            self.compositor.set_depth_of_field_focus(focus);
        }
    }

    /// Returns whether a frame reached the screen.
    fn render(&mut self) -> bool {
        let Some((output, view)) = self.gpu.begin_frame() else {
            return false;
        };

        let stats = self.overlay.stats_visible.then(|| self.stats());
        let revealed = self.navigator.is_revealed();
        let overlay_view = OverlayView {
            journey: self.navigator.journey(),
            presentation: &self.presentation,
            camera: self.navigator.camera(),
            astronaut: self.navigator.astronaut(),
            loading: (!revealed).then(|| self.barrier.indicator()),
            interactive: revealed,
            small_screen: self.small_screen,
            music: &self.music,
            stats,
            time: self.clock.total_time,
        };
        let (egui_primitives, egui_textures_delta, overlay_actions) =
            self.overlay.prepare(&self.window, &overlay_view);
        self.apply_overlay_actions(overlay_actions);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.compositor
            .encode(&mut encoder, &view, self.altitude());

        self.overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        true
    }
}

struct App {
    config: PlatformConfig,
    state: Option<EngineState>,
}

impl App {
    fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = match ascent_platform::window::create_window(event_loop, &self.config) {
            Ok(window) => window,
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        match EngineState::new(window) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("Failed to initialise renderer: {err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state.overlay.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let mut targets: [&mut dyn Resizable; 3] =
                    [&mut state.gpu, &mut state.compositor, &mut state.navigator];
                handle_resize(&mut targets, physical_size.width, physical_size.height);
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                state.shift_held = modifiers.state().shift_key();
            }

            WindowEvent::KeyboardInput { event, .. }
                if !egui_consumed && event.state == ElementState::Pressed =>
            {
                let PhysicalKey::Code(key_code) = event.physical_key else {
                    return;
                };
                if key_code == KeyCode::KeyD && !event.repeat {
                    state.overlay.toggle_stats();
                    return;
                }
                let Some(key) = map_key(key_code) else {
                    return;
                };
                if key == Key::Escape && !state.navigator.navigation().contact_shown() {
                    log::info!("Escape pressed, exiting.");
                    event_loop.exit();
                    return;
                }
                state.input.push(InputEvent::Key {
                    key,
                    shift: state.shift_held,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.input.cursor = (position.x, position.y);
            }

            WindowEvent::MouseWheel { delta, .. } if !egui_consumed => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_PIXELS,
                    MouseScrollDelta::PixelDelta(position) => -position.y as f32,
                };
                state.input.push(InputEvent::Wheel { delta_y });
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let (width, height) = state.gpu.size;
                if let Some(ndc) = cursor_to_ndc(state.input.cursor, width, height) {
                    let over_ui = egui_consumed || state.overlay.pointer_over_ui();
                    state.input.push(InputEvent::Click { ndc, over_ui });
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }
                state.simulate();
                if state.render() {
                    state.barrier.mark_frame_presented();
                }
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Digit0 => Some(Key::Digit(0)),
        KeyCode::Digit1 => Some(Key::Digit(1)),
        KeyCode::Digit2 => Some(Key::Digit(2)),
        KeyCode::Digit3 => Some(Key::Digit(3)),
        KeyCode::Digit4 => Some(Key::Digit(4)),
        KeyCode::Digit5 => Some(Key::Digit(5)),
        KeyCode::Digit6 => Some(Key::Digit(6)),
        KeyCode::Digit7 => Some(Key::Digit(7)),
        KeyCode::Digit8 => Some(Key::Digit(8)),
        KeyCode::Digit9 => Some(Key::Digit(9)),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Ascent starting...");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {err}");
    }
}
