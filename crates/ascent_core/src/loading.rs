//! Asset loading barrier.
//!
//! Loader callbacks feed a single ledger. Completion is a one-shot latch
//! armed by a deadline: the happy path settles briefly, a count mismatch or a
//! load error waits longer and then forces release. After the latch, the
//! experience becomes ready once a frame has been presented, with a hard
//! timeout in case that never happens. Nothing here owns a timer; the caller
//! polls with the current time.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadingConfig {
    /// Delay between a clean completion report and the latch.
    pub settle_delay: f64,
    /// Wait before forcing completion when counts disagree.
    pub mismatch_wait: f64,
    /// Wait before releasing after a failed asset.
    pub error_release: f64,
    /// Delay between the latch and checking for a presented frame.
    pub reveal_grace: f64,
    /// Give up waiting for a presented frame after this long.
    pub frame_timeout: f64,
    /// Progress text gains an elapsed-time suffix after this long.
    pub slow_load_after: f64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            settle_delay: 1.0,
            mismatch_wait: 2.0,
            error_release: 2.0,
            reveal_grace: 1.0,
            frame_timeout: 10.0,
            slow_load_after: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Texture,
    Model,
    Audio,
    Resource,
}

impl AssetKind {
    pub fn from_url(url: &str) -> Self {
        let extension = url.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
        match extension.as_str() {
            "jpg" | "jpeg" | "png" | "webp" => Self::Texture,
            "glb" | "gltf" => Self::Model,
            "mp3" | "wav" | "ogg" => Self::Audio,
            _ => Self::Resource,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Texture => "texture",
            Self::Model => "3D model",
            Self::Audio => "audio",
            Self::Resource => "resource",
        }
    }
}

fn file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorState {
    #[default]
    Loading,
    Complete,
    Error,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressIndicator {
    pub text: String,
    /// `0.0..=100.0`
    pub percent: f32,
    pub state: IndicatorState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadingLedger {
    pub total_resources: u32,
    pub loaded_resources: u32,
    pub completion_fired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierSignal {
    /// Every asset resolved (or the wait was cut short).
    AssetsLoaded { forced: bool },
    /// Assets latched and a frame was presented (or the frame wait timed out).
    ExperienceReady { forced: bool },
}

#[derive(Debug, Clone, Copy)]
struct Release {
    at: f64,
    forced: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LoadingBarrier {
    pub config: LoadingConfig,
    ledger: LoadingLedger,
    indicator: ProgressIndicator,
    started_at: Option<f64>,
    release: Option<Release>,
    latched_at: Option<f64>,
    frame_presented: bool,
    ready: bool,
}

impl LoadingBarrier {
    pub fn new(config: LoadingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn ledger(&self) -> LoadingLedger {
        self.ledger
    }

    pub fn indicator(&self) -> &ProgressIndicator {
        &self.indicator
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn on_start(&mut self, url: &str, _loaded: u32, total: u32, now: f64) {
        self.started_at.get_or_insert(now);
        self.ledger.total_resources = self.ledger.total_resources.max(total);
        if self.ledger.completion_fired {
            return;
        }
        let kind = AssetKind::from_url(url);
        log::debug!("loading started: {url} ({})", kind.label());
        self.indicator.text = format!("Loading {} assets...", kind.label());
    }

    pub fn on_progress(&mut self, url: &str, loaded: u32, total: u32, now: f64) {
        let started = *self.started_at.get_or_insert(now);
        self.ledger.total_resources = self.ledger.total_resources.max(total);
        self.ledger.loaded_resources = self.ledger.loaded_resources.max(loaded);
        if self.ledger.completion_fired {
            return;
        }

        if total > 0 {
            self.indicator.percent = (loaded as f32 / total as f32 * 100.0).min(100.0);
        }
        let kind = AssetKind::from_url(url);
        let mut text = format!("Loading {}: {}", kind.label(), file_name(url));
        let elapsed = now - started;
        if elapsed > self.config.slow_load_after {
            text.push_str(&format!(" ({elapsed:.1}s)"));
        }
        log::debug!("{text} [{loaded}/{total}]");
        self.indicator.text = text;
    }

    /// Every registered loader reported done.
    pub fn on_all_complete(&mut self, now: f64) {
        if self.ledger.completion_fired {
            return;
        }
        let LoadingLedger {
            total_resources: total,
            loaded_resources: loaded,
            ..
        } = self.ledger;
        if loaded >= total {
            self.mark_complete();
            self.schedule(now + self.config.settle_delay, false);
        } else {
            log::warn!(
                "loaders report complete but only {loaded}/{total} resources loaded, waiting"
            );
            if self.indicator.state != IndicatorState::Error {
                self.indicator.text = format!("Finalizing... ({loaded}/{total})");
            }
            self.schedule(now + self.config.mismatch_wait, true);
        }
    }

    pub fn on_error(&mut self, url: &str, now: f64) {
        log::error!("error loading asset: {url}");
        if self.ledger.completion_fired {
            return;
        }
        self.indicator.text = format!("Error loading: {}", file_name(url));
        self.indicator.state = IndicatorState::Error;
        self.schedule(now + self.config.error_release, true);
    }

    /// Report a successfully presented frame. Frames before the asset latch
    /// show an incomplete scene and do not count.
    pub fn mark_frame_presented(&mut self) {
        if self.ledger.completion_fired && !self.frame_presented {
            log::debug!("first frame presented after assets latched");
            self.frame_presented = true;
        }
    }

    pub fn poll(&mut self, now: f64) -> Vec<BarrierSignal> {
        let mut signals = Vec::new();

        if !self.ledger.completion_fired {
            if let Some(release) = self.release.filter(|r| now >= r.at) {
                self.ledger.completion_fired = true;
                self.latched_at = Some(now);
                if release.forced {
                    self.ledger.loaded_resources = self.ledger.total_resources;
                    if self.indicator.state != IndicatorState::Error {
                        self.mark_complete();
                    }
                }
                log::info!(
                    "assets loaded ({} resources{})",
                    self.ledger.total_resources,
                    if release.forced { ", forced" } else { "" }
                );
                signals.push(BarrierSignal::AssetsLoaded {
                    forced: release.forced,
                });
            }
        }

        if let Some(latched_at) = self.latched_at.filter(|_| !self.ready) {
            let check_from = latched_at + self.config.reveal_grace;
            if now >= check_from {
                if self.frame_presented {
                    self.ready = true;
                    signals.push(BarrierSignal::ExperienceReady { forced: false });
                } else if now >= check_from + self.config.frame_timeout {
                    log::warn!(
                        "no frame presented {:.0}s after loading, revealing anyway",
                        self.config.frame_timeout
                    );
                    self.ready = true;
                    signals.push(BarrierSignal::ExperienceReady { forced: true });
                }
            }
        }

        signals
    }

    fn mark_complete(&mut self) {
        self.indicator.text = "All assets loaded successfully!".to_string();
        self.indicator.percent = 100.0;
        self.indicator.state = IndicatorState::Complete;
    }

    /// Keep the earliest pending deadline.
    fn schedule(&mut self, at: f64, forced: bool) {
        match self.release {
            Some(existing) if existing.at <= at => {}
            _ => self.release = Some(Release { at, forced }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_all(barrier: &mut LoadingBarrier, count: u32, now: f64) {
        barrier.on_start("textures/space_blue.webp", 0, count, now);
        for i in 1..=count {
            barrier.on_progress(&format!("models/item{i}.glb"), i, count, now);
        }
    }

    #[test]
    fn asset_kinds_from_extension() {
        assert_eq!(AssetKind::from_url("a/b/space.WEBP"), AssetKind::Texture);
        assert_eq!(AssetKind::from_url("astro.glb"), AssetKind::Model);
        assert_eq!(AssetKind::from_url("music/space.mp3"), AssetKind::Audio);
        assert_eq!(AssetKind::from_url("data.bin"), AssetKind::Resource);
        assert_eq!(AssetKind::from_url(""), AssetKind::Resource);
    }

    #[test]
    fn clean_completion_settles_then_latches() {
        let mut barrier = LoadingBarrier::default();
        load_all(&mut barrier, 3, 0.0);
        barrier.on_all_complete(0.5);
        assert_eq!(barrier.indicator().state, IndicatorState::Complete);

        assert!(barrier.poll(1.4).is_empty());
        assert_eq!(
            barrier.poll(1.5),
            vec![BarrierSignal::AssetsLoaded { forced: false }]
        );
        assert!(barrier.ledger().completion_fired);
    }

    #[test]
    fn nine_of_ten_forces_completion_after_wait() {
        let mut barrier = LoadingBarrier::default();
        load_all(&mut barrier, 9, 0.0);
        barrier.on_start("music/space.mp3", 9, 10, 0.0);
        barrier.on_all_complete(1.0);

        assert_eq!(barrier.indicator().text, "Finalizing... (9/10)");
        assert!(barrier.poll(2.0).is_empty());
        assert!(barrier.poll(2.9).is_empty());
        assert_eq!(
            barrier.poll(3.0),
            vec![BarrierSignal::AssetsLoaded { forced: true }]
        );
        assert_eq!(barrier.ledger().loaded_resources, 10);
        assert_eq!(barrier.indicator().percent, 100.0);
    }

    #[test]
    fn latch_fires_exactly_once() {
        let mut barrier = LoadingBarrier::default();
        load_all(&mut barrier, 2, 0.0);
        barrier.on_all_complete(0.0);
        let mut fired = 0;
        for step in 0..600 {
            let now = step as f64 * 0.05;
            if step % 7 == 0 {
                barrier.on_progress("late.png", 2, 2, now);
                barrier.on_all_complete(now);
                barrier.on_error("broken.png", now);
            }
            fired += barrier
                .poll(now)
                .iter()
                .filter(|s| matches!(s, BarrierSignal::AssetsLoaded { .. }))
                .count();
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn error_still_releases() {
        let mut barrier = LoadingBarrier::default();
        barrier.on_start("models/astrov2.glb", 0, 2, 0.0);
        barrier.on_error("models/astrov2.glb", 0.2);
        assert_eq!(barrier.indicator().state, IndicatorState::Error);
        assert_eq!(barrier.indicator().text, "Error loading: astrov2.glb");

        barrier.on_all_complete(0.3);
        assert_eq!(barrier.indicator().text, "Error loading: astrov2.glb");

        assert!(barrier.poll(2.1).is_empty());
        assert_eq!(
            barrier.poll(2.3),
            vec![BarrierSignal::AssetsLoaded { forced: true }]
        );
        assert_eq!(barrier.indicator().state, IndicatorState::Error);
    }

    #[test]
    fn earliest_deadline_wins() {
        let mut barrier = LoadingBarrier::default();
        load_all(&mut barrier, 1, 0.0);
        barrier.on_all_complete(0.0);
        barrier.on_error("late.png", 0.5);
        assert_eq!(
            barrier.poll(1.0),
            vec![BarrierSignal::AssetsLoaded { forced: false }]
        );
    }

    #[test]
    fn ready_waits_for_presented_frame() {
        let mut barrier = LoadingBarrier::default();
        load_all(&mut barrier, 1, 0.0);
        barrier.on_all_complete(0.0);

        barrier.mark_frame_presented();
        assert_eq!(barrier.poll(1.0).len(), 1);
        assert!(barrier.poll(1.5).is_empty());

        barrier.mark_frame_presented();
        assert_eq!(
            barrier.poll(2.0),
            vec![BarrierSignal::ExperienceReady { forced: false }]
        );
        assert!(barrier.is_ready());
        assert!(barrier.poll(5.0).is_empty());
    }

    #[test]
    fn ready_times_out_without_frames() {
        let mut barrier = LoadingBarrier::default();
        load_all(&mut barrier, 1, 0.0);
        barrier.on_all_complete(0.0);
        barrier.poll(1.0);

        assert!(barrier.poll(11.9).is_empty());
        assert_eq!(
            barrier.poll(12.0),
            vec![BarrierSignal::ExperienceReady { forced: true }]
        );
    }

    #[test]
    fn slow_progress_shows_elapsed_time() {
        let mut barrier = LoadingBarrier::default();
        barrier.on_start("textures/a.png", 0, 2, 10.0);
        barrier.on_progress("textures/a.png", 1, 2, 11.0);
        assert_eq!(barrier.indicator().text, "Loading texture: a.png");
        barrier.on_progress("models/b.glb", 2, 2, 12.5);
        assert_eq!(barrier.indicator().text, "Loading 3D model: b.glb (2.5s)");
        assert_eq!(barrier.indicator().percent, 100.0);
    }
}
