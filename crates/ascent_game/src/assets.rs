//! Cooperative asset queue feeding the loading barrier.
//!
//! One manifest entry is resolved per frame so the loading indicator keeps
//! animating. Every outcome is reported to the barrier; nothing here decides
//! when the experience is ready.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ascent_core::loading::{AssetKind, LoadingBarrier};

use crate::audio;

/// First bytes of a binary glTF container.
const GLB_MAGIC: &[u8; 4] = b"glTF";

#[derive(Debug)]
pub enum LoadedAsset {
    /// Decoded RGBA8 pixels.
    Texture {
        url: String,
        size: [usize; 2],
        rgba: Vec<u8>,
    },
    /// Encoded audio that decodes cleanly; decoding again happens at playback.
    Audio {
        url: String,
        bytes: Arc<[u8]>,
    },
    /// Size of anything the runtime only needs to know exists.
    Blob {
        url: String,
        kind: AssetKind,
        bytes: usize,
    },
}

pub struct AssetQueue {
    root: PathBuf,
    pending: VecDeque<String>,
    total: u32,
    loaded: u32,
    started: bool,
    finished: bool,
}

impl AssetQueue {
    pub fn new(root: impl Into<PathBuf>, manifest: &[String]) -> Self {
        Self {
            root: root.into(),
            pending: manifest.iter().cloned().collect(),
            total: manifest.len() as u32,
            loaded: 0,
            started: false,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Resolve at most one asset and report it to `barrier`.
    pub fn pump(&mut self, barrier: &mut LoadingBarrier, now: f64) -> Option<LoadedAsset> {
        if self.finished {
            return None;
        }
        if !self.started {
            self.started = true;
            if let Some(first) = self.pending.front() {
                barrier.on_start(first, 0, self.total, now);
            }
        }

        let Some(url) = self.pending.pop_front() else {
            self.finish(barrier, now);
            return None;
        };

        let outcome = match load_asset(&self.root, &url) {
            Ok(asset) => {
                self.loaded += 1;
                barrier.on_progress(&url, self.loaded, self.total, now);
                Some(asset)
            }
            Err(err) => {
                log::error!("{err}");
                barrier.on_error(&url, now);
                None
            }
        };

        if self.pending.is_empty() {
            self.finish(barrier, now);
        }
        outcome
    }

    fn finish(&mut self, barrier: &mut LoadingBarrier, now: f64) {
        self.finished = true;
        log::debug!("asset queue drained ({}/{})", self.loaded, self.total);
        barrier.on_all_complete(now);
    }
}

fn load_asset(root: &Path, url: &str) -> Result<LoadedAsset, String> {
    let path = root.join(url);
    let bytes =
        fs::read(&path).map_err(|e| format!("Failed to read asset '{}': {e}", path.display()))?;
    match AssetKind::from_url(url) {
        AssetKind::Texture => {
            let image = image::load_from_memory(&bytes)
                .map_err(|e| format!("Failed to decode texture '{}': {e}", path.display()))?
                .to_rgba8();
            let size = [image.width() as usize, image.height() as usize];
            log::debug!("decoded {url} ({}x{})", size[0], size[1]);
            Ok(LoadedAsset::Texture {
                url: url.to_string(),
                size,
                rgba: image.into_raw(),
            })
        }
        AssetKind::Audio => {
            let bytes: Arc<[u8]> = Arc::from(bytes);
            audio::check_decodes(&bytes)
                .map_err(|e| format!("Failed to decode audio '{}': {e}", path.display()))?;
            Ok(LoadedAsset::Audio {
                url: url.to_string(),
                bytes,
            })
        }
        AssetKind::Model if url.ends_with(".glb") && !bytes.starts_with(GLB_MAGIC) => Err(format!(
            "Failed to parse model '{}': missing glTF header",
            path.display()
        )),
        kind => Ok(LoadedAsset::Blob {
            url: url.to_string(),
            kind,
            bytes: bytes.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascent_core::content::Journey;
    use ascent_core::loading::{BarrierSignal, IndicatorState, LoadingConfig};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "ascent_assets_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(dir.join("textures")).expect("create temp asset dir");
        dir
    }

    /// Mono 16-bit PCM WAV holding `samples` of silence.
    fn wav_bytes(samples: u32) -> Vec<u8> {
        let data_len = samples * 2;
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVEfmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&8000u32.to_le_bytes());
        wav.extend_from_slice(&16000u32.to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());
        wav.resize(wav.len() + data_len as usize, 0);
        wav
    }

    fn write_texture(dir: &Path, name: &str) {
        image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]))
            .save(dir.join("textures").join(name))
            .expect("write png");
    }

    #[test]
    fn loads_one_asset_per_pump_then_latches() {
        let dir = temp_dir("clean");
        write_texture(&dir, "sky.png");
        let wav = wav_bytes(400);
        fs::write(dir.join("theme.wav"), &wav).expect("write audio");

        let manifest = vec!["textures/sky.png".to_string(), "theme.wav".to_string()];
        let mut queue = AssetQueue::new(&dir, &manifest);
        let mut barrier = LoadingBarrier::new(LoadingConfig::default());

        match queue.pump(&mut barrier, 0.0) {
            Some(LoadedAsset::Texture { size, rgba, .. }) => {
                assert_eq!(size, [2, 3]);
                assert_eq!(rgba.len(), 2 * 3 * 4);
            }
            other => panic!("expected a texture, got {other:?}"),
        }
        assert!(!queue.is_finished());
        assert_eq!(barrier.ledger().loaded_resources, 1);

        match queue.pump(&mut barrier, 0.1) {
            Some(LoadedAsset::Audio { url, bytes }) => {
                assert_eq!(url, "theme.wav");
                assert_eq!(bytes.len(), wav.len());
            }
            other => panic!("expected audio, got {other:?}"),
        }
        assert!(queue.is_finished());
        assert!(queue.pump(&mut barrier, 0.2).is_none());

        assert!(barrier.poll(0.5).is_empty());
        assert_eq!(
            barrier.poll(1.5),
            vec![BarrierSignal::AssetsLoaded { forced: false }]
        );

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_asset_is_reported_and_forces_release() {
        let dir = temp_dir("missing");
        write_texture(&dir, "sky.png");

        let manifest = vec![
            "textures/sky.png".to_string(),
            "models/astronaut.glb".to_string(),
        ];
        let mut queue = AssetQueue::new(&dir, &manifest);
        let mut barrier = LoadingBarrier::new(LoadingConfig::default());

        assert!(queue.pump(&mut barrier, 0.0).is_some());
        assert!(queue.pump(&mut barrier, 0.1).is_none());
        assert!(queue.is_finished());
        assert_eq!(barrier.indicator().state, IndicatorState::Error);

        assert!(barrier.poll(1.5).is_empty());
        assert_eq!(
            barrier.poll(2.5),
            vec![BarrierSignal::AssetsLoaded { forced: true }]
        );
        assert_eq!(barrier.ledger().loaded_resources, 2);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn undecodable_texture_counts_as_failure() {
        let dir = temp_dir("corrupt");
        fs::write(dir.join("textures").join("broken.webp"), b"not an image").expect("write");

        let manifest = vec!["textures/broken.webp".to_string()];
        let mut queue = AssetQueue::new(&dir, &manifest);
        let mut barrier = LoadingBarrier::new(LoadingConfig::default());

        assert!(queue.pump(&mut barrier, 0.0).is_none());
        assert!(queue.is_finished());
        assert_eq!(barrier.ledger().loaded_resources, 0);
        assert_eq!(barrier.indicator().text, "Error loading: broken.webp");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn models_without_a_gltf_header_fail() {
        let dir = temp_dir("model");
        fs::create_dir_all(dir.join("models")).expect("create model dir");
        fs::write(dir.join("models").join("bad.glb"), b"nope").expect("write");
        let mut good = GLB_MAGIC.to_vec();
        good.extend_from_slice(&[2, 0, 0, 0, 12, 0, 0, 0]);
        fs::write(dir.join("models").join("good.glb"), &good).expect("write");

        let manifest = vec!["models/good.glb".to_string(), "models/bad.glb".to_string()];
        let mut queue = AssetQueue::new(&dir, &manifest);
        let mut barrier = LoadingBarrier::new(LoadingConfig::default());

        match queue.pump(&mut barrier, 0.0) {
            Some(LoadedAsset::Blob { kind, bytes, .. }) => {
                assert_eq!(kind, AssetKind::Model);
                assert_eq!(bytes, 12);
            }
            other => panic!("expected a model blob, got {other:?}"),
        }
        assert!(queue.pump(&mut barrier, 0.1).is_none());
        assert_eq!(barrier.indicator().text, "Error loading: bad.glb");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn shipped_manifest_loads_cleanly() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets");
        let journey = Journey::builtin().expect("built-in journey");
        let mut queue = AssetQueue::new(&root, &journey.assets);
        let mut barrier = LoadingBarrier::new(LoadingConfig::default());

        let mut now = 0.0;
        let mut textures = 0;
        let mut tracks = 0;
        while !queue.is_finished() {
            match queue.pump(&mut barrier, now) {
                Some(LoadedAsset::Texture { .. }) => textures += 1,
                Some(LoadedAsset::Audio { .. }) => tracks += 1,
                Some(LoadedAsset::Blob { .. }) => {}
                None => assert!(queue.is_finished(), "asset failed at {now}"),
            }
            now += 0.1;
        }

        let ledger = barrier.ledger();
        assert_eq!(ledger.loaded_resources, ledger.total_resources);
        assert_eq!(ledger.total_resources as usize, journey.assets.len());
        assert_ne!(barrier.indicator().state, IndicatorState::Error);
        assert_eq!(textures, 1);
        assert_eq!(tracks, 1);
        assert_eq!(
            barrier.poll(now + 1.0),
            vec![BarrierSignal::AssetsLoaded { forced: false }]
        );
    }

    #[test]
    fn empty_manifest_latches_after_settle() {
        let mut queue = AssetQueue::new("unused", &[]);
        let mut barrier = LoadingBarrier::new(LoadingConfig::default());

        assert!(queue.pump(&mut barrier, 0.0).is_none());
        assert!(queue.is_finished());
        assert_eq!(
            barrier.poll(1.0),
            vec![BarrierSignal::AssetsLoaded { forced: false }]
        );
    }
}
