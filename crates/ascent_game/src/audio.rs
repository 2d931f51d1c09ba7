//! Background music output.
//!
//! Built on `rodio` when the `audio` feature is enabled (the default). Without
//! it the player never opens a device and the music prompt is skipped.

use std::sync::Arc;

use ascent_core::music::MusicCommand;

#[cfg(feature = "audio")]
mod backend {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    pub struct AudioOutput {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    pub fn open_output() -> Option<AudioOutput> {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Some(AudioOutput {
                _stream: stream,
                handle,
            }),
            Err(err) => {
                log::warn!("Audio output unavailable: {err}");
                None
            }
        }
    }

    /// Fails when the bytes are not a supported audio format.
    pub fn check_decodes(bytes: &Arc<[u8]>) -> Result<(), String> {
        Decoder::new(Cursor::new(bytes.clone()))
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    pub struct Voice(Sink);

    impl Voice {
        pub fn looped(output: &AudioOutput, track: &Arc<[u8]>, volume: f32) -> Result<Self, String> {
            let sink = Sink::try_new(&output.handle).map_err(|e| e.to_string())?;
            let source = Decoder::new_looped(Cursor::new(track.clone())).map_err(|e| e.to_string())?;
            sink.set_volume(volume);
            sink.append(source);
            Ok(Self(sink))
        }

        pub fn stop(self) {
            self.0.stop();
        }
    }
}

#[cfg(not(feature = "audio"))]
mod backend {
    use std::sync::Arc;

    pub struct AudioOutput;

    pub fn open_output() -> Option<AudioOutput> {
        log::info!("built without audio output");
        None
    }

    pub fn check_decodes(_bytes: &Arc<[u8]>) -> Result<(), String> {
        Ok(())
    }

    pub struct Voice;

    impl Voice {
        pub fn looped(_output: &AudioOutput, _track: &Arc<[u8]>, _volume: f32) -> Result<Self, String> {
            Err("built without audio output".to_string())
        }

        pub fn stop(self) {}
    }
}

pub use backend::check_decodes;
use backend::{AudioOutput, Voice};

pub struct MusicPlayer {
    output: Option<AudioOutput>,
    track: Option<Arc<[u8]>>,
    voice: Option<Voice>,
    volume: f32,
}

impl MusicPlayer {
    pub fn new(volume: f32) -> Self {
        Self::with_output(backend::open_output(), volume)
    }

    fn with_output(output: Option<AudioOutput>, volume: f32) -> Self {
        Self {
            output,
            track: None,
            voice: None,
            volume,
        }
    }

    /// Keep the first decoded track. Returns whether it can be played.
    pub fn set_track(&mut self, url: &str, bytes: Arc<[u8]>) -> bool {
        if self.track.is_some() {
            log::debug!("music track already set, ignoring {url}");
            return false;
        }
        log::info!("music track {url} ready");
        self.track = Some(bytes);
        self.output.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.voice.is_some()
    }

    pub fn apply(&mut self, command: MusicCommand) {
        match command {
            MusicCommand::Play => self.play(),
            MusicCommand::Stop => self.stop(),
        }
    }

    fn play(&mut self) {
        self.stop();
        let (Some(output), Some(track)) = (&self.output, &self.track) else {
            return;
        };
        match Voice::looped(output, track, self.volume) {
            Ok(voice) => self.voice = Some(voice),
            Err(err) => log::error!("Failed to start music: {err}"),
        }
    }

    fn stop(&mut self) {
        if let Some(voice) = self.voice.take() {
            voice.stop();
        }
    }
}
