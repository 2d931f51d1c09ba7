//! Background music preference.
//!
//! Once the experience is ready the user is asked whether to play music.
//! After answering, a toggle starts and stops the loop. This module only
//! tracks the choice and tells the audio backend what to do.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MusicConfig {
    /// Linear gain of the music loop.
    pub volume: f32,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self { volume: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicPrompt {
    /// Not asked yet.
    Hidden,
    Asking,
    Answered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCommand {
    Play,
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MusicState {
    prompt: MusicPrompt,
    playing: bool,
    available: bool,
}

impl Default for MusicState {
    fn default() -> Self {
        Self::new()
    }
}

impl MusicState {
    pub fn new() -> Self {
        Self {
            prompt: MusicPrompt::Hidden,
            playing: false,
            available: false,
        }
    }

    pub fn prompt(&self) -> MusicPrompt {
        self.prompt
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// A track has been decoded and an output device is open.
    pub fn set_available(&mut self) {
        self.available = true;
    }

    /// The toggle button exists only after the prompt was answered.
    pub fn toggle_visible(&self) -> bool {
        self.available && self.prompt == MusicPrompt::Answered
    }

    /// Ask the question once the experience is ready. Without a track the
    /// question is skipped.
    pub fn on_ready(&mut self) {
        if self.prompt != MusicPrompt::Hidden {
            return;
        }
        if self.available {
            self.prompt = MusicPrompt::Asking;
        } else {
            log::info!("no music track available, skipping music prompt");
            self.prompt = MusicPrompt::Answered;
        }
    }

    pub fn answer(&mut self, play: bool) -> Option<MusicCommand> {
        if self.prompt != MusicPrompt::Asking {
            return None;
        }
        self.prompt = MusicPrompt::Answered;
        self.playing = play;
        play.then_some(MusicCommand::Play)
    }

    pub fn toggle(&mut self) -> Option<MusicCommand> {
        if !self.toggle_visible() {
            return None;
        }
        self.playing = !self.playing;
        Some(if self.playing {
            MusicCommand::Play
        } else {
            MusicCommand::Stop
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_with_track() -> MusicState {
        let mut music = MusicState::new();
        music.set_available();
        music.on_ready();
        music
    }

    #[test]
    fn prompt_appears_only_after_ready() {
        let mut music = MusicState::new();
        music.set_available();
        assert_eq!(music.prompt(), MusicPrompt::Hidden);
        assert_eq!(music.answer(true), None);
        assert_eq!(music.toggle(), None);

        music.on_ready();
        assert_eq!(music.prompt(), MusicPrompt::Asking);
        assert!(!music.toggle_visible());
    }

    #[test]
    fn yes_plays_and_toggle_flips() {
        let mut music = ready_with_track();
        assert_eq!(music.answer(true), Some(MusicCommand::Play));
        assert!(music.is_playing());
        assert!(music.toggle_visible());

        assert_eq!(music.toggle(), Some(MusicCommand::Stop));
        assert!(!music.is_playing());
        assert_eq!(music.toggle(), Some(MusicCommand::Play));
        assert!(music.is_playing());
    }

    #[test]
    fn no_stays_silent_until_toggled() {
        let mut music = ready_with_track();
        assert_eq!(music.answer(false), None);
        assert!(!music.is_playing());
        assert_eq!(music.answer(true), None);
        assert_eq!(music.toggle(), Some(MusicCommand::Play));
    }

    #[test]
    fn missing_track_skips_prompt_and_toggle() {
        let mut music = MusicState::new();
        music.on_ready();
        assert_eq!(music.prompt(), MusicPrompt::Answered);
        assert!(!music.toggle_visible());
        assert_eq!(music.toggle(), None);
        assert!(!music.is_playing());
    }

    #[test]
    fn ready_twice_does_not_reask() {
        let mut music = ready_with_track();
        music.answer(false);
        music.on_ready();
        assert_eq!(music.prompt(), MusicPrompt::Answered);
    }
}
