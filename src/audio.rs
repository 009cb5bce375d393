//! Sound cues and volume mixing
//!
//! The simulation only names cues; an `AudioBackend` makes the noise.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Ball fired from the launcher
    Shoot,
    /// Two balls of the same tier touched
    Blip,
    /// Two balls of different tiers bounced
    PoolBall,
}

/// Fire-and-forget cue playback
pub trait AudioBackend {
    /// `volume` is already mixed and in `(0, 1]`
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Audio manager for the game
pub struct AudioManager<B> {
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Manager with the volumes from `settings`
    pub fn from_settings(backend: B, settings: &Settings) -> Self {
        let mut audio = Self::new(backend);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        audio
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect at a cue volume in `[0, 1]`
    pub fn play(&mut self, effect: SoundEffect, volume: f32) {
        let vol = self.effective_volume() * volume.clamp(0.0, 1.0);
        if vol <= 0.0 {
            return;
        }
        self.backend.play(effect, vol);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Backend that keeps a log of everything it was asked to play
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub played: Vec<(SoundEffect, f32)>,
}

impl AudioBackend for RecordingBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::trace!("Cue {:?} at {:.3}", effect, volume);
        self.played.push((effect, volume));
    }
}
