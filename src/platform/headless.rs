//! Headless platform: scripted input, tile-memory sprites, recorded audio

use super::{KeyLevels, Platform};
use crate::audio::{AudioManager, RecordingBackend};
use crate::renderer::TileSpriteService;
use crate::settings::{AutopilotSettings, Settings};

/// Scripted player: sweeps the aim up and down and fires on a fixed beat
#[derive(Debug, Clone)]
pub struct Autopilot {
    fire_interval: u64,
    sweep_period: u64,
    frame: u64,
}

impl Autopilot {
    pub fn new(settings: &AutopilotSettings) -> Self {
        Self {
            // Fire needs a release frame between presses
            fire_interval: settings.fire_interval.max(2),
            sweep_period: settings.sweep_period.max(1),
            frame: 0,
        }
    }

    /// Key levels for the next frame
    pub fn next_levels(&mut self) -> KeyLevels {
        let frame = self.frame;
        self.frame += 1;

        let sweeping_up = (frame / self.sweep_period) % 2 == 0;
        KeyLevels {
            up: sweeping_up,
            down: !sweeping_up,
            a: frame % self.fire_interval == 0,
            ..Default::default()
        }
    }
}

pub struct HeadlessPlatform {
    autopilot: Autopilot,
    sprites: TileSpriteService,
    audio: AudioManager<RecordingBackend>,
    vblanks: u64,
}

impl HeadlessPlatform {
    pub fn new(settings: &Settings) -> Self {
        Self {
            autopilot: Autopilot::new(&settings.autopilot),
            sprites: TileSpriteService::new(),
            audio: AudioManager::from_settings(RecordingBackend::default(), settings),
            vblanks: 0,
        }
    }

    /// Frames presented so far
    pub fn vblanks(&self) -> u64 {
        self.vblanks
    }

    pub fn sprite_service(&self) -> &TileSpriteService {
        &self.sprites
    }

    pub fn audio_manager(&self) -> &AudioManager<RecordingBackend> {
        &self.audio
    }
}

impl Platform for HeadlessPlatform {
    type Sprites = TileSpriteService;
    type Audio = RecordingBackend;

    fn poll_keypad(&mut self) -> KeyLevels {
        self.autopilot.next_levels()
    }

    fn sprites(&mut self) -> &mut TileSpriteService {
        &mut self.sprites
    }

    fn audio(&mut self) -> &mut AudioManager<RecordingBackend> {
        &mut self.audio
    }

    fn wait_for_vblank(&mut self) {
        self.vblanks += 1;
    }
}
