//! Platform abstraction layer
//!
//! Services the shell consumes:
//! - Keypad levels, sampled once per frame
//! - Sprites, a background layer and screen blending
//! - Audio cue playback
//! - Frame pacing (the one place a frame blocks)

pub mod headless;

use glam::Vec2;

use crate::audio::{AudioBackend, AudioManager};
use crate::renderer::RenderError;

pub use headless::HeadlessPlatform;

/// Keys the game reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    A,
}

/// Raw key levels for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyLevels {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub a: bool,
}

impl KeyLevels {
    pub fn get(&self, key: Key) -> bool {
        match key {
            Key::Up => self.up,
            Key::Down => self.down,
            Key::Left => self.left,
            Key::Right => self.right,
            Key::A => self.a,
        }
    }
}

/// Held (level) and pressed (rising edge) queries over the last two samples
#[derive(Debug, Clone, Copy, Default)]
pub struct KeypadState {
    current: KeyLevels,
    previous: KeyLevels,
}

impl KeypadState {
    /// Shift in this frame's sample
    pub fn advance(&mut self, levels: KeyLevels) {
        self.previous = self.current;
        self.current = levels;
    }

    pub fn held(&self, key: Key) -> bool {
        self.current.get(key)
    }

    pub fn pressed(&self, key: Key) -> bool {
        self.current.get(key) && !self.previous.get(key)
    }
}

/// Opaque sprite handle handed out by a `SpriteService`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteHandle(pub u32);

/// Sprite sheets the game draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteAsset {
    /// One frame per tier
    Ball,
    Arrow,
    /// Digits 0-9, then the ball icon
    Numbers,
}

/// Visual-handle service: sprites, one background layer, screen blending
pub trait SpriteService {
    /// Create a sprite showing `frame` of `asset` at `position`
    fn create_sprite(
        &mut self,
        asset: SpriteAsset,
        position: Vec2,
        frame: u16,
    ) -> Result<SpriteHandle, RenderError>;

    /// Release a sprite; unknown handles are ignored
    fn destroy_sprite(&mut self, handle: SpriteHandle);

    fn set_position(&mut self, handle: SpriteHandle, position: Vec2) -> Result<(), RenderError>;
    fn set_scale(&mut self, handle: SpriteHandle, scale: f32) -> Result<(), RenderError>;
    /// Rotation in degrees
    fn set_rotation(&mut self, handle: SpriteHandle, degrees: f32) -> Result<(), RenderError>;
    fn set_blending(&mut self, handle: SpriteHandle, enabled: bool) -> Result<(), RenderError>;

    fn create_background(&mut self) -> Result<(), RenderError>;
    fn destroy_background(&mut self);
    /// Horizontal scroll of the background, in pixels (0 when there is none)
    fn background_x(&self) -> i32;
    fn set_background_x(&mut self, x: i32);

    /// Global alpha for blended sprites, `[0, 1]`
    fn set_transparency_alpha(&mut self, alpha: f32);
}

/// Everything a frame needs from the host
pub trait Platform {
    type Sprites: SpriteService;
    type Audio: AudioBackend;

    /// Sample key levels for this frame
    fn poll_keypad(&mut self) -> KeyLevels;
    fn sprites(&mut self) -> &mut Self::Sprites;
    fn audio(&mut self) -> &mut AudioManager<Self::Audio>;
    /// Block until the next display interval
    fn wait_for_vblank(&mut self);
}
