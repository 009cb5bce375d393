//! Game shell: runs the frame loop over a `Platform`
//!
//! The simulation only records events; this is where they become sprites,
//! HUD digits and sounds.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::consts::*;
use crate::fixed::{Fixed, FixedVec2, degrees_cos, degrees_sin};
use crate::platform::{Key, KeypadState, Platform, SpriteAsset, SpriteHandle, SpriteService};
use crate::renderer::{RenderError, render_number};
use crate::sim::{GameEvent, GameState, TickInput, tick};
use crate::tier_scale;

/// Ball sprite for `tier`, scaled to match
fn create_ball_sprite<S: SpriteService + ?Sized>(
    sprites: &mut S,
    position: Vec2,
    tier: u8,
) -> Result<SpriteHandle, RenderError> {
    let handle = sprites.create_sprite(SpriteAsset::Ball, position, u16::from(tier))?;
    sprites.set_scale(handle, tier_scale(tier).to_f32())?;
    Ok(handle)
}

fn vec2(origin: (f32, f32)) -> Vec2 {
    Vec2::new(origin.0, origin.1)
}

/// Aim arrow placement for a launch angle: (position, rotation in degrees)
pub fn arrow_transform(angle: i32) -> (Vec2, f32) {
    let offset = FixedVec2::new(
        degrees_sin(angle) * ARROW_RADIUS,
        degrees_cos(angle) * ARROW_RADIUS,
    );
    let position = LAUNCH_ORIGIN + offset;
    let rotation = (180 + angle).rem_euclid(360);
    (position.to_vec2(), rotation as f32)
}

/// Triangle-wave blend alpha for a pulse phase in `[0, 2]`
fn blend_alpha(phase: Fixed) -> Fixed {
    if phase > Fixed::ONE {
        Fixed::from_int(2) - phase
    } else {
        phase
    }
}

pub struct Game<P: Platform> {
    platform: P,
    state: GameState,
    keypad: KeypadState,
    /// Sprite per live ball, by ball id
    ball_sprites: BTreeMap<u32, SpriteHandle>,
    /// On-deck preview at the launch origin
    casting: SpriteHandle,
    arrow: SpriteHandle,
    ball_icon: SpriteHandle,
    score_digits: Vec<SpriteHandle>,
    remaining_digits: Vec<SpriteHandle>,
    /// Blend pulse phase, `[0, 2]`
    pulse: Fixed,
    frames: u64,
}

impl<P: Platform> Game<P> {
    /// Set up the arena, HUD and background for a fresh run
    pub fn new(mut platform: P, seed: u64) -> Result<Self, RenderError> {
        let state = GameState::new(seed);
        let sprites = platform.sprites();

        let casting = create_ball_sprite(sprites, LAUNCH_ORIGIN.to_vec2(), state.arena.next_tier)?;
        sprites.set_blending(casting, true)?;

        let (arrow_position, arrow_rotation) = arrow_transform(state.arena.launch_angle);
        let arrow = sprites.create_sprite(SpriteAsset::Arrow, arrow_position, 0)?;
        sprites.set_rotation(arrow, arrow_rotation)?;

        sprites.create_background()?;

        let mut remaining_digits = Vec::with_capacity(REMAINING_DIGITS);
        render_number(
            sprites,
            &mut remaining_digits,
            REMAINING_DIGITS,
            vec2(REMAINING_ORIGIN),
            state.balls.remaining() as u32,
        )?;
        let mut score_digits = Vec::with_capacity(SCORE_DIGITS);
        render_number(
            sprites,
            &mut score_digits,
            SCORE_DIGITS,
            vec2(SCORE_ORIGIN),
            state.arena.score,
        )?;

        let ball_icon =
            sprites.create_sprite(SpriteAsset::Numbers, vec2(BALL_ICON_ORIGIN), BALL_ICON_FRAME)?;

        log::info!("Game ready (seed {:#x})", seed);
        Ok(Self {
            platform,
            state,
            keypad: KeypadState::default(),
            ball_sprites: BTreeMap::new(),
            casting,
            arrow,
            ball_icon,
            score_digits,
            remaining_digits,
            pulse: Fixed::ZERO,
            frames: 0,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn ball_sprite(&self, id: u32) -> Option<SpriteHandle> {
        self.ball_sprites.get(&id).copied()
    }

    pub fn casting(&self) -> SpriteHandle {
        self.casting
    }

    pub fn arrow(&self) -> SpriteHandle {
        self.arrow
    }

    pub fn ball_icon(&self) -> SpriteHandle {
        self.ball_icon
    }

    pub fn score_digits(&self) -> &[SpriteHandle] {
        &self.score_digits
    }

    pub fn remaining_digits(&self) -> &[SpriteHandle] {
        &self.remaining_digits
    }

    /// Run one frame, ending in the wait for the next display interval
    pub fn frame(&mut self) -> Result<(), RenderError> {
        let levels = self.platform.poll_keypad();
        self.keypad.advance(levels);

        self.scroll_background();
        self.pulse_blend();

        let input = TickInput {
            aim_up: self.keypad.held(Key::Up),
            aim_down: self.keypad.held(Key::Down),
            launch: self.keypad.pressed(Key::A),
        };
        tick(&mut self.state, &input);

        self.present()?;
        self.frames += 1;
        self.platform.wait_for_vblank();
        Ok(())
    }

    /// Run frames until `frame_limit` (forever when `None`)
    pub fn run(&mut self, frame_limit: Option<u64>) -> Result<(), RenderError> {
        while frame_limit.is_none_or(|limit| self.frames < limit) {
            self.frame()?;
        }
        log::info!(
            "Stopped after {} frames, score {}, {} balls",
            self.frames,
            self.state.arena.score,
            self.state.balls.len()
        );
        Ok(())
    }

    fn scroll_background(&mut self) {
        let sprites = self.platform.sprites();
        let x = (sprites.background_x() + 1) % BACKGROUND_WRAP;
        sprites.set_background_x(x);
    }

    fn pulse_blend(&mut self) {
        self.pulse += BLEND_STEP;
        if self.pulse > Fixed::from_int(2) {
            self.pulse = Fixed::ZERO;
        }
        self.platform
            .sprites()
            .set_transparency_alpha(blend_alpha(self.pulse).to_f32());
    }

    /// Bring the visuals in line with the state after a tick
    fn present(&mut self) -> Result<(), RenderError> {
        let (position, rotation) = arrow_transform(self.state.arena.launch_angle);
        let sprites = self.platform.sprites();
        sprites.set_position(self.arrow, position)?;
        sprites.set_rotation(self.arrow, rotation)?;

        for event in self.state.drain_events() {
            self.apply(event)?;
        }

        let sprites = self.platform.sprites();
        for ball in &self.state.balls {
            if let Some(handle) = self.ball_sprites.get(&ball.id) {
                sprites.set_position(*handle, ball.pos.to_vec2())?;
            }
        }
        Ok(())
    }

    fn apply(&mut self, event: GameEvent) -> Result<(), RenderError> {
        match event {
            GameEvent::Launched { id, tier } => {
                let sprites = self.platform.sprites();
                let handle = create_ball_sprite(sprites, LAUNCH_ORIGIN.to_vec2(), tier)?;
                self.ball_sprites.insert(id, handle);
            }
            GameEvent::NextTierRolled { tier } => {
                let sprites = self.platform.sprites();
                sprites.destroy_sprite(self.casting);
                self.casting = create_ball_sprite(sprites, LAUNCH_ORIGIN.to_vec2(), tier)?;
                sprites.set_blending(self.casting, true)?;
            }
            GameEvent::Merged {
                consumed,
                survivor,
                tier,
            } => {
                let sprites = self.platform.sprites();
                if let Some(handle) = self.ball_sprites.remove(&consumed) {
                    sprites.destroy_sprite(handle);
                }
                // Tier variants are separate frames: swap the survivor's sprite
                if let Some(old) = self.ball_sprites.remove(&survivor) {
                    sprites.destroy_sprite(old);
                    let position = self
                        .state
                        .balls
                        .find(survivor)
                        .map_or(LAUNCH_ORIGIN, |ball| ball.pos)
                        .to_vec2();
                    let handle = create_ball_sprite(sprites, position, tier)?;
                    self.ball_sprites.insert(survivor, handle);
                }
            }
            GameEvent::ScoreChanged { score } => render_number(
                self.platform.sprites(),
                &mut self.score_digits,
                SCORE_DIGITS,
                vec2(SCORE_ORIGIN),
                score,
            )?,
            GameEvent::RemainingChanged { remaining } => render_number(
                self.platform.sprites(),
                &mut self.remaining_digits,
                REMAINING_DIGITS,
                vec2(REMAINING_ORIGIN),
                remaining as u32,
            )?,
            GameEvent::Cue { effect, volume } => {
                self.platform.audio().play(effect, volume.to_f32());
            }
        }
        Ok(())
    }
}
