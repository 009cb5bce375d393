//! Merge Arena - a tile-based merge arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball physics, collisions, merging)
//! - `fixed`: Q12 fixed-point scalar and degree trigonometry
//! - `hw`: Tile memory compositing (`commit`, `plot_tiles`)
//! - `renderer`: Tile-backed sprite service, assets and digit displays
//! - `platform`: Keypad/sprite/audio/vsync service traits and a headless backend
//! - `game`: Frame loop shell binding the sim to a platform

pub mod audio;
pub mod fixed;
pub mod game;
pub mod hw;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use fixed::{Fixed, FixedVec2};
pub use settings::Settings;

use consts::{LAUNCH_SPEED, TIER_SCALE_STEP};
use fixed::{degrees_cos, degrees_sin};

/// Game configuration constants
pub mod consts {
    use crate::fixed::{Fixed, FixedVec2};

    /// Arena half extents; balls reflect once they pass these moving outward
    pub const ARENA_HALF_WIDTH: Fixed = Fixed::from_int(100);
    pub const ARENA_HALF_HEIGHT: Fixed = Fixed::from_int(60);

    /// Maximum live balls
    pub const BALL_CAPACITY: usize = 32;

    /// Per-axis velocity decay per frame
    pub const FRICTION: Fixed = Fixed::from_f64(0.02);
    /// Restitution term of the 1-D collision formula
    pub const ELASTICITY: Fixed = Fixed::from_f64(30.0);
    /// Every ball weighs the same
    pub const BALL_MASS: Fixed = Fixed::from_f64(0.5);

    /// Manhattan distance under which two tier-0 balls interact
    pub const BASE_INTERACTION_DISTANCE: Fixed = Fixed::from_int(20);

    /// Launch point and speed (pixels per frame)
    pub const LAUNCH_ORIGIN: FixedVec2 = FixedVec2::new(Fixed::from_int(-100), Fixed::ZERO);
    pub const LAUNCH_SPEED: i32 = 3;

    /// Launch angle control, in whole degrees
    pub const INITIAL_LAUNCH_ANGLE: i32 = 90;
    pub const LAUNCH_ANGLE_MIN: i32 = 20;
    pub const LAUNCH_ANGLE_MAX: i32 = 170;
    pub const LAUNCH_ANGLE_STEP: i32 = 2;

    /// Highest tier a ball can reach (ten visual variants)
    pub const MAX_TIER: u8 = 9;
    /// Highest tier the on-deck roll can produce at the start of a run
    pub const INITIAL_MAX_TIER: u8 = 1;
    pub const INITIAL_SCORE: u32 = 10;

    /// Visual scale added per tier
    pub const TIER_SCALE_STEP: Fixed = Fixed::from_f64(0.1);

    /// Cue volumes
    pub const SHOOT_CUE_VOLUME: Fixed = Fixed::from_f64(0.5);
    pub const MERGE_CUE_VOLUME: Fixed = Fixed::from_f64(0.5);
    /// Impact cues quieter than this are silenced
    pub const CUE_SILENCE_THRESHOLD: Fixed = Fixed::from_f64(0.001);

    /// HUD layout (screen space, origin at center)
    pub const SCORE_ORIGIN: (f32, f32) = (-70.0, 60.0);
    pub const REMAINING_ORIGIN: (f32, f32) = (-70.0, -60.0);
    pub const BALL_ICON_ORIGIN: (f32, f32) = (-100.0, -60.0);
    pub const SCORE_DIGITS: usize = 8;
    pub const REMAINING_DIGITS: usize = 3;
    /// Numbers sheet frame holding the ball icon
    pub const BALL_ICON_FRAME: u16 = 10;

    /// Aim arrow orbit radius around the launch origin
    pub const ARROW_RADIUS: i32 = 20;

    /// Background scroll wraps at this many pixels
    pub const BACKGROUND_WRAP: i32 = 256;
    /// Screen blend pulse step per frame
    pub const BLEND_STEP: Fixed = Fixed::from_f64(0.02);
}

/// Visual scale for a tier: `1.0 + 0.1 * tier`
#[inline]
pub fn tier_scale(tier: u8) -> Fixed {
    Fixed::ONE + TIER_SCALE_STEP * i32::from(tier)
}

/// Launch velocity for an aim angle in whole degrees
///
/// The ball leaves perpendicular to the aim angle, matching the arrow sprite.
pub fn launch_velocity(angle: i32) -> FixedVec2 {
    let heading = (90 + angle).rem_euclid(360);
    FixedVec2::new(
        degrees_cos(heading) * LAUNCH_SPEED,
        degrees_sin(heading) * LAUNCH_SPEED,
    )
}
