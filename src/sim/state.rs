//! Game state and core simulation types
//!
//! Everything the frame loop mutates lives here. Nothing in this module
//! touches sprites, audio or input; side effects leave as `GameEvent`s.

use std::ops::{Index, IndexMut};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::audio::SoundEffect;
use crate::consts::*;
use crate::fixed::{Fixed, FixedVec2};
use crate::{launch_velocity, tier_scale};

/// A ball entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    /// Assigned at launch, never reused; only the shell cares about it
    pub id: u32,
    pub pos: FixedVec2,
    pub vel: FixedVec2,
    /// Growth level. Only ever raised, by merging.
    pub tier: u8,
}

impl Ball {
    pub fn new(id: u32, pos: FixedVec2, vel: FixedVec2, tier: u8) -> Self {
        Self { id, pos, vel, tier }
    }

    /// Visual scale for this ball's tier
    pub fn scale(&self) -> Fixed {
        tier_scale(self.tier)
    }

    /// Advance one frame: wall reflection, friction, then integration
    pub fn update(&mut self) {
        self.vel.x = reflect_axis(self.pos.x, self.vel.x, ARENA_HALF_WIDTH);
        self.vel.y = reflect_axis(self.pos.y, self.vel.y, ARENA_HALF_HEIGHT);

        self.vel.x = apply_friction(self.vel.x);
        self.vel.y = apply_friction(self.vel.y);

        self.pos += self.vel;
    }
}

/// Flip velocity on an axis once the ball is past the bound and still heading out
#[inline]
fn reflect_axis(pos: Fixed, vel: Fixed, bound: Fixed) -> Fixed {
    if (pos > bound && vel > Fixed::ZERO) || (pos < -bound && vel < Fixed::ZERO) {
        -vel
    } else {
        vel
    }
}

/// Shave `FRICTION` off a velocity component, snapping to rest below it
#[inline]
pub fn apply_friction(vel: Fixed) -> Fixed {
    if vel.abs() > FRICTION {
        vel - FRICTION * vel.signum()
    } else {
        Fixed::ZERO
    }
}

/// Live balls in launch order, capped at a fixed capacity
///
/// Storage is reserved once up front and never grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BallVec {
    balls: Vec<Ball>,
    #[serde(skip)]
    capacity: usize,
}

impl BallVec {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            balls: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.balls.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.balls.len() >= self.capacity
    }

    /// Free slots left
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.balls.len()
    }

    /// Append a ball, handing it back if the collection is full
    pub fn try_push(&mut self, ball: Ball) -> Result<(), Ball> {
        if self.is_full() {
            return Err(ball);
        }
        self.balls.push(ball);
        Ok(())
    }

    /// Remove the ball at `index`, keeping launch order for the rest
    pub fn remove(&mut self, index: usize) -> Ball {
        self.balls.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&Ball> {
        self.balls.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ball> {
        self.balls.iter()
    }

    pub fn as_slice(&self) -> &[Ball] {
        &self.balls
    }

    pub fn find(&self, id: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    /// Mutable access to two distinct balls at once
    ///
    /// Panics if `i == j` or either index is out of bounds.
    pub fn pair_mut(&mut self, i: usize, j: usize) -> (&mut Ball, &mut Ball) {
        assert_ne!(i, j, "pair_mut needs two distinct balls");
        if i < j {
            let (low, high) = self.balls.split_at_mut(j);
            (&mut low[i], &mut high[0])
        } else {
            let (low, high) = self.balls.split_at_mut(i);
            (&mut high[0], &mut low[j])
        }
    }
}

impl Index<usize> for BallVec {
    type Output = Ball;
    fn index(&self, index: usize) -> &Ball {
        &self.balls[index]
    }
}

impl IndexMut<usize> for BallVec {
    fn index_mut(&mut self, index: usize) -> &mut Ball {
        &mut self.balls[index]
    }
}

impl<'a> IntoIterator for &'a BallVec {
    type Item = &'a Ball;
    type IntoIter = std::slice::Iter<'a, Ball>;
    fn into_iter(self) -> Self::IntoIter {
        self.balls.iter()
    }
}

/// Arena-wide progress read by the spawn logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaState {
    /// Aim in whole degrees, kept within the launch angle range
    pub launch_angle: i32,
    /// Highest tier the on-deck roll may produce
    pub max_tier: u8,
    pub score: u32,
    /// Tier of the next ball to launch
    pub next_tier: u8,
}

impl Default for ArenaState {
    fn default() -> Self {
        Self {
            launch_angle: INITIAL_LAUNCH_ANGLE,
            max_tier: INITIAL_MAX_TIER,
            score: INITIAL_SCORE,
            next_tier: 0,
        }
    }
}

/// One-shot permission to play the impact cue
///
/// Minted fresh at the top of every frame; the first bounce that takes it
/// gets to play, everything after that frame stays silent.
#[derive(Debug)]
pub struct CueToken {
    spent: bool,
}

impl CueToken {
    pub fn new() -> Self {
        Self { spent: false }
    }

    /// True exactly once per token
    pub fn take(&mut self) -> bool {
        !std::mem::replace(&mut self.spent, true)
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }
}

impl Default for CueToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Side effects the simulation asks the shell to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A ball entered the arena at the launch origin
    Launched { id: u32, tier: u8 },
    /// The on-deck preview changed
    NextTierRolled { tier: u8 },
    /// `consumed` was absorbed into `survivor`, which is now `tier`
    Merged { consumed: u32, survivor: u32, tier: u8 },
    ScoreChanged { score: u32 },
    /// Free capacity for the ammo counter
    RemainingChanged { remaining: usize },
    /// Play a sound at `volume` in `[0, 1]`
    Cue { effect: SoundEffect, volume: Fixed },
}

/// Serializable view of the simulation for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub seed: u64,
    pub time_ticks: u64,
    pub arena: ArenaState,
    pub balls: Vec<Ball>,
}

/// Complete simulation state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub arena: ArenaState,
    /// Live balls, launch order
    pub balls: BallVec,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Pending side effects, drained by the shell once per frame
    pub(crate) events: Vec<GameEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            arena: ArenaState::default(),
            balls: BallVec::with_capacity(BALL_CAPACITY),
            time_ticks: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 0,
        }
    }

    /// Queued events, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take every queued event
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Uniform tier in `[0, max_tier]`
    pub fn roll_tier(&mut self) -> u8 {
        self.rng.random_range(0..=self.arena.max_tier)
    }

    /// Launch the on-deck ball from the launch origin.
    ///
    /// Returns the new ball's id, or `None` when the arena is already full
    /// (the request is simply dropped).
    pub fn launch(&mut self) -> Option<u32> {
        let id = self.next_id;
        let tier = self.arena.next_tier;
        let ball = Ball::new(
            id,
            LAUNCH_ORIGIN,
            launch_velocity(self.arena.launch_angle),
            tier,
        );

        if let Err(rejected) = self.balls.try_push(ball) {
            log::debug!("Arena full, dropped launch of tier {} ball", rejected.tier);
            return None;
        }
        self.next_id += 1;
        log::info!(
            "Launched ball {} (tier {}) at {} degrees",
            id,
            tier,
            self.arena.launch_angle
        );
        self.events.push(GameEvent::Launched { id, tier });

        let next = self.roll_tier();
        self.arena.next_tier = next;
        log::debug!("Next tier {} (max {})", next, self.arena.max_tier);
        self.events.push(GameEvent::NextTierRolled { tier: next });
        self.events.push(GameEvent::RemainingChanged {
            remaining: self.balls.remaining(),
        });

        Some(id)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            seed: self.seed,
            time_ticks: self.time_ticks,
            arena: self.arena,
            balls: self.balls.as_slice().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_at(x: f64, y: f64, vx: f64, vy: f64) -> Ball {
        Ball::new(
            0,
            FixedVec2::new(Fixed::from_f64(x), Fixed::from_f64(y)),
            FixedVec2::new(Fixed::from_f64(vx), Fixed::from_f64(vy)),
            0,
        )
    }

    #[test]
    fn test_wall_reflection_then_friction() {
        let mut ball = ball_at(101.0, 0.0, 1.0, 0.0);
        ball.update();

        // -1 + 0.02, then integrated once
        assert_eq!(ball.vel.x, Fixed::from_int(-1) + FRICTION);
        assert_eq!(ball.pos.x, Fixed::from_int(101) + ball.vel.x);
        assert!((ball.vel.x.to_f32() + 0.98).abs() < 0.001);
        assert!((ball.pos.x.to_f32() - 100.02).abs() < 0.001);
    }

    #[test]
    fn test_reflection_needs_outward_velocity() {
        // Past the bound but already heading back in: untouched by the wall
        let mut ball = ball_at(0.0, 61.0, 0.0, -1.0);
        ball.update();
        assert_eq!(ball.vel.y, Fixed::from_int(-1) + FRICTION);

        let mut ball = ball_at(-101.0, 0.0, -1.0, 0.0);
        ball.update();
        assert!(ball.vel.x > Fixed::ZERO);
    }

    #[test]
    fn test_reflected_ball_does_not_cross_back_out() {
        let mut ball = ball_at(101.0, 0.0, 1.0, 0.0);
        for _ in 0..200 {
            ball.update();
            assert!(ball.vel.x <= Fixed::ZERO);
            assert!(ball.pos.x <= Fixed::from_int(101));
        }
        assert_eq!(ball.vel, FixedVec2::ZERO);
    }

    #[test]
    fn test_friction_snaps_to_zero() {
        assert_eq!(apply_friction(FRICTION), Fixed::ZERO);
        assert_eq!(apply_friction(-FRICTION), Fixed::ZERO);
        assert_eq!(apply_friction(Fixed::from_raw(100)), Fixed::from_raw(100 - 81));
        assert_eq!(apply_friction(Fixed::from_raw(-100)), Fixed::from_raw(-100 + 81));
    }

    #[test]
    fn test_ball_vec_capacity() {
        let mut balls = BallVec::with_capacity(2);
        let ball = ball_at(0.0, 0.0, 0.0, 0.0);
        assert!(balls.try_push(ball).is_ok());
        assert!(balls.try_push(ball).is_ok());
        assert!(balls.is_full());
        assert_eq!(balls.try_push(ball), Err(ball));
        assert_eq!(balls.len(), 2);
        assert_eq!(balls.remaining(), 0);
    }

    #[test]
    fn test_pair_mut_either_order() {
        let mut balls = BallVec::with_capacity(3);
        for id in 0..3 {
            let mut ball = ball_at(0.0, 0.0, 0.0, 0.0);
            ball.id = id;
            balls.try_push(ball).unwrap();
        }
        let (a, b) = balls.pair_mut(2, 0);
        assert_eq!((a.id, b.id), (2, 0));
        let (a, b) = balls.pair_mut(0, 1);
        assert_eq!((a.id, b.id), (0, 1));
    }

    #[test]
    fn test_cue_token_single_shot() {
        let mut token = CueToken::new();
        assert!(token.take());
        assert!(!token.take());
        assert!(token.is_spent());
    }

    #[test]
    fn test_launch_until_full() {
        let mut state = GameState::new(7);
        for expected in 0..BALL_CAPACITY as u32 {
            assert_eq!(state.launch(), Some(expected));
        }
        state.drain_events();

        assert_eq!(state.launch(), None);
        assert_eq!(state.balls.len(), BALL_CAPACITY);
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_launch_events_and_roll_range() {
        let mut state = GameState::new(42);
        state.launch();

        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::Launched { id: 0, tier: 0 });
        assert!(matches!(events[1], GameEvent::NextTierRolled { tier } if tier <= INITIAL_MAX_TIER));
        assert_eq!(
            events[2],
            GameEvent::RemainingChanged {
                remaining: BALL_CAPACITY - 1
            }
        );

        let ball = state.balls[0];
        assert_eq!(ball.pos, LAUNCH_ORIGIN);
        assert_eq!(ball.vel, launch_velocity(INITIAL_LAUNCH_ANGLE));
    }

    #[test]
    fn test_rolls_stay_within_max_tier() {
        let mut state = GameState::new(3);
        state.arena.max_tier = 4;
        let mut seen = [false; 5];
        for _ in 0..500 {
            let tier = state.roll_tier();
            assert!(tier <= 4);
            seen[tier as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
