//! Per-frame simulation tick
//!
//! Aim, launch, then one interleaved pass over the live balls: each ball is
//! integrated and immediately checked against every other ball.

use super::collision::resolve_collisions_for;
use super::state::{ArenaState, CueToken, GameEvent, GameState};
use crate::audio::SoundEffect;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Raise the launch angle (level)
    pub aim_up: bool,
    /// Lower the launch angle (level)
    pub aim_down: bool,
    /// Fire the on-deck ball (edge)
    pub launch: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;

    // One impact cue per frame
    let mut cue = CueToken::new();

    aim(&mut state.arena, input);

    if input.launch {
        state.events.push(GameEvent::Cue {
            effect: SoundEffect::Shoot,
            volume: SHOOT_CUE_VOLUME,
        });
        state.launch();
    }

    step_balls(state, &mut cue);
}

/// Nudge the launch angle, up taking priority over down
pub fn aim(arena: &mut ArenaState, input: &TickInput) {
    if input.aim_up && arena.launch_angle < LAUNCH_ANGLE_MAX {
        arena.launch_angle = (arena.launch_angle + LAUNCH_ANGLE_STEP) % 360;
    } else if input.aim_down && arena.launch_angle > LAUNCH_ANGLE_MIN {
        arena.launch_angle = (arena.launch_angle - LAUNCH_ANGLE_STEP) % 360;
    }
}

/// Integrate and collide every live ball.
///
/// When the ball at `i` is consumed by a merge the next ball slides into
/// `i`, so the index only advances past balls that survive their scan.
pub fn step_balls(state: &mut GameState, cue: &mut CueToken) {
    let mut i = 0;
    while i < state.balls.len() {
        state.balls[i].update();
        if !resolve_collisions_for(state, i, cue) {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{Fixed, FixedVec2};
    use crate::sim::state::Ball;

    fn resting(id: u32, x: i32, y: i32, tier: u8) -> Ball {
        Ball::new(
            id,
            FixedVec2::new(Fixed::from_int(x), Fixed::from_int(y)),
            FixedVec2::ZERO,
            tier,
        )
    }

    #[test]
    fn test_aim_is_bounded() {
        let mut state = GameState::new(1);
        let up = TickInput {
            aim_up: true,
            ..Default::default()
        };
        for _ in 0..100 {
            tick(&mut state, &up);
        }
        assert_eq!(state.arena.launch_angle, LAUNCH_ANGLE_MAX);

        let down = TickInput {
            aim_down: true,
            ..Default::default()
        };
        for _ in 0..100 {
            tick(&mut state, &down);
        }
        assert_eq!(state.arena.launch_angle, LAUNCH_ANGLE_MIN);
    }

    #[test]
    fn test_up_wins_over_down() {
        let mut arena = ArenaState::default();
        aim(
            &mut arena,
            &TickInput {
                aim_up: true,
                aim_down: true,
                launch: false,
            },
        );
        assert_eq!(arena.launch_angle, INITIAL_LAUNCH_ANGLE + LAUNCH_ANGLE_STEP);
    }

    #[test]
    fn test_launch_plays_shoot_cue_even_when_full() {
        let mut state = GameState::new(1);
        let fire = TickInput {
            launch: true,
            ..Default::default()
        };
        for _ in 0..BALL_CAPACITY {
            state.launch();
        }
        state.drain_events();

        tick(&mut state, &fire);

        assert_eq!(
            state.events().first(),
            Some(&GameEvent::Cue {
                effect: SoundEffect::Shoot,
                volume: SHOOT_CUE_VOLUME
            })
        );
        assert!(!state
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::Launched { .. })));
    }

    #[test]
    fn test_tick_launches_one_ball() {
        let mut state = GameState::new(5);
        tick(
            &mut state,
            &TickInput {
                launch: true,
                ..Default::default()
            },
        );
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.time_ticks, 1);
        // Already integrated once this frame
        assert_ne!(state.balls[0].pos, LAUNCH_ORIGIN);
    }

    #[test]
    fn test_consumed_ball_does_not_skip_next() {
        // 0 and 1 merge; 2 sits far away and must still be integrated
        let mut state = GameState::new(1);
        state.balls.try_push(resting(0, 0, 0, 0)).unwrap();
        state.balls.try_push(resting(1, 6, 0, 0)).unwrap();
        let mut far = resting(2, -50, 40, 3);
        far.vel.x = Fixed::ONE;
        state.balls.try_push(far).unwrap();

        tick(&mut state, &TickInput::default());

        assert_eq!(state.balls.len(), 2);
        assert_eq!(state.balls[0].id, 1);
        assert_eq!(state.balls[0].tier, 1);
        assert_eq!(state.balls[1].id, 2);
        assert_eq!(state.balls[1].pos.x, Fixed::from_int(-50) + Fixed::ONE - FRICTION);
        assert_eq!(state.arena.score, INITIAL_SCORE + 3);
    }

    #[test]
    fn test_chain_of_merges_in_one_frame() {
        // Three tier-0 balls: 0 merges into 1 (tier 1), then nothing else matches
        let mut state = GameState::new(1);
        for (id, x) in [(0, 0), (1, 5), (2, 10)] {
            state.balls.try_push(resting(id, x, 0, 0)).unwrap();
        }

        tick(&mut state, &TickInput::default());

        assert_eq!(state.balls.len(), 2);
        let tiers: Vec<u8> = state.balls.iter().map(|b| b.tier).collect();
        assert_eq!(tiers, vec![1, 0]);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let inputs = [
            TickInput {
                launch: true,
                ..Default::default()
            },
            TickInput {
                aim_up: true,
                ..Default::default()
            },
            TickInput {
                launch: true,
                aim_down: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..40 {
            for input in &inputs {
                tick(&mut state1, input);
                tick(&mut state2, input);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.balls, state2.balls);
        assert_eq!(state1.arena, state2.arena);
        assert_eq!(state1.drain_events(), state2.drain_events());
    }
}
