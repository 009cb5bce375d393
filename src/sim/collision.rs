//! Ball-ball collision detection, bounce response and tier merging
//!
//! Proximity is Manhattan distance, not Euclidean, and every unordered pair
//! is looked at from both sides each frame. Both are part of how the game
//! plays (merge pacing depends on them), so neither is "fixed" here.

use super::state::{Ball, CueToken, GameEvent, GameState};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::fixed::{Fixed, FixedVec2, atan2_deg, cos_deg, sin_deg};

/// What resolving an interacting pair did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Same tier: `b` grew, `a` must be removed by the caller
    Merged,
    /// Same tier, but `b` is already at `MAX_TIER`; nothing grew or went away
    Capped,
    /// Different tiers: separated and exchanged momentum
    Bounced,
    /// Different tiers, in range but not overlapping
    Clear,
}

/// `|dx| + |dy|`
#[inline]
pub fn manhattan_distance(a: &Ball, b: &Ball) -> Fixed {
    (a.pos.x - b.pos.x).abs() + (a.pos.y - b.pos.y).abs()
}

/// Separation input for a pair in interaction range, `None` otherwise.
///
/// Bigger tiers reach further: the pair interacts while
/// `distance < 20 + tier(a) + tier(b)`.
pub fn interaction(a: &Ball, b: &Ball) -> Option<Fixed> {
    let distance = manhattan_distance(a, b);
    let needed = Fixed::from_int(i32::from(a.tier) + i32::from(b.tier));
    (distance < BASE_INTERACTION_DISTANCE + needed).then(|| distance - needed / 2)
}

/// Score awarded for consuming a ball of `tier`. Bitwise XOR, not a power.
#[inline]
pub fn merge_score(tier: u8) -> u32 {
    (u32::from(tier) + 1) ^ 2
}

/// Resolve an interacting pair. Only `b` can survive a merge.
pub fn resolve(
    a: &mut Ball,
    b: &mut Ball,
    separation_input: Fixed,
    cue: &mut CueToken,
    events: &mut Vec<GameEvent>,
) -> Contact {
    if a.tier == b.tier {
        merge(a, b, events)
    } else {
        bounce(a, b, separation_input, cue, events)
    }
}

fn merge(a: &Ball, b: &mut Ball, events: &mut Vec<GameEvent>) -> Contact {
    b.vel += a.vel;
    events.push(GameEvent::Cue {
        effect: SoundEffect::Blip,
        volume: MERGE_CUE_VOLUME,
    });

    if b.tier >= MAX_TIER {
        return Contact::Capped;
    }
    b.tier += 1;
    Contact::Merged
}

fn bounce(
    a: &mut Ball,
    b: &mut Ball,
    separation_input: Fixed,
    cue: &mut CueToken,
    events: &mut Vec<GameEvent>,
) -> Contact {
    let separation = BASE_INTERACTION_DISTANCE - separation_input;
    if separation <= Fixed::ZERO {
        return Contact::Clear;
    }

    let delta = b.pos - a.pos;
    let angle = atan2_deg(delta.y.integer(), delta.x.integer());
    let (cos, sin) = (cos_deg(angle), sin_deg(angle));

    // Push apart along the collision normal, half the overlap each
    let displacement = separation / 2;
    let push = FixedVec2::new(displacement * cos, displacement * sin);
    a.pos -= push;
    b.pos += push;

    // Project onto the normal, exchange, recompose
    let u1 = a.vel.x * cos + a.vel.y * sin;
    let u2 = b.vel.x * cos + b.vel.y * sin;
    let (v1, v2) = elastic_exchange(u1, u2);
    a.vel = FixedVec2::new(v1 * cos, v1 * sin);
    b.vel = FixedVec2::new(v2 * cos, v2 * sin);

    log::debug!(
        "Bounce {} (tier {}) / {} (tier {}) at {} degrees",
        a.id,
        a.tier,
        b.id,
        b.tier,
        angle
    );

    if cue.take() {
        events.push(GameEvent::Cue {
            effect: SoundEffect::PoolBall,
            volume: impact_volume(a.vel, b.vel),
        });
    }
    Contact::Bounced
}

/// 1-D collision along the normal for two `BALL_MASS` balls
///
/// With equal masses the restitution term cancels and the balls swap
/// normal velocities, so `u1 + u2 == v1 + v2` exactly.
pub fn elastic_exchange(u1: Fixed, u2: Fixed) -> (Fixed, Fixed) {
    let (m1, m2) = (BALL_MASS, BALL_MASS);
    let restitution = Fixed::ONE + ELASTICITY;
    let two = Fixed::from_int(2);
    let total = m1 + m2;

    let v1 = (restitution * u1 * (m1 - m2) + two * m2 * u2) / total;
    let v2 = (restitution * u2 * (m2 - m1) + two * m1 * u1) / total;
    (v1, v2)
}

/// Impact loudness from the largest post-collision velocity component
pub fn impact_volume(a: FixedVec2, b: FixedVec2) -> Fixed {
    let peak = [a.y, b.x, b.y].into_iter().fold(a.x, Fixed::max);
    let volume = (peak / 2).min(Fixed::ONE);
    if volume < CUE_SILENCE_THRESHOLD {
        Fixed::ZERO
    } else {
        volume
    }
}

/// Check ball `index` against every other live ball.
///
/// On a merge the ball at `index` is consumed: it is removed, the score and
/// max tier are updated, and the scan stops. Returns whether that happened,
/// so the caller knows `index` now names the next ball.
pub fn resolve_collisions_for(state: &mut GameState, index: usize, cue: &mut CueToken) -> bool {
    let mut other = 0;
    while other < state.balls.len() {
        if other != index {
            let (a, b) = state.balls.pair_mut(index, other);
            if let Some(separation_input) = interaction(a, b) {
                let contact = resolve(a, b, separation_input, cue, &mut state.events);
                if contact == Contact::Merged {
                    consume(state, index, other);
                    return true;
                }
            }
        }
        other += 1;
    }
    false
}

/// Remove the consumed ball and book the merge
fn consume(state: &mut GameState, index: usize, survivor: usize) {
    let consumed = state.balls[index];
    let survivor = state.balls[survivor];

    state.arena.score += merge_score(consumed.tier);
    if consumed.tier > state.arena.max_tier {
        state.arena.max_tier = consumed.tier;
    }
    state.balls.remove(index);

    log::info!(
        "Merged ball {} into {} (now tier {}), score {}",
        consumed.id,
        survivor.id,
        survivor.tier,
        state.arena.score
    );

    state.events.push(GameEvent::Merged {
        consumed: consumed.id,
        survivor: survivor.id,
        tier: survivor.tier,
    });
    state.events.push(GameEvent::ScoreChanged {
        score: state.arena.score,
    });
    state.events.push(GameEvent::RemainingChanged {
        remaining: state.balls.remaining(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(id: u32, x: i32, y: i32, tier: u8) -> Ball {
        Ball::new(
            id,
            FixedVec2::new(Fixed::from_int(x), Fixed::from_int(y)),
            FixedVec2::ZERO,
            tier,
        )
    }

    fn state_with(balls: &[Ball]) -> GameState {
        let mut state = GameState::new(1);
        for b in balls {
            state.balls.try_push(*b).unwrap();
        }
        state
    }

    #[test]
    fn test_manhattan_interaction_range() {
        // 12 + 7 = 19 < 20: in range even though Euclidean would say ~13.9
        let a = ball(0, 0, 0, 0);
        assert_eq!(interaction(&a, &ball(1, 12, 7, 0)), Some(Fixed::from_int(19)));
        assert_eq!(interaction(&a, &ball(1, 12, 8, 0)), None);

        // Tiers widen the range and shift the separation input by half
        let b = ball(1, 12, 9, 3);
        assert_eq!(interaction(&a, &b), Some(Fixed::from_int(21) - Fixed::from_f64(1.5)));
    }

    #[test]
    fn test_merge_score_is_xor() {
        assert_eq!(merge_score(0), 3);
        assert_eq!(merge_score(1), 0);
        assert_eq!(merge_score(2), 1);
        assert_eq!(merge_score(5), 4);
    }

    #[test]
    fn test_same_tier_merge_end_to_end() {
        let mut state = state_with(&[ball(0, 0, 0, 0), ball(1, 10, 0, 0)]);
        let mut cue = CueToken::new();

        assert!(resolve_collisions_for(&mut state, 0, &mut cue));

        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.balls[0].id, 1);
        assert_eq!(state.balls[0].tier, 1);
        assert_eq!(state.arena.score, INITIAL_SCORE + 3);
        assert!(state.events().contains(&GameEvent::Merged {
            consumed: 0,
            survivor: 1,
            tier: 1
        }));
        assert!(state.events().contains(&GameEvent::ScoreChanged { score: 13 }));
        assert!(state.events().contains(&GameEvent::RemainingChanged {
            remaining: BALL_CAPACITY - 1
        }));
    }

    #[test]
    fn test_merge_transfers_velocity_to_survivor() {
        let mut a = ball(0, 0, 0, 2);
        let mut b = ball(1, 5, 0, 2);
        a.vel = FixedVec2::new(Fixed::ONE, Fixed::HALF);
        b.vel = FixedVec2::new(Fixed::ONE, Fixed::ZERO);
        let mut events = Vec::new();

        let contact = resolve(&mut a, &mut b, Fixed::ZERO, &mut CueToken::new(), &mut events);

        assert_eq!(contact, Contact::Merged);
        assert_eq!(b.vel, FixedVec2::new(Fixed::from_int(2), Fixed::HALF));
        assert_eq!(b.tier, 3);
        assert_eq!(b.scale(), crate::tier_scale(3));
        assert_eq!(
            events,
            vec![GameEvent::Cue {
                effect: SoundEffect::Blip,
                volume: MERGE_CUE_VOLUME
            }]
        );
    }

    #[test]
    fn test_merge_at_max_tier_is_noop() {
        let mut state = state_with(&[ball(0, 0, 0, MAX_TIER), ball(1, 4, 0, MAX_TIER)]);
        let mut cue = CueToken::new();

        assert!(!resolve_collisions_for(&mut state, 0, &mut cue));
        assert!(!resolve_collisions_for(&mut state, 1, &mut cue));

        assert_eq!(state.balls.len(), 2);
        assert!(state.balls.iter().all(|b| b.tier == MAX_TIER));
        assert_eq!(state.arena.score, INITIAL_SCORE);
    }

    #[test]
    fn test_max_tier_tracks_consumed_tier() {
        let mut state = state_with(&[ball(0, 0, 0, 4), ball(1, 3, 3, 4)]);
        resolve_collisions_for(&mut state, 0, &mut CueToken::new());

        assert_eq!(state.arena.max_tier, 4);
        assert_eq!(state.arena.score, INITIAL_SCORE + merge_score(4));
    }

    #[test]
    fn test_head_on_bounce() {
        let mut a = ball(0, 0, 0, 0);
        let mut b = ball(1, 10, 0, 1);
        a.vel.x = Fixed::ONE;
        b.vel.x = -Fixed::ONE;
        let mut events = Vec::new();
        let mut cue = CueToken::new();

        let input = interaction(&a, &b).unwrap();
        let contact = resolve(&mut a, &mut b, input, &mut cue, &mut events);

        assert_eq!(contact, Contact::Bounced);
        // separation = 20 - (10 - 0.5) = 10.5, half to each side
        assert_eq!(a.pos.x, -Fixed::from_f64(5.25));
        assert_eq!(b.pos.x, Fixed::from_f64(15.25));
        assert_eq!(a.vel.x, -Fixed::ONE);
        assert_eq!(b.vel.x, Fixed::ONE);
        assert_eq!(
            events,
            vec![GameEvent::Cue {
                effect: SoundEffect::PoolBall,
                volume: Fixed::HALF
            }]
        );
    }

    #[test]
    fn test_bounce_conserves_normal_momentum() {
        let mut a = ball(0, 0, 0, 0);
        let mut b = ball(1, 7, 7, 2);
        a.vel = FixedVec2::new(Fixed::from_f64(1.5), Fixed::from_f64(0.25));
        b.vel = FixedVec2::new(Fixed::from_f64(-0.5), Fixed::from_f64(-1.0));

        let angle = atan2_deg(7, 7);
        let (cos, sin) = (cos_deg(angle), sin_deg(angle));
        let normal = |v: FixedVec2| v.x * cos + v.y * sin;
        let before = normal(a.vel) + normal(b.vel);

        let input = interaction(&a, &b).unwrap();
        let contact = resolve(&mut a, &mut b, input, &mut CueToken::new(), &mut Vec::new());
        assert_eq!(contact, Contact::Bounced);

        let after = normal(a.vel) + normal(b.vel);
        assert!(
            (after - before).abs() < Fixed::from_f64(0.01),
            "before {before}, after {after}"
        );
    }

    #[test]
    fn test_elastic_exchange_swaps_equal_masses() {
        let u1 = Fixed::from_f64(2.5);
        let u2 = Fixed::from_f64(-0.75);
        assert_eq!(elastic_exchange(u1, u2), (u2, u1));
    }

    #[test]
    fn test_in_range_but_not_overlapping_is_clear() {
        // distance 21 < 20 + 2 but separation 20 - (21 - 1) = 0
        let mut a = ball(0, 0, 0, 0);
        let mut b = ball(1, 21, 0, 2);
        let input = interaction(&a, &b).unwrap();
        let contact = resolve(&mut a, &mut b, input, &mut CueToken::new(), &mut Vec::new());
        assert_eq!(contact, Contact::Clear);
        assert_eq!(b.pos.x, Fixed::from_int(21));
    }

    #[test]
    fn test_coincident_balls_separate_along_x() {
        let mut a = ball(0, 5, 5, 0);
        let mut b = ball(1, 5, 5, 1);
        let input = interaction(&a, &b).unwrap();
        resolve(&mut a, &mut b, input, &mut CueToken::new(), &mut Vec::new());

        // atan2(0, 0) == 0: pushed apart horizontally
        assert!(a.pos.x < b.pos.x);
        assert_eq!(a.pos.y, b.pos.y);
    }

    #[test]
    fn test_impact_cue_once_per_token() {
        let mut state = state_with(&[ball(0, 0, 0, 0), ball(1, 8, 0, 1), ball(2, 0, 8, 2)]);
        let mut cue = CueToken::new();
        for i in 0..3 {
            resolve_collisions_for(&mut state, i, &mut cue);
        }
        let cues = state
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Cue { effect: SoundEffect::PoolBall, .. }))
            .count();
        assert_eq!(cues, 1);
    }

    #[test]
    fn test_impact_volume_clamps_and_silences() {
        let fast = FixedVec2::new(Fixed::from_int(5), Fixed::ZERO);
        assert_eq!(impact_volume(fast, FixedVec2::ZERO), Fixed::ONE);

        let slow = FixedVec2::new(Fixed::from_raw(4), Fixed::ZERO);
        assert_eq!(impact_volume(slow, FixedVec2::ZERO), Fixed::ZERO);

        let receding = FixedVec2::new(-Fixed::ONE, -Fixed::ONE);
        assert_eq!(impact_volume(receding, receding), Fixed::ZERO);
    }
}
