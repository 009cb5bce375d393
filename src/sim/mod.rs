//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed-point arithmetic only
//! - Seeded RNG only
//! - Stable iteration order (launch order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Contact, elastic_exchange, interaction, merge_score, resolve};
pub use state::{ArenaState, Ball, BallVec, CueToken, GameEvent, GameState, Snapshot};
pub use tick::{TickInput, tick};
