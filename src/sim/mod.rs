//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per display refresh
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{ball_rect_overlap, paddle_deflection, rect_overlap};
pub use state::{Ball, Block, GameState, HeartItem, Paddle, RoundOutcome};
pub use tick::tick;
