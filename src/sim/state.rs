//! Round state and core simulation types
//!
//! Everything the renderer snapshots and the tick mutates lives here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;

/// How a finished round ended. Emitted by `tick`, applied by the session
/// layer (the simulation never mutates session status itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Lives reached zero
    GameOver,
    /// All blocks cleared
    Victory,
}

/// The player's paddle, clamped to the field each tick
#[derive(Debug, Clone, Copy)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    pub fn center(&self) -> f32 {
        self.x + self.width * 0.5
    }
}

/// The ball. `active == false` means resting on the paddle, not yet launched.
#[derive(Debug, Clone, Copy)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub active: bool,
}

/// One block in the round grid. `active` flips to false permanently on hit.
#[derive(Debug, Clone, Copy)]
pub struct Block {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub active: bool,
    /// Index into the row palette
    pub color: u8,
}

/// A falling extra-life pickup, spawned probabilistically on block destruction
#[derive(Debug, Clone, Copy)]
pub struct HeartItem {
    pub id: u32,
    pub pos: Vec2,
    pub active: bool,
}

/// Complete per-round game state plus the session-long speed tier
#[derive(Debug, Clone)]
pub struct GameState {
    /// Field dimensions
    pub width: f32,
    pub height: f32,
    /// Top of the paddle band
    pub paddle_y: f32,

    pub paddle: Paddle,
    pub ball: Ball,
    pub blocks: Vec<Block>,
    pub hearts: Vec<HeartItem>,

    pub lives: u32,
    pub score: u64,
    /// Speed tier 0-2, cycled by explicit toggle
    pub speed_tier: usize,

    /// Paddle hit flash, 1.0 on hit decaying to 0 (cosmetic)
    pub hit_flash: f32,
    /// Ticks until an automatic relaunch after a life loss (0 = none pending)
    pub relaunch_ticks: u32,

    next_heart_id: u32,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a state for the given field size. Builds the block grid and
    /// rests the ball on the paddle; call `launch_ball` to start play.
    pub fn new(width: f32, height: f32, seed: u64) -> Self {
        let paddle_y = height * PADDLE_Y_RATIO;
        let paddle_width = width * PADDLE_WIDTH_RATIO;
        let mut state = Self {
            width,
            height,
            paddle_y,
            paddle: Paddle {
                x: (width - paddle_width) * 0.5,
                width: paddle_width,
                height: PADDLE_HEIGHT,
            },
            ball: Ball {
                pos: Vec2::new(width * 0.5, paddle_y - 30.0),
                vel: Vec2::ZERO,
                radius: BALL_RADIUS,
                active: false,
            },
            blocks: Vec::new(),
            hearts: Vec::new(),
            lives: INITIAL_LIVES,
            score: 0,
            speed_tier: 0,
            hit_flash: 0.0,
            relaunch_ticks: 0,
            next_heart_id: 0,
            rng: Pcg32::seed_from_u64(seed),
        };
        state.init_blocks();
        state
    }

    pub fn speed_multiplier(&self) -> f32 {
        SPEED_MULTIPLIERS[self.speed_tier]
    }

    /// Cycle the speed tier. Applies to the next launch/rebound, never
    /// retroactively to the current velocity.
    pub fn cycle_speed_tier(&mut self) {
        self.speed_tier = (self.speed_tier + 1) % SPEED_MULTIPLIERS.len();
    }

    /// Rebuild the block grid: ROWS x COLS, padded, row-colored
    fn init_blocks(&mut self) {
        self.blocks.clear();
        let cols = BLOCK_COLS as f32;
        let usable = self.width - BLOCK_PADDING * 2.0;
        let block_width = (usable - BLOCK_PADDING * (cols - 1.0)) / cols;

        for r in 0..BLOCK_ROWS {
            for c in 0..BLOCK_COLS {
                self.blocks.push(Block {
                    id: r * BLOCK_COLS + c,
                    x: BLOCK_PADDING + c as f32 * (block_width + BLOCK_PADDING),
                    y: BLOCK_TOP_Y + r as f32 * (BLOCK_HEIGHT + BLOCK_PADDING),
                    width: block_width,
                    height: BLOCK_HEIGHT,
                    active: true,
                    color: (r % BLOCK_COLORS.len() as u32) as u8,
                });
            }
        }
    }

    /// Full round reset: fresh grid, score, lives, hearts, resting ball.
    /// Cancels any pending relaunch.
    pub fn reset_round(&mut self) {
        self.init_blocks();
        self.score = 0;
        self.lives = INITIAL_LIVES;
        self.hearts.clear();
        self.hit_flash = 0.0;
        self.relaunch_ticks = 0;
        self.reset_ball();
    }

    /// Reset round state and launch immediately (the Loading -> Playing and
    /// retry sequences both run this)
    pub fn start_round(&mut self) {
        self.reset_round();
        self.launch_ball();
    }

    /// Rest the ball on the recentered paddle
    pub fn reset_ball(&mut self) {
        self.ball.pos = Vec2::new(self.width * 0.5, self.paddle_y - 30.0);
        self.ball.vel = Vec2::ZERO;
        self.ball.active = false;
        self.paddle.x = (self.width - self.paddle.width) * 0.5;
    }

    /// Launch the resting ball: randomized horizontal direction, magnitude
    /// from base speed and the current tier multiplier
    pub fn launch_ball(&mut self) {
        let multiplier = self.speed_multiplier();
        let spread = BALL_SPEED_BASE * LAUNCH_VX_SPREAD * multiplier;
        self.ball.active = true;
        self.ball.vel.x = (self.rng.random::<f32>() - 0.5) * spread;
        self.ball.vel.y = -BALL_SPEED_BASE * LAUNCH_VY_FACTOR * multiplier;
    }

    /// Roll the heart drop chance for a destroyed block at (x, y)
    pub(crate) fn maybe_spawn_heart(&mut self, x: f32, y: f32) {
        if self.rng.random::<f32>() < HEART_DROP_CHANCE {
            let id = self.next_heart_id;
            self.next_heart_id += 1;
            self.hearts.push(HeartItem {
                id,
                pos: Vec2::new(x, y),
                active: true,
            });
        }
    }

    pub fn active_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.active).count()
    }

    /// Victory condition: the grid existed and every block is inactive
    pub fn all_blocks_cleared(&self) -> bool {
        !self.blocks.is_empty() && self.blocks.iter().all(|b| !b.active)
    }
}
