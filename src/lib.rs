//! Motion Breakout - a camera-controlled breakout game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, round state)
//! - `motion`: Frame-differencing motion pipeline and input channel
//! - `session`: Menu/Loading/Playing state machine and time accounting
//! - `render`: Canvas-2D renderer (wasm only)

pub mod motion;
pub mod session;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod render;

pub use session::{Facing, SessionController, SessionStatus};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per display refresh, nominal 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Paddle spans 40% of the field width
    pub const PADDLE_WIDTH_RATIO: f32 = 0.4;
    pub const PADDLE_HEIGHT: f32 = 14.0;
    /// Paddle band sits at 88% of the field height
    pub const PADDLE_Y_RATIO: f32 = 0.88;
    /// Per-tick interpolation toward the motion target (sensor jitter smoothing)
    pub const PADDLE_LERP: f32 = 0.5;
    /// Forgiveness margin on each paddle edge, in field units
    pub const PADDLE_HIT_MARGIN: f32 = 10.0;

    /// Ball defaults (velocities are field units per tick)
    pub const BALL_RADIUS: f32 = 12.0;
    pub const BALL_SPEED_BASE: f32 = 4.0;
    /// Horizontal launch spread factor
    pub const LAUNCH_VX_SPREAD: f32 = 1.5;
    /// Vertical launch factor
    pub const LAUNCH_VY_FACTOR: f32 = 1.2;
    /// Delay between life loss and relaunch (1 second)
    pub const RELAUNCH_DELAY_TICKS: u32 = 60;

    /// Speed tier multipliers, cycled by explicit toggle
    pub const SPEED_MULTIPLIERS: [f32; 3] = [0.8, 1.8, 2.8];
    pub const SPEED_LABELS: [&str; 3] = ["SLOW", "MID", "FAST"];

    /// Block grid
    pub const BLOCK_ROWS: u32 = 5;
    pub const BLOCK_COLS: u32 = 6;
    pub const BLOCK_PADDING: f32 = 4.0;
    pub const BLOCK_HEIGHT: f32 = 24.0;
    pub const BLOCK_TOP_Y: f32 = 100.0;
    pub const SCORE_PER_BLOCK: u64 = 10;

    /// Row palette (rose, amber, emerald, blue, violet)
    pub const BLOCK_COLORS: [&str; 5] = ["#f43f5e", "#f59e0b", "#10b981", "#3b82f6", "#8b5cf6"];

    pub const INITIAL_LIVES: u32 = 5;
    pub const HEART_DROP_CHANCE: f32 = 0.12;
    pub const HEART_FALL_SPEED: f32 = 2.8;
    pub const HEART_SIZE: f32 = 26.0;

    /// Paddle hit flash decay per tick (cosmetic, consumed by the renderer)
    pub const HIT_FLASH_DECAY: f32 = 0.05;

    /// Motion probe resolution (downsampled camera frame)
    pub const SENSE_WIDTH: u32 = 64;
    pub const SENSE_HEIGHT: u32 = 48;
    /// Only the bottom 30% of the probe frame is analyzed
    pub const SENSE_REGION_START: f32 = 0.7;
    /// Per-pixel grayscale difference that counts as motion (0-255 scale)
    pub const PIXEL_DIFF_THRESHOLD: f32 = 30.0;
    /// Minimum motion pixels before a centroid is trusted
    pub const MOTION_ENERGY_MIN: u32 = 15;
    /// Side energy that maps to full command intensity
    pub const INTENSITY_FULL_ENERGY: f32 = 50.0;

    /// Recognition guide line at 75% of the field height
    pub const RECOGNITION_Y_RATIO: f32 = 0.75;

    /// Auto-retry countdown after GameOver/Victory
    pub const RETRY_COUNTDOWN_SECS: f32 = 3.0;

    /// Camera stream readiness bound
    pub const STREAM_READY_TIMEOUT_MS: i32 = 10_000;
    /// Ideal capture constraints
    pub const CAMERA_IDEAL_WIDTH: f64 = 640.0;
    pub const CAMERA_IDEAL_HEIGHT: f64 = 480.0;
    pub const CAMERA_IDEAL_FPS: f64 = 30.0;
}

/// Linear interpolation from `a` toward `b` by factor `t`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
