//! Motion-sensing pipeline
//!
//! Converts a live camera feed into a coarse horizontal control signal via
//! low-resolution frame differencing - no pose estimation involved. The pure
//! analysis core lives in [`analyzer`]; camera and scheduling glue is
//! wasm-only. The simulation reads the latest sample from an [`InputSlot`]
//! once per tick, decoupling sensor cadence from the game loop.

pub mod analyzer;
pub mod channel;

#[cfg(target_arch = "wasm32")]
pub mod camera;
#[cfg(target_arch = "wasm32")]
pub mod sensor;

pub use analyzer::FrameAnalyzer;
pub use channel::InputSlot;

#[cfg(target_arch = "wasm32")]
pub use sensor::MotionSensor;

use std::fmt;

/// Coarse horizontal command derived from the motion centroid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveCommand {
    Left,
    #[default]
    Idle,
    Right,
}

impl MoveCommand {
    pub fn sign(self) -> i8 {
        match self {
            MoveCommand::Left => -1,
            MoveCommand::Idle => 0,
            MoveCommand::Right => 1,
        }
    }
}

/// One processed-frame control sample. Ephemeral: overwritten each cycle,
/// no identity beyond "latest value".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub command: MoveCommand,
    /// Motion energy on the commanded side, normalized to [0, 1]
    pub intensity: f32,
    /// Normalized horizontal control position in [0, 1]. Holds its last
    /// valid value across low-motion frames so the paddle never snaps.
    pub x: f32,
}

impl Default for MotionSample {
    fn default() -> Self {
        Self {
            command: MoveCommand::Idle,
            intensity: 0.0,
            x: 0.5,
        }
    }
}

/// Sensor failures surfaced to the session layer. Steady-state frame
/// anomalies never raise these; they degrade to "no sample this tick".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The platform denied camera access
    PermissionDenied,
    /// No device matched, even after relaxing the facing constraint
    CameraUnavailable,
    /// Stream metadata/playback never became ready within the bound
    StreamReadyTimeout,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::PermissionDenied => write!(f, "camera permission denied"),
            SensorError::CameraUnavailable => write!(f, "no usable camera found"),
            SensorError::StreamReadyTimeout => write!(f, "camera stream never became ready"),
        }
    }
}

impl std::error::Error for SensorError {}
