//! Session state machine and time accounting
//!
//! Owns the coarse Menu/Loading/Playing/GameOver/Victory status, the camera
//! facing mode, the cumulative elapsed-time counter, and the auto-retry
//! countdown. The controller is pure: platform side effects (camera
//! acquisition, round resets) are expressed as returned [`Directive`]s for
//! the shell to execute, so overlapping transitions can never double-fire a
//! timer - changing status simply drops the pending countdown.

use crate::consts::RETRY_COUNTDOWN_SECS;
use crate::sim::RoundOutcome;

/// Which camera the sensor should use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Front camera (mirrored on screen)
    User,
    /// Back camera
    Environment,
}

impl Facing {
    pub fn as_str(self) -> &'static str {
        match self {
            Facing::User => "user",
            Facing::Environment => "environment",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::User => Facing::Environment,
            Facing::Environment => Facing::User,
        }
    }

    /// Front cameras present a mirror image; the sensor inverts the centroid
    pub fn is_mirrored(self) -> bool {
        self == Facing::User
    }
}

/// Coarse presentation status; exactly one value at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Menu,
    Loading,
    Playing,
    GameOver,
    Victory,
}

/// Side effects for the shell to carry out after a controller call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Acquire the camera and start the sensor
    AcquireCamera { facing: Facing },
    /// Stop the running sensor, then acquire with the new facing mode
    RestartSensor { facing: Facing },
    /// Fresh round: rebuild blocks, reset score/lives, launch
    StartRound,
    /// Re-enter play after a mid-round camera switch; round state untouched
    ResumeRound,
}

pub struct SessionController {
    status: SessionStatus,
    facing: Facing,
    /// Whole seconds spent in Playing, cumulative across rounds
    elapsed_secs: u64,
    second_accum: f32,
    /// Seconds left on the auto-retry countdown, when armed
    retry_remaining: Option<f32>,
    /// Camera re-acquisition in flight should resume the current round
    resume_after_load: bool,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Menu,
            facing: Facing::Environment,
            elapsed_secs: 0,
            second_accum: 0.0,
            retry_remaining: None,
            resume_after_load: false,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Total play time in whole seconds, never reset within a session
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Remaining retry countdown rounded up for display, if armed
    pub fn retry_countdown(&self) -> Option<u32> {
        self.retry_remaining.map(|r| r.ceil() as u32)
    }

    /// Start request from the menu. Ignored in any other status (the retry
    /// countdown has no manual skip, and Loading allows one acquisition at
    /// a time).
    pub fn request_start(&mut self) -> Option<Directive> {
        if self.status != SessionStatus::Menu {
            return None;
        }
        self.status = SessionStatus::Loading;
        self.resume_after_load = false;
        log::info!("start requested, acquiring {} camera", self.facing.as_str());
        Some(Directive::AcquireCamera {
            facing: self.facing,
        })
    }

    /// Camera came up. Ignored unless Loading (a stale async completion
    /// after the user changed course must not fire into the new status).
    pub fn camera_ready(&mut self) -> Option<Directive> {
        if self.status != SessionStatus::Loading {
            return None;
        }
        self.status = SessionStatus::Playing;
        if std::mem::take(&mut self.resume_after_load) {
            log::info!("camera restarted, resuming round");
            Some(Directive::ResumeRound)
        } else {
            log::info!("camera ready, starting round");
            Some(Directive::StartRound)
        }
    }

    /// Camera acquisition failed: back to the menu, round state untouched
    pub fn camera_failed(&mut self, error: &dyn std::error::Error) {
        if self.status != SessionStatus::Loading {
            return;
        }
        log::error!("camera acquisition failed: {error}");
        self.status = SessionStatus::Menu;
        self.resume_after_load = false;
    }

    /// The simulation reported a round outcome
    pub fn round_over(&mut self, outcome: RoundOutcome) {
        if self.status != SessionStatus::Playing {
            return;
        }
        self.status = match outcome {
            RoundOutcome::GameOver => SessionStatus::GameOver,
            RoundOutcome::Victory => SessionStatus::Victory,
        };
        self.retry_remaining = Some(RETRY_COUNTDOWN_SECS);
        log::info!("round over: {:?}, retry in {}s", self.status, RETRY_COUNTDOWN_SECS);
    }

    /// Flip the camera facing mode. While the sensor is running (Playing or
    /// a terminal screen) the stream is re-acquired with the new mode; from
    /// Playing the round resumes on success, from GameOver/Victory a fresh
    /// round starts. Ignored while Loading - only one acquisition may be in
    /// flight.
    pub fn toggle_camera(&mut self) -> Option<Directive> {
        if self.status == SessionStatus::Loading {
            return None;
        }
        self.facing = self.facing.flipped();
        log::info!("camera facing toggled to {}", self.facing.as_str());

        match self.status {
            SessionStatus::Playing => {
                self.status = SessionStatus::Loading;
                self.resume_after_load = true;
                Some(Directive::RestartSensor {
                    facing: self.facing,
                })
            }
            SessionStatus::GameOver | SessionStatus::Victory => {
                // Leaving the terminal screen drops the pending countdown
                self.retry_remaining = None;
                self.status = SessionStatus::Loading;
                self.resume_after_load = false;
                Some(Directive::RestartSensor {
                    facing: self.facing,
                })
            }
            // Menu: the new mode is picked up by the next start request
            _ => None,
        }
    }

    /// Advance wall-clock time. Accumulates elapsed play time while Playing
    /// and drives the retry countdown on the terminal screens.
    pub fn advance(&mut self, dt: f32) -> Option<Directive> {
        match self.status {
            SessionStatus::Playing => {
                self.second_accum += dt;
                while self.second_accum >= 1.0 {
                    self.second_accum -= 1.0;
                    self.elapsed_secs += 1;
                }
                None
            }
            SessionStatus::GameOver | SessionStatus::Victory => {
                let remaining = self.retry_remaining?;
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.retry_remaining = None;
                    self.status = SessionStatus::Playing;
                    log::info!("retry countdown elapsed, restarting round");
                    Some(Directive::StartRound)
                } else {
                    self.retry_remaining = Some(remaining);
                    None
                }
            }
            _ => None,
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::SensorError;

    fn playing_session() -> SessionController {
        let mut s = SessionController::new();
        assert!(s.request_start().is_some());
        assert_eq!(s.camera_ready(), Some(Directive::StartRound));
        s
    }

    #[test]
    fn test_menu_to_playing_happy_path() {
        let mut s = SessionController::new();
        assert_eq!(s.status(), SessionStatus::Menu);
        assert_eq!(
            s.request_start(),
            Some(Directive::AcquireCamera {
                facing: Facing::Environment
            })
        );
        assert_eq!(s.status(), SessionStatus::Loading);
        assert_eq!(s.camera_ready(), Some(Directive::StartRound));
        assert_eq!(s.status(), SessionStatus::Playing);
    }

    #[test]
    fn test_camera_failure_returns_to_menu() {
        let mut s = SessionController::new();
        s.request_start();
        s.camera_failed(&SensorError::PermissionDenied);
        assert_eq!(s.status(), SessionStatus::Menu);
        // A fresh start request works again afterwards
        assert!(s.request_start().is_some());
    }

    #[test]
    fn test_start_ignored_outside_menu() {
        let mut s = playing_session();
        assert!(s.request_start().is_none());
        s.round_over(RoundOutcome::GameOver);
        // No manual skip of the retry countdown
        assert!(s.request_start().is_none());
        assert_eq!(s.status(), SessionStatus::GameOver);
    }

    #[test]
    fn test_stale_camera_ready_is_ignored() {
        let mut s = SessionController::new();
        s.request_start();
        s.camera_failed(&SensorError::CameraUnavailable);
        // The async acquisition resolves late, after we fell back to Menu
        assert!(s.camera_ready().is_none());
        assert_eq!(s.status(), SessionStatus::Menu);
    }

    #[test]
    fn test_elapsed_time_only_while_playing() {
        let mut s = SessionController::new();
        s.advance(2.5);
        assert_eq!(s.elapsed_secs(), 0);

        s.request_start();
        s.camera_ready();
        s.advance(0.6);
        s.advance(0.6);
        assert_eq!(s.elapsed_secs(), 1);

        s.round_over(RoundOutcome::Victory);
        s.advance(0.5);
        assert_eq!(s.elapsed_secs(), 1, "paused outside Playing");
    }

    #[test]
    fn test_elapsed_time_cumulative_across_rounds() {
        let mut s = playing_session();
        s.advance(5.0);
        assert_eq!(s.elapsed_secs(), 5);

        s.round_over(RoundOutcome::GameOver);
        // Countdown runs to completion and the next round starts
        assert!(s.advance(1.0).is_none());
        assert!(s.advance(1.0).is_none());
        assert_eq!(s.advance(1.5), Some(Directive::StartRound));
        assert_eq!(s.status(), SessionStatus::Playing);

        s.advance(3.0);
        assert_eq!(s.elapsed_secs(), 8, "never reset within the session");
    }

    #[test]
    fn test_retry_countdown_display() {
        let mut s = playing_session();
        s.round_over(RoundOutcome::GameOver);
        assert_eq!(s.retry_countdown(), Some(3));
        s.advance(0.5);
        assert_eq!(s.retry_countdown(), Some(3));
        s.advance(1.0);
        assert_eq!(s.retry_countdown(), Some(2));
    }

    #[test]
    fn test_toggle_while_playing_resumes_round() {
        let mut s = playing_session();
        assert_eq!(
            s.toggle_camera(),
            Some(Directive::RestartSensor {
                facing: Facing::User
            })
        );
        assert_eq!(s.status(), SessionStatus::Loading);
        assert_eq!(s.camera_ready(), Some(Directive::ResumeRound));
        assert_eq!(s.status(), SessionStatus::Playing);
    }

    #[test]
    fn test_toggle_on_terminal_screen_cancels_countdown() {
        let mut s = playing_session();
        s.round_over(RoundOutcome::GameOver);
        assert!(s.retry_countdown().is_some());

        assert_eq!(
            s.toggle_camera(),
            Some(Directive::RestartSensor {
                facing: Facing::User
            })
        );
        assert!(s.retry_countdown().is_none());
        // Success starts a fresh round, not a resume of the dead one
        assert_eq!(s.camera_ready(), Some(Directive::StartRound));
    }

    #[test]
    fn test_toggle_failure_falls_back_to_menu() {
        let mut s = playing_session();
        s.toggle_camera();
        s.camera_failed(&SensorError::StreamReadyTimeout);
        assert_eq!(s.status(), SessionStatus::Menu);
        assert_eq!(s.facing(), Facing::User, "facing change sticks");
    }

    #[test]
    fn test_toggle_in_menu_only_flips_facing() {
        let mut s = SessionController::new();
        assert!(s.toggle_camera().is_none());
        assert_eq!(s.facing(), Facing::User);
        assert_eq!(s.status(), SessionStatus::Menu);
        // The next start uses the flipped mode
        assert_eq!(
            s.request_start(),
            Some(Directive::AcquireCamera {
                facing: Facing::User
            })
        );
    }

    #[test]
    fn test_toggle_ignored_while_loading() {
        let mut s = SessionController::new();
        s.request_start();
        assert!(s.toggle_camera().is_none());
        assert_eq!(s.facing(), Facing::Environment);
    }

    #[test]
    fn test_round_over_ignored_outside_playing() {
        let mut s = SessionController::new();
        s.round_over(RoundOutcome::Victory);
        assert_eq!(s.status(), SessionStatus::Menu);
    }

    /// Full retry sequence against the real simulation: the round reset from
    /// the countdown's StartRound must land before the next tick, so the
    /// stale terminal state never re-emits its outcome.
    #[test]
    fn test_countdown_restart_ticks_fresh_round() {
        use crate::consts::INITIAL_LIVES;
        use crate::motion::MotionSample;
        use crate::sim::{GameState, tick};
        use glam::Vec2;

        let mut s = playing_session();
        let mut state = GameState::new(800.0, 600.0, 13);
        state.start_round();
        state.lives = 1;
        state.ball.pos = Vec2::new(400.0, 601.0);
        state.ball.vel = Vec2::new(0.0, 3.0);

        let outcome = tick(&mut state, &MotionSample::default()).unwrap();
        s.round_over(outcome);
        assert_eq!(s.status(), SessionStatus::GameOver);

        // Countdown elapses; the shell applies StartRound before simulating
        assert_eq!(s.advance(3.1), Some(Directive::StartRound));
        state.start_round();

        assert!(tick(&mut state, &MotionSample::default()).is_none());
        assert_eq!(s.status(), SessionStatus::Playing);
        assert_eq!(state.lives, INITIAL_LIVES);
        assert_eq!(state.score, 0);
        assert!(s.retry_countdown().is_none());
    }
}
