//! Per-refresh state advance
//!
//! Runs once per display refresh while the session is Playing, reading only
//! the latest motion sample. Returns the round outcome when lives run out or
//! the grid clears; the session layer applies the transition.

use crate::consts::*;
use crate::lerp;
use crate::motion::MotionSample;

use super::collision::{ball_block_overlap, ball_paddle_overlap, paddle_deflection, rect_overlap};
use super::state::{GameState, RoundOutcome};

/// Advance the simulation by one tick
pub fn tick(state: &mut GameState, input: &MotionSample) -> Option<RoundOutcome> {
    // Paddle tracks the control position with smoothing, then clamps
    let target = input.x * state.width - state.paddle.width * 0.5;
    state.paddle.x = lerp(state.paddle.x, target, PADDLE_LERP);
    state.paddle.x = state.paddle.x.clamp(0.0, state.width - state.paddle.width);

    state.hit_flash = (state.hit_flash - HIT_FLASH_DECAY).max(0.0);

    update_hearts(state);

    if !state.ball.active {
        // Resting ball rides the paddle center
        state.ball.pos.x = state.paddle.center();
        state.ball.pos.y = state.paddle_y - 15.0;

        if state.relaunch_ticks > 0 {
            state.relaunch_ticks -= 1;
            if state.relaunch_ticks == 0 {
                state.launch_ball();
            }
        }
        return None;
    }

    state.ball.pos += state.ball.vel;

    // Side walls reflect vx, top wall reflects vy
    if state.ball.pos.x < state.ball.radius || state.ball.pos.x > state.width - state.ball.radius {
        state.ball.vel.x = -state.ball.vel.x;
    }
    if state.ball.pos.y < state.ball.radius {
        state.ball.vel.y = -state.ball.vel.y;
    }

    // Bottom exit costs a life
    if state.ball.pos.y > state.height {
        state.lives = state.lives.saturating_sub(1);
        if state.lives == 0 {
            log::info!("ball lost with no lives remaining, score {}", state.score);
            return Some(RoundOutcome::GameOver);
        }
        state.reset_ball();
        state.relaunch_ticks = RELAUNCH_DELAY_TICKS;
        return None;
    }

    if ball_paddle_overlap(&state.ball, &state.paddle, state.paddle_y) {
        // Always rebound upward; horizontal speed comes from where the
        // paddle was struck, giving the player directional control
        state.ball.vel.y = -state.ball.vel.y.abs();
        let deflection = paddle_deflection(state.ball.pos.x, &state.paddle);
        state.ball.vel.x = deflection * BALL_SPEED_BASE * state.speed_multiplier();
        state.hit_flash = 1.0;
    }

    // First overlapping active block wins; one block per tick even when the
    // ball geometrically overlaps several
    for i in 0..state.blocks.len() {
        if !state.blocks[i].active {
            continue;
        }
        if ball_block_overlap(&state.ball, &state.blocks[i]) {
            state.blocks[i].active = false;
            state.ball.vel.y = -state.ball.vel.y;
            state.score += SCORE_PER_BLOCK;

            let cx = state.blocks[i].x + state.blocks[i].width * 0.5;
            let cy = state.blocks[i].y + state.blocks[i].height * 0.5;
            state.maybe_spawn_heart(cx, cy);
            break;
        }
    }

    if state.all_blocks_cleared() {
        log::info!("round cleared, score {}", state.score);
        return Some(RoundOutcome::Victory);
    }

    None
}

/// Purge inactive hearts, advance the rest, and resolve catches/falls
fn update_hearts(state: &mut GameState) {
    state.hearts.retain(|h| h.active);

    let paddle = state.paddle;
    let paddle_y = state.paddle_y;
    let height = state.height;
    let half = HEART_SIZE * 0.5;
    let mut caught = 0u32;

    for heart in &mut state.hearts {
        heart.pos.y += HEART_FALL_SPEED;

        if rect_overlap(heart.pos, half, paddle.x, paddle_y, paddle.width, paddle.height) {
            heart.active = false;
            caught += 1;
            continue;
        }
        if heart.pos.y > height + HEART_SIZE {
            heart.active = false;
        }
    }

    if caught > 0 {
        state.lives += caught;
        log::debug!("heart caught, lives now {}", state.lives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MoveCommand;
    use crate::sim::state::HeartItem;
    use glam::Vec2;
    use proptest::prelude::*;

    fn state_800x600(seed: u64) -> GameState {
        GameState::new(800.0, 600.0, seed)
    }

    fn idle() -> MotionSample {
        MotionSample::default()
    }

    fn sample_at(x: f32) -> MotionSample {
        MotionSample {
            command: if x < 0.5 {
                MoveCommand::Left
            } else {
                MoveCommand::Right
            },
            intensity: 1.0,
            x,
        }
    }

    #[test]
    fn test_ball_drop_decrements_lives_and_schedules_relaunch() {
        let mut state = state_800x600(1);
        state.launch_ball();
        state.ball.pos = Vec2::new(400.0, 601.0);
        state.ball.vel = Vec2::new(0.0, 3.0);

        let outcome = tick(&mut state, &idle());
        assert!(outcome.is_none());
        assert_eq!(state.lives, INITIAL_LIVES - 1);
        assert!(!state.ball.active);
        assert_eq!(state.relaunch_ticks, RELAUNCH_DELAY_TICKS);

        // Relaunch fires exactly after the delay
        for _ in 0..RELAUNCH_DELAY_TICKS - 1 {
            tick(&mut state, &idle());
            assert!(!state.ball.active);
        }
        tick(&mut state, &idle());
        assert!(state.ball.active);
        assert!(state.ball.vel.y < 0.0);
    }

    #[test]
    fn test_ball_drop_at_last_life_is_game_over() {
        let mut state = state_800x600(2);
        state.launch_ball();
        state.lives = 1;
        state.ball.pos = Vec2::new(400.0, 601.0);
        state.ball.vel = Vec2::new(0.0, 3.0);

        let outcome = tick(&mut state, &idle());
        assert_eq!(outcome, Some(RoundOutcome::GameOver));
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_side_wall_reflects_vx() {
        let mut state = state_800x600(3);
        state.launch_ball();
        state.ball.pos = Vec2::new(10.0, 400.0);
        state.ball.vel = Vec2::new(-3.0, 1.0);
        tick(&mut state, &idle());
        assert!(state.ball.vel.x > 0.0);
    }

    #[test]
    fn test_top_wall_reflects_vy() {
        let mut state = state_800x600(3);
        state.launch_ball();
        // Clear the grid so no block intercepts the ball near the top
        state.blocks.clear();
        state.ball.pos = Vec2::new(400.0, 10.0);
        state.ball.vel = Vec2::new(0.0, -3.0);
        tick(&mut state, &idle());
        assert!(state.ball.vel.y > 0.0);
    }

    #[test]
    fn test_paddle_bounce_deflects_and_flashes() {
        let mut state = state_800x600(4);
        state.launch_ball();
        // Strike near the right edge of the paddle, moving downward
        let px = state.paddle.x + state.paddle.width * 0.9;
        state.ball.pos = Vec2::new(px, state.paddle_y - 2.0);
        state.ball.vel = Vec2::new(0.0, 3.0);

        tick(&mut state, &idle());
        assert!(state.ball.vel.y < 0.0, "paddle always rebounds upward");
        assert!(state.ball.vel.x > 0.0, "right-side hit deflects right");
        assert!(
            state.ball.vel.x.abs() <= BALL_SPEED_BASE * state.speed_multiplier() + 1e-3,
            "deflection bounded by base speed x multiplier"
        );
        assert_eq!(state.hit_flash, 1.0);
    }

    #[test]
    fn test_hit_flash_decays() {
        let mut state = state_800x600(4);
        state.hit_flash = 1.0;
        tick(&mut state, &idle());
        assert!((state.hit_flash - (1.0 - HIT_FLASH_DECAY)).abs() < 1e-6);
    }

    #[test]
    fn test_block_hit_scores_and_deactivates_one() {
        let mut state = state_800x600(5);
        state.launch_ball();
        // Park the ball inside row 0 where adjacent blocks nearly touch:
        // with radius 12 and padding 4 it overlaps two blocks at once
        let b0 = state.blocks[0];
        state.ball.pos = Vec2::new(b0.x + b0.width + BLOCK_PADDING * 0.5, b0.y + 5.0);
        state.ball.vel = Vec2::new(0.0, 1.0);
        let before = state.active_blocks();

        tick(&mut state, &idle());
        assert_eq!(state.active_blocks(), before - 1, "one block per tick");
        assert_eq!(state.score, SCORE_PER_BLOCK);
        assert!(state.ball.vel.y < 0.0, "vy inverted by block hit");
    }

    #[test]
    fn test_victory_after_clearing_all_blocks_and_score() {
        let mut state = state_800x600(6);
        state.launch_ball();
        let n = state.blocks.len() as u64;

        let mut outcome = None;
        for i in 0..state.blocks.len() {
            let b = state.blocks[i];
            // Re-aim the ball into the next block's center each tick
            state.ball.pos = Vec2::new(b.x + b.width * 0.5, b.y + b.height * 0.5);
            state.ball.vel = Vec2::new(0.0, 1.0);
            outcome = tick(&mut state, &idle());
        }

        assert_eq!(outcome, Some(RoundOutcome::Victory));
        assert_eq!(state.score, SCORE_PER_BLOCK * n);
        // Heart pickups never contribute to score
        assert!(state.lives >= INITIAL_LIVES);
    }

    #[test]
    fn test_heart_fall_catch_and_purge() {
        let mut state = state_800x600(8);
        state.hearts.push(HeartItem {
            id: 0,
            pos: Vec2::new(state.paddle.center(), state.paddle_y - 1.0),
            active: true,
        });
        let lives = state.lives;

        tick(&mut state, &idle());
        assert_eq!(state.lives, lives + 1);
        assert!(!state.hearts.is_empty(), "lazy deletion: purged next tick");
        tick(&mut state, &idle());
        assert!(state.hearts.is_empty());
    }

    #[test]
    fn test_heart_leaves_field() {
        let mut state = state_800x600(8);
        state.hearts.push(HeartItem {
            id: 0,
            pos: Vec2::new(50.0, state.height + HEART_SIZE + 1.0),
            active: true,
        });
        let lives = state.lives;
        tick(&mut state, &idle());
        assert_eq!(state.lives, lives);
        assert!(!state.hearts[0].active);
        tick(&mut state, &idle());
        assert!(state.hearts.is_empty());
    }

    #[test]
    fn test_resting_ball_rides_paddle() {
        let mut state = state_800x600(9);
        assert!(!state.ball.active);
        // Walk the paddle right; the resting ball must follow its center
        for _ in 0..60 {
            tick(&mut state, &sample_at(1.0));
        }
        assert!((state.ball.pos.x - state.paddle.center()).abs() < 1e-3);
        assert_eq!(state.ball.pos.y, state.paddle_y - 15.0);
    }

    proptest! {
        #[test]
        fn prop_paddle_stays_clamped(x in 0.0f32..=1.0, start in -200.0f32..1000.0) {
            let mut state = state_800x600(11);
            state.paddle.x = start;
            tick(&mut state, &sample_at(x));
            prop_assert!(state.paddle.x >= 0.0);
            prop_assert!(state.paddle.x <= state.width - state.paddle.width);
        }

        #[test]
        fn prop_score_monotonic(seed in 0u64..1000) {
            let mut state = state_800x600(seed);
            state.launch_ball();
            let mut last = state.score;
            for _ in 0..240 {
                if tick(&mut state, &sample_at(0.3)).is_some() {
                    break;
                }
                prop_assert!(state.score >= last);
                last = state.score;
            }
        }
    }
}
