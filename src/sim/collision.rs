//! Axis-aligned overlap tests for ball, paddle, blocks, and hearts
//!
//! The ball is tested by its bounding box, matching the coarse arcade feel
//! rather than exact circle-rect contact.

use glam::Vec2;

use crate::consts::PADDLE_HIT_MARGIN;

use super::state::{Ball, Block, Paddle};

/// Bounding-box overlap between a circle (by its AABB) and a rect
#[inline]
pub fn ball_rect_overlap(pos: Vec2, radius: f32, x: f32, y: f32, w: f32, h: f32) -> bool {
    pos.x + radius > x && pos.x - radius < x + w && pos.y + radius > y && pos.y - radius < y + h
}

/// AABB overlap between two rects given by center/half-extent and origin/size
#[inline]
pub fn rect_overlap(center: Vec2, half: f32, x: f32, y: f32, w: f32, h: f32) -> bool {
    center.x + half > x && center.x - half < x + w && center.y + half > y && center.y - half < y + h
}

/// Ball vs block, bounding boxes
#[inline]
pub fn ball_block_overlap(ball: &Ball, block: &Block) -> bool {
    ball_rect_overlap(
        ball.pos,
        ball.radius,
        block.x,
        block.y,
        block.width,
        block.height,
    )
}

/// Ball vs paddle band. Horizontal span is widened by the forgiveness margin
/// on each side; the vertical test uses the ball's extent against the band.
#[inline]
pub fn ball_paddle_overlap(ball: &Ball, paddle: &Paddle, paddle_y: f32) -> bool {
    ball.pos.y + ball.radius > paddle_y
        && ball.pos.y - ball.radius < paddle_y + paddle.height
        && ball.pos.x > paddle.x - PADDLE_HIT_MARGIN
        && ball.pos.x < paddle.x + paddle.width + PADDLE_HIT_MARGIN
}

/// Where on the paddle the ball struck: -1 at the left edge, +1 at the right
#[inline]
pub fn paddle_deflection(ball_x: f32, paddle: &Paddle) -> f32 {
    (ball_x - paddle.center()) / (paddle.width * 0.5)
}
