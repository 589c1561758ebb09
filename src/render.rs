//! Canvas-2D presentation layer (wasm)
//!
//! Stateless with respect to the simulation: reads a snapshot each frame and
//! never mutates game state. Coordinates are field units, mapped 1:1 onto
//! canvas pixels.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::*;
use crate::session::{SessionController, SessionStatus};
use crate::sim::GameState;

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { ctx })
    }

    pub fn render(&self, state: &GameState, session: &SessionController) {
        let w = state.width as f64;
        let h = state.height as f64;
        let ctx = &self.ctx;

        ctx.clear_rect(0.0, 0.0, w, h);
        ctx.set_fill_style_str("rgba(2, 6, 23, 0.5)");
        ctx.fill_rect(0.0, 0.0, w, h);

        if session.status() == SessionStatus::Playing {
            self.draw_recognition_line(w, h);
        }

        for block in state.blocks.iter().filter(|b| b.active) {
            ctx.set_fill_style_str(BLOCK_COLORS[block.color as usize % BLOCK_COLORS.len()]);
            ctx.fill_rect(
                block.x.floor() as f64,
                block.y.floor() as f64,
                block.width.floor() as f64,
                block.height as f64,
            );
        }

        for heart in state.hearts.iter().filter(|h| h.active) {
            self.draw_heart(heart.pos.x as f64, heart.pos.y as f64, HEART_SIZE as f64);
        }

        // Paddle, brightened while the hit flash is live
        let paddle_color = if state.hit_flash > 0.01 {
            "#7dd3fc"
        } else {
            "#0ea5e9"
        };
        ctx.set_fill_style_str(paddle_color);
        ctx.fill_rect(
            state.paddle.x.floor() as f64,
            state.paddle_y.floor() as f64,
            state.paddle.width.floor() as f64,
            state.paddle.height as f64,
        );

        // Ball with a soft glow
        ctx.set_fill_style_str("#fff");
        ctx.set_shadow_blur(15.0);
        ctx.set_shadow_color("rgba(255,255,255,0.8)");
        ctx.begin_path();
        let _ = ctx.arc(
            state.ball.pos.x.floor() as f64,
            state.ball.pos.y.floor() as f64,
            state.ball.radius as f64,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();
        ctx.set_shadow_blur(0.0);

        self.draw_header(state, session, w);
    }

    /// Dashed guide marking the motion-recognition band
    fn draw_recognition_line(&self, w: f64, h: f64) {
        let ctx = &self.ctx;
        let y = h * RECOGNITION_Y_RATIO as f64;
        ctx.set_stroke_style_str("rgba(14, 165, 233, 0.3)");
        let _ = ctx.set_line_dash(&js_sys::Array::of2(&8.into(), &8.into()));
        ctx.begin_path();
        ctx.move_to(0.0, y);
        ctx.line_to(w, y);
        ctx.stroke();
        let _ = ctx.set_line_dash(&js_sys::Array::new());
    }

    fn draw_header(&self, state: &GameState, session: &SessionController, w: f64) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str("#ffffff");
        ctx.set_font("900 24px ui-monospace");
        ctx.set_shadow_blur(6.0);
        ctx.set_shadow_color("black");
        ctx.set_text_align("right");
        let _ = ctx.fill_text(&format!("SCORE: {}", state.score), w - 20.0, 50.0);
        ctx.set_text_align("left");
        let _ = ctx.fill_text(&format!("TIME: {}s", session.elapsed_secs()), 20.0, 50.0);
        ctx.set_shadow_blur(0.0);
    }

    fn draw_heart(&self, x: f64, y: f64, size: f64) {
        let ctx = &self.ctx;
        ctx.save();
        let _ = ctx.translate(x, y);
        ctx.begin_path();
        let top = size * 0.3;
        ctx.move_to(0.0, top);
        ctx.bezier_curve_to(0.0, 0.0, -size / 2.0, 0.0, -size / 2.0, top);
        ctx.bezier_curve_to(-size / 2.0, size / 2.0, 0.0, size * 0.7, 0.0, size);
        ctx.bezier_curve_to(0.0, size * 0.7, size / 2.0, size / 2.0, size / 2.0, top);
        ctx.bezier_curve_to(size / 2.0, 0.0, 0.0, 0.0, 0.0, top);
        ctx.close_path();
        ctx.set_fill_style_str("#f43f5e");
        ctx.fill();
        ctx.restore();
    }
}
