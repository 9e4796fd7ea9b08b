//! Canvas 2D painter for the web build

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Scene, Sprite, SpriteKind};
use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

const PIPE_FILL: &str = "#3cb043";
const PIPE_RIM: &str = "#2a7d2f";
const CLOUD_FILL: &str = "rgba(255,255,255,0.85)";
const BIRD_FILL: &str = "#ffd23f";
const BIRD_ANGRY_FILL: &str = "#ff5a36";

pub struct CanvasPainter {
    context: CanvasRenderingContext2d,
    /// Canvas pixels per playfield unit
    scale: f64,
}

impl CanvasPainter {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2D canvas unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        context.set_image_smoothing_enabled(false);

        let scale = canvas.width() as f64 / PLAYFIELD_WIDTH as f64;
        Ok(Self { context, scale })
    }

    /// Refit after the canvas backing store changed size
    pub fn resize(&mut self, canvas: &HtmlCanvasElement) {
        self.scale = canvas.width() as f64 / PLAYFIELD_WIDTH as f64;
    }

    pub fn paint(&self, scene: &Scene) {
        let ctx = &self.context;
        let _ = ctx.set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0);

        ctx.set_fill_style_str(&format!("hsl(200, 70%, {:.0}%)", scene.sky_lightness));
        ctx.fill_rect(0.0, 0.0, PLAYFIELD_WIDTH as f64, PLAYFIELD_HEIGHT as f64);

        for sprite in &scene.sprites {
            self.paint_sprite(sprite);
        }

        if scene.overlay == super::Overlay::None {
            ctx.set_fill_style_str("#ffffff");
            ctx.set_font("bold 36px sans-serif");
            let _ = ctx.fill_text(&scene.hud.score.to_string(), PLAYFIELD_WIDTH as f64 / 2.0 - 10.0, 60.0);
        }
    }

    fn paint_sprite(&self, sprite: &Sprite) {
        let ctx = &self.context;
        let r = &sprite.rect;
        let (x, y) = (r.min.x as f64, r.min.y as f64);
        let (w, h) = (r.width() as f64, r.height() as f64);

        match sprite.kind {
            SpriteKind::Cloud => {
                ctx.set_fill_style_str(CLOUD_FILL);
                ctx.begin_path();
                let _ = ctx.ellipse(
                    x + w / 2.0,
                    y + h / 2.0,
                    w / 2.0,
                    h / 2.0,
                    0.0,
                    0.0,
                    std::f64::consts::TAU,
                );
                ctx.fill();
            }
            SpriteKind::PipeTop | SpriteKind::PipeBottom => {
                ctx.set_fill_style_str(PIPE_FILL);
                ctx.fill_rect(x, y, w, h);
                // Lip on the gap side
                let lip_y = if sprite.kind == SpriteKind::PipeTop { y + h - 12.0 } else { y };
                ctx.set_fill_style_str(PIPE_RIM);
                ctx.fill_rect(x - 4.0, lip_y, w + 8.0, 12.0);
            }
            SpriteKind::Bird { angry } => {
                ctx.save();
                let _ = ctx.translate(x + w / 2.0, y + h / 2.0);
                let _ = ctx.rotate((sprite.rotation as f64).to_radians());
                ctx.set_fill_style_str(if angry { BIRD_ANGRY_FILL } else { BIRD_FILL });
                ctx.begin_path();
                let _ = ctx.ellipse(0.0, 0.0, w / 2.0, h / 2.0, 0.0, 0.0, std::f64::consts::TAU);
                ctx.fill();
                // Eye
                ctx.set_fill_style_str("#ffffff");
                ctx.fill_rect(w / 6.0, -h / 4.0, 12.0, 12.0);
                ctx.set_fill_style_str("#000000");
                ctx.fill_rect(w / 6.0 + 6.0, -h / 4.0 + 3.0, 5.0, 6.0);
                ctx.restore();
            }
        }
    }
}
