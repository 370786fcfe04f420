//! Paint a draw list onto a 2D canvas context

use web_sys::CanvasRenderingContext2d;

use super::shapes::{DrawList, Primitive};

const BANNER_FONT: &str = "bold 48px Arial";

/// Clear the canvas and paint every primitive in order
pub fn paint(ctx: &CanvasRenderingContext2d, list: &DrawList) {
    let (width, height) = (list.canvas.x, list.canvas.y);
    ctx.clear_rect(0.0, 0.0, width, height);

    for primitive in &list.primitives {
        match primitive {
            Primitive::Grid { cell_size, color } => {
                if *cell_size <= 0.0 {
                    continue;
                }
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(1.0);
                ctx.begin_path();
                let mut x = 0.0;
                while x <= width {
                    ctx.move_to(x, 0.0);
                    ctx.line_to(x, height);
                    x += cell_size;
                }
                let mut y = 0.0;
                while y <= height {
                    ctx.move_to(0.0, y);
                    ctx.line_to(width, y);
                    y += cell_size;
                }
                ctx.stroke();
            }
            Primitive::Fill { rect, color } => {
                ctx.set_fill_style_str(color);
                ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
            }
            Primitive::Stroke { rect, color, width } => {
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(*width);
                ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
            }
            Primitive::Glyph {
                text,
                center,
                color,
                font_px,
            } => {
                ctx.set_fill_style_str(color);
                ctx.set_font(&format!("{}px Arial", font_px));
                ctx.set_text_align("center");
                ctx.set_text_baseline("middle");
                if let Err(e) = ctx.fill_text(text, center.x, center.y) {
                    log::warn!("fill_text failed: {:?}", e);
                }
            }
        }
    }

    if let Some(banner) = list.banner {
        ctx.set_fill_style_str("white");
        ctx.set_font(BANNER_FONT);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let _ = ctx.fill_text(banner, width / 2.0, height / 2.0);
    }
}
