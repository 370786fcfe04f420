//! Draw-list extraction
//!
//! Turns a state snapshot into a flat list of 2D primitives in paint order.
//! Nothing here touches the browser, so the output can be checked in tests.

use glam::DVec2;

use crate::consts::*;
use crate::sim::{BounceDemo, Body, Obstacle, ObstacleKind, Pusher, Rect, SimulationState};

const GRID_LINE_COLOR: &str = "rgba(255, 255, 255, 0.1)";
const TILE_OUTLINE_COLOR: &str = "rgba(255, 255, 255, 0.3)";
const CHECKER_LIGHT: &str = "#FFFFFF";
const CHECKER_DARK: &str = "#000000";
const ARROW_COLOR: &str = "white";
const ARROW_FONT_PX: f64 = 12.0;
const PLAYER_OUTLINE_WIDTH: f64 = 2.0;
const DEMO_OUTLINE_WIDTH: f64 = 4.0;

/// One drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Outline of every cell across the canvas
    Grid { cell_size: f64, color: String },
    Fill { rect: Rect, color: String },
    Stroke { rect: Rect, color: String, width: f64 },
    /// Centered text
    Glyph {
        text: &'static str,
        center: DVec2,
        color: String,
        font_px: f64,
    },
}

/// Primitives for one frame, back to front
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub canvas: DVec2,
    pub primitives: Vec<Primitive>,
    /// Banner text shown over the board
    pub banner: Option<&'static str>,
}

impl DrawList {
    pub fn new(canvas: DVec2) -> Self {
        Self {
            canvas,
            primitives: Vec::new(),
            banner: None,
        }
    }

    pub fn fill(&mut self, rect: Rect, color: impl Into<String>) {
        self.primitives.push(Primitive::Fill {
            rect,
            color: color.into(),
        });
    }

    pub fn stroke(&mut self, rect: Rect, color: impl Into<String>, width: f64) {
        self.primitives.push(Primitive::Stroke {
            rect,
            color: color.into(),
            width,
        });
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

/// Build the frame for the sandbox
pub fn level_draw_list(state: &SimulationState) -> DrawList {
    let cell = state.cell_size();
    let mut list = DrawList::new(state.canvas);

    list.primitives.push(Primitive::Grid {
        cell_size: cell,
        color: GRID_LINE_COLOR.to_string(),
    });

    // Tiles first, pushers on top of them, players last
    for obstacle in &state.obstacles {
        match &obstacle.kind {
            ObstacleKind::Wall => tile(&mut list, obstacle, cell, WALL_COLOR),
            ObstacleKind::Shrinker => tile(&mut list, obstacle, cell, SHRINKER_COLOR),
            ObstacleKind::Finish => finish(&mut list, obstacle.pos, cell),
            ObstacleKind::Pusher(_) => {}
        }
    }

    for pusher in state.pushers() {
        pusher_shapes(&mut list, pusher);
    }

    for body in state.players.iter().flatten() {
        body_shapes(&mut list, body, PLAYER_OUTLINE_WIDTH);
    }

    if state.is_solved() {
        list.banner = Some("You Win!");
    }

    list
}

/// Build the frame for the bouncing-squares demo
pub fn demo_draw_list(demo: &BounceDemo) -> DrawList {
    let mut list = DrawList::new(demo.canvas);
    for square in &demo.squares {
        body_shapes(&mut list, square, DEMO_OUTLINE_WIDTH);
    }
    list
}

fn tile(list: &mut DrawList, obstacle: &Obstacle, cell: f64, default_color: &str) {
    let rect = Rect::square(obstacle.pos, cell);
    list.fill(rect, obstacle.color.as_deref().unwrap_or(default_color));
    list.stroke(rect, TILE_OUTLINE_COLOR, 1.0);
}

/// Two-by-two checkerboard, light squares top-right and bottom-left
fn finish(list: &mut DrawList, pos: DVec2, cell: f64) {
    let half = cell / 2.0;
    for i in 0..2 {
        for j in 0..2 {
            let color = if i != j { CHECKER_LIGHT } else { CHECKER_DARK };
            let origin = pos + DVec2::new(i as f64 * half, j as f64 * half);
            list.fill(Rect::square(origin, half), color);
        }
    }
    list.stroke(Rect::square(pos, cell), TILE_OUTLINE_COLOR, 1.0);
}

fn pusher_shapes(list: &mut DrawList, pusher: &Pusher) {
    let base = Rect::square(pusher.pos, pusher.cell_size());
    list.fill(base, PUSHER_COLOR);
    if pusher.extension > 0.0 {
        list.fill(pusher.arm(), PUSHER_ARM_COLOR);
    }
    list.primitives.push(Primitive::Glyph {
        text: pusher.direction.arrow(),
        center: base.center(),
        color: ARROW_COLOR.to_string(),
        font_px: ARROW_FONT_PX,
    });
}

fn body_shapes(list: &mut DrawList, body: &Body, outline: f64) {
    let rect = body.bounds();
    list.fill(rect, body.color.as_str());
    list.stroke(rect, "white", outline);
}
