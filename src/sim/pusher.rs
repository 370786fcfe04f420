//! Pushers: grid cells with an arm that oscillates along one cardinal direction
//!
//! The arm grows from the base cell at `speed` pixels per tick until it is
//! `length` cells long, then retracts back to nothing, forever. The stored
//! extension never leaves `[0, max_extension]`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// Facing direction of a pusher arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "north" | "n" | "up" => Some(Direction::North),
            "south" | "s" | "down" => Some(Direction::South),
            "east" | "e" | "right" => Some(Direction::East),
            "west" | "w" | "left" => Some(Direction::West),
            _ => None,
        }
    }

    /// Arrow glyph drawn on the pusher base
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::North => "↑",
            Direction::South => "↓",
            Direction::East => "→",
            Direction::West => "←",
        }
    }
}

/// An oscillating obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pusher {
    /// Top-left corner of the base cell
    pub pos: DVec2,
    pub direction: Direction,
    /// Arm length in cells
    pub length: u32,
    /// Arm speed in pixels per tick
    pub speed: f64,
    /// Current arm extension in pixels
    pub extension: f64,
    pub extending: bool,
    cell_size: f64,
}

impl Pusher {
    pub fn new(pos: DVec2, direction: Direction, length: u32, speed: f64, cell_size: f64) -> Self {
        Self {
            pos,
            direction,
            length,
            speed,
            extension: 0.0,
            extending: true,
            cell_size,
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Fully extended arm length in pixels
    pub fn max_extension(&self) -> f64 {
        self.length as f64 * self.cell_size
    }

    /// Move the arm one step, flipping direction at either bound
    pub fn update(&mut self, dt: f64) {
        let max = self.max_extension();
        // Negative or NaN speeds leave the arm where it is
        let step = self.speed.max(0.0) * dt;
        if self.extending {
            let next = self.extension + step;
            if next >= max {
                self.extension = max;
                self.extending = false;
            } else {
                self.extension = next;
            }
        } else {
            let next = self.extension - step;
            if next <= 0.0 {
                self.extension = 0.0;
                self.extending = true;
            } else {
                self.extension = next;
            }
        }
        self.extension = self.extension.clamp(0.0, max);
    }

    /// Base cell plus the arm in the facing direction
    pub fn bounds(&self) -> Rect {
        let cell = self.cell_size;
        let e = self.extension;
        let (x, y) = (self.pos.x, self.pos.y);
        match self.direction {
            Direction::North => Rect::new(x, y - e, cell, cell + e),
            Direction::South => Rect::new(x, y, cell, cell + e),
            Direction::East => Rect::new(x, y, cell + e, cell),
            Direction::West => Rect::new(x - e, y, cell + e, cell),
        }
    }

    /// The arm alone (empty when retracted), for drawing
    pub fn arm(&self) -> Rect {
        let cell = self.cell_size;
        let e = self.extension;
        let (x, y) = (self.pos.x, self.pos.y);
        match self.direction {
            Direction::North => Rect::new(x, y - e, cell, e),
            Direction::South => Rect::new(x, y + cell, cell, e),
            Direction::East => Rect::new(x + cell, y, e, cell),
            Direction::West => Rect::new(x - e, y, e, cell),
        }
    }
}
