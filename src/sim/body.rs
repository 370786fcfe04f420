//! Kinematic player squares
//!
//! A body moves in a straight line at a fixed speed. Collisions only ever
//! change the direction of travel, so every mutation of the velocity is
//! followed by [`Body::renormalize`].

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::{velocity_from_angle, with_speed};

/// A moving square
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner in canvas pixels
    pub pos: DVec2,
    /// Velocity in pixels per tick
    pub vel: DVec2,
    /// Side length in pixels
    pub size: f64,
    /// Constant speed magnitude
    pub speed: f64,
    /// Set once the body has passed over a shrinker
    #[serde(default)]
    pub shrunk: bool,
    /// CSS color used for drawing
    pub color: String,
}

impl Body {
    pub fn new(pos: DVec2, size: f64, angle: f64, speed: f64, color: impl Into<String>) -> Self {
        Self {
            pos,
            vel: velocity_from_angle(speed, angle),
            size,
            speed,
            shrunk: false,
            color: color.into(),
        }
    }

    /// Bounding box at the current position
    pub fn bounds(&self) -> Rect {
        Rect::square(self.pos, self.size)
    }

    pub fn center(&self) -> DVec2 {
        self.pos + DVec2::splat(self.size / 2.0)
    }

    /// Advance position by velocity, returning the pre-move position
    pub fn integrate(&mut self, dt: f64) -> DVec2 {
        let prev = self.pos;
        self.pos += self.vel * dt;
        prev
    }

    /// Restore `|vel| == speed` after an axis flip or sign change
    pub fn renormalize(&mut self) {
        self.vel = with_speed(self.vel, self.speed);
    }

    /// Halve the size the first time this is called; returns true if it shrank
    pub fn shrink(&mut self) -> bool {
        if self.shrunk {
            return false;
        }
        self.size *= 0.5;
        self.shrunk = true;
        true
    }
}
