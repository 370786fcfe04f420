//! Axis-aligned rectangle geometry
//!
//! Every collision in the sandbox is a test between two axis-aligned boxes:
//! - Rectangles are stored as top-left corner plus width/height (canvas coordinates, y down)
//! - Overlap is strict: rectangles that only share an edge do not overlap
//! - Overlap depth on an axis is the smaller of the two penetration distances

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// A square with its top-left corner at `pos`
    pub fn square(pos: DVec2, size: f64) -> Self {
        Self::new(pos.x, pos.y, size, size)
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict AABB overlap test
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Penetration depth on the X axis (only meaningful when overlapping)
    pub fn overlap_x(&self, other: &Rect) -> f64 {
        (self.right() - other.left()).min(other.right() - self.left())
    }

    /// Penetration depth on the Y axis (only meaningful when overlapping)
    pub fn overlap_y(&self, other: &Rect) -> f64 {
        (self.bottom() - other.top()).min(other.bottom() - self.top())
    }
}
