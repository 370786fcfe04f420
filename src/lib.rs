//! Blocks Sandbox - a grid puzzle where bouncing squares race to the finish
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, pushers, collisions, level editing)
//! - `renderer`: Draw-list extraction (and 2D canvas painting on the web)
//! - `scheduler`: Fixed-step ticker driven by animation-frame timestamps
//! - `persistence`: Level save/load in the browser's LocalStorage format
//! - `settings`: Grid presets and editor preferences

pub mod persistence;
pub mod renderer;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use scheduler::Ticker;
pub use settings::{GridPreset, Settings};

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Fixed tick length in milliseconds (one 60 Hz animation frame)
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum ticks per rendered frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame gap the ticker will try to catch up on (ms)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Player square speed in pixels per tick
    pub const PLAYER_SPEED: f64 = 1.32;
    /// Maximum number of player slots
    pub const MAX_PLAYERS: usize = 6;
    /// Player colors, indexed by slot
    pub const PLAYER_COLORS: [&str; MAX_PLAYERS] = [
        "#FF0000", // Red
        "#00FF00", // Green
        "#0000FF", // Blue
        "#FFFF00", // Yellow
        "#FF00FF", // Magenta
        "#00FFFF", // Cyan
    ];

    /// Pusher brush defaults
    pub const DEFAULT_PUSHER_LENGTH: u32 = 3;
    pub const DEFAULT_PUSHER_SPEED: f64 = 0.5;
    pub const MIN_PUSHER_LENGTH: u32 = 1;
    pub const MAX_PUSHER_LENGTH: u32 = 99;

    /// Default obstacle colors
    pub const WALL_COLOR: &str = "gray";
    pub const SHRINKER_COLOR: &str = "blue";
    pub const PUSHER_COLOR: &str = "#e67e22";
    pub const PUSHER_ARM_COLOR: &str = "#f39c12";

    /// Bouncing-squares demo
    pub const DEMO_SPEED: f64 = 4.0;
    pub const DEMO_WIDTH: f64 = 1920.0;
    pub const DEMO_HEIGHT: f64 = 1080.0;
    pub const DEMO_SQUARE_SIZE: f64 = 100.0;

    /// Tolerance used when comparing speeds and distances
    pub const EPSILON: f64 = 1e-9;
}

/// Velocity of the given magnitude pointing along `angle` (radians)
#[inline]
pub fn velocity_from_angle(speed: f64, angle: f64) -> DVec2 {
    DVec2::new(speed * angle.cos(), speed * angle.sin())
}

/// Rotate a vector by `angle` radians (counter-clockwise in math coordinates)
#[inline]
pub fn rotate(v: DVec2, angle: f64) -> DVec2 {
    let (sin, cos) = angle.sin_cos();
    DVec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Rescale a velocity to `speed`, keeping its direction.
///
/// A zero vector has no direction; it is returned unchanged.
#[inline]
pub fn with_speed(v: DVec2, speed: f64) -> DVec2 {
    let magnitude = v.length();
    if magnitude > 0.0 {
        v / magnitude * speed
    } else {
        v
    }
}
