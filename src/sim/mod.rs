//! Deterministic simulation module
//!
//! All sandbox logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (placement order for obstacles, slot order for players)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod command;
pub mod elastic;
pub mod geometry;
pub mod premade;
pub mod pusher;
pub mod state;
pub mod tick;

pub use body::Body;
pub use collision::{Arena, Contacts, update_body};
pub use command::{Command, EditError, PlaceKind, apply};
pub use elastic::{BounceDemo, check_collisions, resolve_elastic_pair};
pub use geometry::Rect;
pub use premade::load_premade;
pub use pusher::{Direction, Pusher};
pub use state::{
    Obstacle, ObstacleKind, PusherBrush, RngState, SimEvent, SimPhase, SimulationState,
};
pub use tick::{step, tick};
