//! Simulation state and level data
//!
//! Everything the editor, the tick loop and the renderer share lives in one
//! [`SimulationState`] value. Nothing here is global.

use glam::{DVec2, IVec2};
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::geometry::Rect;
use super::pusher::{Direction, Pusher};
use crate::consts::*;
use crate::settings::GridPreset;

/// Current phase of the sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SimPhase {
    /// Placing objects, nothing moves
    #[default]
    Editing,
    /// Bodies and pushers advance every tick
    Running,
    /// Stopped mid-run; positions are kept
    Paused,
    /// A body reached a finish tile
    Solved,
}

/// Kinds of placed obstacles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Wall,
    Shrinker,
    Finish,
    Pusher(Pusher),
}

/// An obstacle occupying one grid cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Top-left corner of the cell in pixels
    pub pos: DVec2,
    pub kind: ObstacleKind,
    /// Display color carried through save/load
    #[serde(default)]
    pub color: Option<String>,
}

impl Obstacle {
    pub fn wall(pos: DVec2) -> Self {
        Self {
            pos,
            kind: ObstacleKind::Wall,
            color: Some(WALL_COLOR.to_string()),
        }
    }

    pub fn shrinker(pos: DVec2) -> Self {
        Self {
            pos,
            kind: ObstacleKind::Shrinker,
            color: Some(SHRINKER_COLOR.to_string()),
        }
    }

    pub fn finish(pos: DVec2) -> Self {
        Self {
            pos,
            kind: ObstacleKind::Finish,
            color: None,
        }
    }

    pub fn pusher(pusher: Pusher) -> Self {
        Self {
            pos: pusher.pos,
            kind: ObstacleKind::Pusher(pusher),
            color: None,
        }
    }

    /// Current collision bounds (pushers include their arm)
    pub fn bounds(&self, cell_size: f64) -> Rect {
        match &self.kind {
            ObstacleKind::Pusher(pusher) => pusher.bounds(),
            ObstacleKind::Wall | ObstacleKind::Shrinker | ObstacleKind::Finish => {
                Rect::square(self.pos, cell_size)
            }
        }
    }
}

/// Something the UI may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Player in `slot` passed over a shrinker
    Shrunk { slot: usize },
    /// Player in `slot` reached a finish tile
    Solved { slot: usize },
}

/// RNG state wrapper for serialization
///
/// Each draw uses a fresh PCG stream so the state stays two plain integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }

    /// Uniform random heading in `[0, 2π)`
    pub fn next_angle(&mut self) -> f64 {
        let angle = self.to_rng().random_range(0.0..std::f64::consts::TAU);
        self.stream = self.stream.wrapping_add(1);
        angle
    }
}

/// Template for the next pusher placed by the editor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PusherBrush {
    pub direction: Direction,
    pub length: u32,
    pub speed: f64,
}

impl Default for PusherBrush {
    fn default() -> Self {
        Self {
            direction: Direction::North,
            length: DEFAULT_PUSHER_LENGTH,
            speed: DEFAULT_PUSHER_SPEED,
        }
    }
}

/// Complete sandbox state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub grid: GridPreset,
    /// Canvas extent in pixels (a multiple of the cell size)
    pub canvas: DVec2,
    pub phase: SimPhase,
    /// Ticks advanced while running
    pub time_ticks: u64,
    pub rng_state: RngState,
    /// Placed obstacles in placement order
    pub obstacles: Vec<Obstacle>,
    /// One entry per player slot; `None` until placed
    pub players: Vec<Option<Body>>,
    pub brush: PusherBrush,
    /// Events raised since the last drain (not persisted)
    #[serde(skip)]
    pub events: Vec<SimEvent>,
}

impl SimulationState {
    /// Empty level with one player slot
    pub fn new(grid: GridPreset, canvas: DVec2, seed: u64) -> Self {
        Self {
            grid,
            canvas,
            phase: SimPhase::Editing,
            time_ticks: 0,
            rng_state: RngState::new(seed),
            obstacles: Vec::new(),
            players: vec![None],
            brush: PusherBrush::default(),
            events: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.grid.cell_size()
    }

    pub fn is_solved(&self) -> bool {
        self.phase == SimPhase::Solved
    }

    pub fn is_running(&self) -> bool {
        self.phase == SimPhase::Running
    }

    /// Grid cell (column, row) containing a canvas point
    pub fn cell_of(&self, point: DVec2) -> IVec2 {
        (point / self.cell_size()).floor().as_ivec2()
    }

    /// Top-left corner of a grid cell in pixels
    pub fn cell_origin(&self, cell: IVec2) -> DVec2 {
        cell.as_dvec2() * self.cell_size()
    }

    /// True if the cell's top-left corner lies inside the canvas
    pub fn in_canvas(&self, cell: DVec2) -> bool {
        cell.x >= 0.0 && cell.y >= 0.0 && cell.x < self.canvas.x && cell.y < self.canvas.y
    }

    /// True if an obstacle already sits at this cell
    pub fn is_occupied(&self, cell: DVec2) -> bool {
        self.obstacles.iter().any(|o| o.pos == cell)
    }

    pub fn has_players(&self) -> bool {
        self.players.iter().any(Option::is_some)
    }

    /// Place a fresh player square of one cell with a random heading
    pub fn spawn_player(&mut self, slot: usize, pos: DVec2) {
        if slot >= self.players.len() {
            self.players.resize(slot + 1, None);
        }
        let angle = self.rng_state.next_angle();
        let color = PLAYER_COLORS[slot % MAX_PLAYERS];
        self.players[slot] = Some(Body::new(pos, self.cell_size(), angle, PLAYER_SPEED, color));
    }

    /// Pushers in placement order
    pub fn pushers(&self) -> impl Iterator<Item = &Pusher> {
        self.obstacles.iter().filter_map(|o| match &o.kind {
            ObstacleKind::Pusher(p) => Some(p),
            _ => None,
        })
    }

    /// Remove all obstacles and leave the solved state
    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
        if self.phase == SimPhase::Solved {
            self.phase = SimPhase::Editing;
        }
    }

    /// Take queued events, leaving the queue empty
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}
