//! Level editing and simulation control
//!
//! Every button and mouse action in the editor becomes a [`Command`] applied
//! to the state by [`apply`]. Rejected commands leave the state untouched.

use std::fmt;

use glam::{DVec2, IVec2};

use super::premade::load_premade;
use super::pusher::{Direction, Pusher};
use super::state::{Obstacle, SimPhase, SimulationState};
use crate::consts::*;
use crate::persistence::LevelData;
use crate::settings::GridPreset;

/// What a placement puts down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceKind {
    Wall,
    Finish,
    Shrinker,
    /// A pusher built from the current brush
    Pusher,
    /// The player square for a slot
    Player(usize),
}

/// An editor action
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PlaceObject { kind: PlaceKind, cell: IVec2 },
    SetDirection(Direction),
    /// Clamped to 1..=99 cells
    SetPusherLength(u32),
    SetPusherSpeed(f64),
    /// Clamped to 1..=6; drops every placed player
    SetPlayerCount(usize),
    /// Switch grid preset and clear the board
    SetGridSize { preset: GridPreset, canvas: DVec2 },
    /// Container resized; the board is kept
    Resize { canvas: DVec2 },
    /// Remove all obstacles, keep players
    Clear,
    StartSimulation,
    PauseSimulation,
    ToggleSimulation,
    /// Switch to the small grid and build the maze
    LoadPremade { canvas: DVec2 },
    LoadLevel(LevelData),
}

/// Why a command was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    OutOfBounds,
    CellOccupied,
    InvalidPlayerSlot(usize),
    PlayerAlreadyPlaced(usize),
    SimulationRunning,
    NoPlayers,
    AlreadySolved,
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::OutOfBounds => write!(f, "cell is outside the canvas"),
            EditError::CellOccupied => write!(f, "cell already holds an object"),
            EditError::InvalidPlayerSlot(slot) => write!(f, "no player slot {}", slot + 1),
            EditError::PlayerAlreadyPlaced(slot) => {
                write!(f, "player {} is already on the board", slot + 1)
            }
            EditError::SimulationRunning => write!(f, "pause the simulation first"),
            EditError::NoPlayers => write!(f, "place at least one player first"),
            EditError::AlreadySolved => write!(f, "level is solved; clear it to play again"),
        }
    }
}

impl std::error::Error for EditError {}

/// Apply one command to the state
pub fn apply(state: &mut SimulationState, command: Command) -> Result<(), EditError> {
    let result = match command {
        Command::PlaceObject { kind, cell } => place(state, kind, cell),
        Command::SetDirection(direction) => {
            state.brush.direction = direction;
            Ok(())
        }
        Command::SetPusherLength(length) => {
            state.brush.length = length.clamp(MIN_PUSHER_LENGTH, MAX_PUSHER_LENGTH);
            Ok(())
        }
        Command::SetPusherSpeed(speed) => {
            if speed.is_finite() && speed >= 0.0 {
                state.brush.speed = speed;
            }
            Ok(())
        }
        Command::SetPlayerCount(count) => {
            state.players = vec![None; count.clamp(1, MAX_PLAYERS)];
            Ok(())
        }
        Command::SetGridSize { preset, canvas } => {
            ensure_stopped(state).map(|()| {
                switch_grid(state, preset, canvas);
                state.players.iter_mut().for_each(|slot| *slot = None);
                log::info!("Grid set to {}", preset.as_str());
            })
        }
        Command::Resize { canvas } => {
            state.canvas = canvas;
            Ok(())
        }
        Command::Clear => ensure_stopped(state).map(|()| {
            state.clear_obstacles();
            log::info!("Level cleared");
        }),
        Command::StartSimulation => start(state),
        Command::PauseSimulation => {
            pause(state);
            Ok(())
        }
        Command::ToggleSimulation => {
            if state.is_running() {
                pause(state);
                Ok(())
            } else {
                start(state)
            }
        }
        Command::LoadPremade { canvas } => ensure_stopped(state).map(|()| {
            if state.grid != GridPreset::Small {
                switch_grid(state, GridPreset::Small, canvas);
            }
            load_premade(state);
        }),
        Command::LoadLevel(level) => ensure_stopped(state).map(|()| level.apply(state)),
    };

    match &result {
        // Dragging a brush across the board hits these constantly
        Err(err @ (EditError::OutOfBounds | EditError::CellOccupied)) => {
            log::debug!("Placement rejected: {}", err)
        }
        Err(err) => log::warn!("Command rejected: {}", err),
        Ok(()) => {}
    }
    result
}

fn ensure_stopped(state: &SimulationState) -> Result<(), EditError> {
    if state.is_running() {
        Err(EditError::SimulationRunning)
    } else {
        Ok(())
    }
}

fn switch_grid(state: &mut SimulationState, preset: GridPreset, canvas: DVec2) {
    state.grid = preset;
    state.canvas = canvas;
    state.obstacles.clear();
    state.phase = SimPhase::Editing;
}

fn start(state: &mut SimulationState) -> Result<(), EditError> {
    if state.is_solved() {
        return Err(EditError::AlreadySolved);
    }
    if !state.has_players() {
        return Err(EditError::NoPlayers);
    }
    if !state.is_running() {
        state.phase = SimPhase::Running;
        log::info!("Simulation started");
    }
    Ok(())
}

fn pause(state: &mut SimulationState) {
    if state.is_running() {
        state.phase = SimPhase::Paused;
        log::info!("Simulation paused after {} ticks", state.time_ticks);
    }
}

/// Placement works in any phase; only the obstacle layer is checked for overlap
fn place(state: &mut SimulationState, kind: PlaceKind, cell: IVec2) -> Result<(), EditError> {
    let pos = state.cell_origin(cell);
    if !state.in_canvas(pos) {
        return Err(EditError::OutOfBounds);
    }
    if state.is_occupied(pos) {
        return Err(EditError::CellOccupied);
    }

    let obstacle = match kind {
        PlaceKind::Wall => Obstacle::wall(pos),
        PlaceKind::Finish => Obstacle::finish(pos),
        PlaceKind::Shrinker => Obstacle::shrinker(pos),
        PlaceKind::Pusher => {
            let brush = state.brush;
            Obstacle::pusher(Pusher::new(
                pos,
                brush.direction,
                brush.length,
                brush.speed,
                state.cell_size(),
            ))
        }
        PlaceKind::Player(slot) => {
            match state.players.get(slot) {
                None => return Err(EditError::InvalidPlayerSlot(slot)),
                Some(Some(_)) => return Err(EditError::PlayerAlreadyPlaced(slot)),
                Some(None) => {}
            }
            state.spawn_player(slot, pos);
            log::debug!("Player {} placed at {}", slot + 1, cell);
            return Ok(());
        }
    };

    log::debug!("Placed {:?} at {}", kind, cell);
    state.obstacles.push(obstacle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ObstacleKind;
    use crate::sim::tick::tick;

    fn state() -> SimulationState {
        SimulationState::new(GridPreset::Small, DVec2::new(288.0, 512.0), 99)
    }

    fn place_at(state: &mut SimulationState, kind: PlaceKind, x: i32, y: i32) -> Result<(), EditError> {
        apply(
            state,
            Command::PlaceObject {
                kind,
                cell: IVec2::new(x, y),
            },
        )
    }

    #[test]
    fn test_place_snaps_to_cell_origin() {
        let mut s = state();
        place_at(&mut s, PlaceKind::Wall, 2, 3).unwrap();
        assert_eq!(s.obstacles[0].pos, DVec2::new(32.0, 48.0));
        assert_eq!(s.obstacles[0].color.as_deref(), Some(WALL_COLOR));
    }

    #[test]
    fn test_place_on_occupied_cell_fails() {
        let mut s = state();
        place_at(&mut s, PlaceKind::Shrinker, 1, 1).unwrap();
        assert_eq!(place_at(&mut s, PlaceKind::Wall, 1, 1), Err(EditError::CellOccupied));
        assert_eq!(s.obstacles.len(), 1);
    }

    #[test]
    fn test_place_outside_canvas_fails() {
        let mut s = state();
        assert_eq!(place_at(&mut s, PlaceKind::Wall, -1, 0), Err(EditError::OutOfBounds));
        assert_eq!(place_at(&mut s, PlaceKind::Wall, 18, 0), Err(EditError::OutOfBounds));
        assert_eq!(place_at(&mut s, PlaceKind::Wall, 0, 32), Err(EditError::OutOfBounds));
        assert!(s.obstacles.is_empty());
    }

    #[test]
    fn test_pusher_uses_brush() {
        let mut s = state();
        apply(&mut s, Command::SetDirection(Direction::West)).unwrap();
        apply(&mut s, Command::SetPusherLength(250)).unwrap();
        apply(&mut s, Command::SetPusherSpeed(1.5)).unwrap();
        apply(&mut s, Command::SetPusherSpeed(f64::NAN)).unwrap();
        place_at(&mut s, PlaceKind::Pusher, 5, 5).unwrap();

        let pusher = s.pushers().next().unwrap();
        assert_eq!(pusher.direction, Direction::West);
        assert_eq!(pusher.length, MAX_PUSHER_LENGTH);
        assert_eq!(pusher.speed, 1.5);
        assert_eq!(pusher.max_extension(), 99.0 * 16.0);
    }

    #[test]
    fn test_player_placement_rules() {
        let mut s = state();
        assert_eq!(
            place_at(&mut s, PlaceKind::Player(1), 0, 0),
            Err(EditError::InvalidPlayerSlot(1))
        );
        place_at(&mut s, PlaceKind::Player(0), 4, 4).unwrap();
        assert_eq!(
            place_at(&mut s, PlaceKind::Player(0), 6, 6),
            Err(EditError::PlayerAlreadyPlaced(0))
        );
        assert_eq!(s.players[0].as_ref().unwrap().pos, DVec2::new(64.0, 64.0));
    }

    #[test]
    fn test_set_player_count_resets_slots() {
        let mut s = state();
        place_at(&mut s, PlaceKind::Player(0), 4, 4).unwrap();
        apply(&mut s, Command::SetPlayerCount(3)).unwrap();
        assert_eq!(s.players, vec![None, None, None]);
        apply(&mut s, Command::SetPlayerCount(0)).unwrap();
        assert_eq!(s.players.len(), 1);
        apply(&mut s, Command::SetPlayerCount(12)).unwrap();
        assert_eq!(s.players.len(), MAX_PLAYERS);
    }

    #[test]
    fn test_start_requires_players() {
        let mut s = state();
        assert_eq!(apply(&mut s, Command::StartSimulation), Err(EditError::NoPlayers));
        assert_eq!(s.phase, SimPhase::Editing);

        place_at(&mut s, PlaceKind::Player(0), 4, 4).unwrap();
        apply(&mut s, Command::ToggleSimulation).unwrap();
        assert!(s.is_running());
        apply(&mut s, Command::ToggleSimulation).unwrap();
        assert_eq!(s.phase, SimPhase::Paused);
    }

    #[test]
    fn test_edits_blocked_while_running() {
        let mut s = state();
        place_at(&mut s, PlaceKind::Player(0), 4, 4).unwrap();
        place_at(&mut s, PlaceKind::Wall, 8, 8).unwrap();
        apply(&mut s, Command::StartSimulation).unwrap();

        assert_eq!(apply(&mut s, Command::Clear), Err(EditError::SimulationRunning));
        assert_eq!(
            apply(
                &mut s,
                Command::SetGridSize {
                    preset: GridPreset::Medium,
                    canvas: DVec2::new(378.0, 672.0)
                }
            ),
            Err(EditError::SimulationRunning)
        );
        assert_eq!(s.obstacles.len(), 1);
        assert_eq!(s.grid, GridPreset::Small);

        // Placing is still allowed mid-run
        place_at(&mut s, PlaceKind::Wall, 9, 9).unwrap();
    }

    #[test]
    fn test_clear_keeps_players_and_resets_solved() {
        let mut s = state();
        place_at(&mut s, PlaceKind::Player(0), 4, 4).unwrap();
        place_at(&mut s, PlaceKind::Finish, 4, 4).unwrap();
        apply(&mut s, Command::StartSimulation).unwrap();
        tick(&mut s, 1.0);
        assert!(s.is_solved());
        assert_eq!(apply(&mut s, Command::StartSimulation), Err(EditError::AlreadySolved));

        apply(&mut s, Command::Clear).unwrap();
        assert!(s.obstacles.is_empty());
        assert!(s.players[0].is_some());
        assert_eq!(s.phase, SimPhase::Editing);
        apply(&mut s, Command::StartSimulation).unwrap();
    }

    #[test]
    fn test_grid_change_clears_everything() {
        let mut s = state();
        place_at(&mut s, PlaceKind::Player(0), 4, 4).unwrap();
        place_at(&mut s, PlaceKind::Wall, 1, 1).unwrap();
        let canvas = DVec2::new(378.0, 672.0);
        apply(
            &mut s,
            Command::SetGridSize {
                preset: GridPreset::Medium,
                canvas,
            },
        )
        .unwrap();

        assert_eq!(s.grid, GridPreset::Medium);
        assert_eq!(s.canvas, canvas);
        assert_eq!(s.cell_size(), 14.0);
        assert!(s.obstacles.is_empty());
        assert_eq!(s.players, vec![None]);
    }

    #[test]
    fn test_premade_switches_to_small_grid() {
        let mut s = SimulationState::new(GridPreset::Medium, DVec2::new(378.0, 672.0), 5);
        let canvas = DVec2::new(288.0, 512.0);
        apply(&mut s, Command::LoadPremade { canvas }).unwrap();

        assert_eq!(s.grid, GridPreset::Small);
        assert_eq!(s.canvas, canvas);
        assert!(s.obstacles.iter().any(|o| matches!(o.kind, ObstacleKind::Pusher(_))));
        assert_eq!(s.players.iter().flatten().count(), 4);
    }

    #[test]
    fn test_load_level_replaces_obstacles() {
        let mut s = state();
        place_at(&mut s, PlaceKind::Wall, 1, 1).unwrap();
        let level: LevelData = serde_json::from_str(
            r#"{"walls": [], "finishLines": [{"x": 32, "y": 32}], "shrinkers": []}"#,
        )
        .unwrap();
        apply(&mut s, Command::LoadLevel(level)).unwrap();
        assert_eq!(s.obstacles.len(), 1);
        assert!(matches!(s.obstacles[0].kind, ObstacleKind::Finish));
    }

    #[test]
    fn test_load_level_after_solve_can_start() {
        let mut s = state();
        place_at(&mut s, PlaceKind::Player(0), 4, 4).unwrap();
        place_at(&mut s, PlaceKind::Finish, 4, 4).unwrap();
        apply(&mut s, Command::StartSimulation).unwrap();
        tick(&mut s, 1.0);
        assert!(s.is_solved());

        let level: LevelData = serde_json::from_str(
            r#"{"walls": [{"x": 0, "y": 0}], "finishLines": [{"x": 256, "y": 480}], "shrinkers": []}"#,
        )
        .unwrap();
        apply(&mut s, Command::LoadLevel(level)).unwrap();
        assert_eq!(s.phase, SimPhase::Editing);
        assert!(s.players[0].is_some());
        apply(&mut s, Command::StartSimulation).unwrap();
        assert!(s.is_running());
    }

    #[test]
    fn test_edit_error_messages() {
        assert_eq!(EditError::PlayerAlreadyPlaced(2).to_string(), "player 3 is already on the board");
        assert_eq!(EditError::CellOccupied.to_string(), "cell already holds an object");
    }
}
