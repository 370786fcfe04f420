//! Built-in maze level
//!
//! Five horizontal wall bands that alternate between the left and right side
//! of the board, a row of pushers under each band, four finish tiles and a
//! cluster of players in the bottom-right.

use glam::{DVec2, IVec2};

use super::pusher::{Direction, Pusher};
use super::state::{Obstacle, SimPhase, SimulationState};

/// Wall layout, one string per row; `#` is a wall cell
const MAZE: [&str; 45] = [
    "",
    "",
    "",
    "",
    "",
    "      ##########################",
    "      ##########################",
    "      ##########################",
    "      ##########################",
    "",
    "",
    "",
    "",
    "",
    "##########################   ",
    "##########################   ",
    "##########################   ",
    "##########################   ",
    "",
    "",
    "",
    "",
    "",
    "      ##########################",
    "      ##########################",
    "      ##########################",
    "      ##########################",
    "",
    "",
    "",
    "",
    "",
    "##########################   ",
    "##########################   ",
    "##########################   ",
    "##########################   ",
    "",
    "",
    "",
    "",
    "",
    "      ##########################",
    "      ##########################",
    "      ##########################",
    "      ##########################",
];

/// First column and row of each group of four pushers
const PUSHER_GROUPS: [(i32, i32); 5] = [(6, 9), (22, 18), (6, 27), (22, 36), (6, 45)];
const PUSHERS_PER_GROUP: i32 = 4;
const PUSHER_LENGTH: u32 = 4;
const PUSHER_SPEED: f64 = 0.2;

const FINISH_CELLS: [(i32, i32); 4] = [(15, 15), (15, 30), (30, 15), (30, 30)];
const PLAYER_CELLS: [(i32, i32); 4] = [(35, 35), (35, 36), (36, 35), (36, 36)];

/// Wall cells of the maze in row-major order
pub fn maze_walls() -> impl Iterator<Item = IVec2> {
    MAZE.iter().enumerate().flat_map(|(row, line)| {
        line.bytes()
            .enumerate()
            .filter(|&(_, b)| b == b'#')
            .map(move |(col, _)| IVec2::new(col as i32, row as i32))
    })
}

/// Replace the level's obstacles with the maze
///
/// Players already on the board are kept; otherwise four are placed. The
/// tiles are laid down as-is without occupancy checks.
pub fn load_premade(state: &mut SimulationState) {
    state.obstacles.clear();
    state.phase = SimPhase::Editing;

    for cell in maze_walls() {
        state.obstacles.push(Obstacle::wall(state.cell_origin(cell)));
    }

    let cell_size = state.cell_size();
    for (x, y) in PUSHER_GROUPS {
        for dx in 0..PUSHERS_PER_GROUP {
            let pos = state.cell_origin(IVec2::new(x + dx, y));
            let pusher = Pusher::new(pos, Direction::South, PUSHER_LENGTH, PUSHER_SPEED, cell_size);
            state.obstacles.push(Obstacle::pusher(pusher));
        }
    }

    for (x, y) in FINISH_CELLS {
        state.obstacles.push(Obstacle::finish(state.cell_origin(IVec2::new(x, y))));
    }

    if !state.has_players() {
        for (slot, (x, y)) in PLAYER_CELLS.into_iter().enumerate() {
            let pos: DVec2 = state.cell_origin(IVec2::new(x, y));
            state.spawn_player(slot, pos);
        }
    }

    log::info!(
        "Premade level loaded ({} obstacles, {} players)",
        state.obstacles.len(),
        state.players.iter().flatten().count()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GridPreset;
    use crate::sim::state::ObstacleKind;

    fn small_state() -> SimulationState {
        SimulationState::new(GridPreset::Small, DVec2::new(288.0, 512.0), 3)
    }

    fn count(state: &SimulationState, pred: impl Fn(&ObstacleKind) -> bool) -> usize {
        state.obstacles.iter().filter(|o| pred(&o.kind)).count()
    }

    #[test]
    fn test_maze_has_five_bands() {
        // 3 right bands of 26 cells and 2 left bands of 26 cells, 4 rows each
        assert_eq!(maze_walls().count(), 5 * 4 * 26);
        let first = maze_walls().next().unwrap();
        assert_eq!(first, IVec2::new(6, 5));
    }

    #[test]
    fn test_load_premade_builds_level() {
        let mut state = small_state();
        load_premade(&mut state);

        assert_eq!(count(&state, |k| matches!(k, ObstacleKind::Wall)), 520);
        assert_eq!(count(&state, |k| matches!(k, ObstacleKind::Finish)), 4);
        assert_eq!(count(&state, |k| matches!(k, ObstacleKind::Pusher(_))), 20);

        for pusher in state.pushers() {
            assert_eq!(pusher.direction, Direction::South);
            assert_eq!(pusher.length, 4);
            assert_eq!(pusher.speed, 0.2);
            assert_eq!(pusher.max_extension(), 64.0);
        }

        let last = state.pushers().last().unwrap();
        assert_eq!(last.pos, DVec2::new(9.0 * 16.0, 45.0 * 16.0));

        assert_eq!(state.players.len(), 4);
        let body = state.players[3].as_ref().unwrap();
        assert_eq!(body.pos, DVec2::new(36.0 * 16.0, 36.0 * 16.0));
        assert_eq!(body.color, "#FFFF00");
    }

    #[test]
    fn test_load_premade_keeps_existing_players() {
        let mut state = small_state();
        state.spawn_player(0, DVec2::new(16.0, 16.0));
        state.obstacles.push(Obstacle::shrinker(DVec2::new(48.0, 48.0)));
        state.phase = SimPhase::Solved;

        load_premade(&mut state);
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.players[0].as_ref().unwrap().pos, DVec2::new(16.0, 16.0));
        assert_eq!(count(&state, |k| matches!(k, ObstacleKind::Shrinker)), 0);
        assert_eq!(state.phase, SimPhase::Editing);
    }
}
