//! Fixed timestep simulation tick
//!
//! One tick moves every pusher arm, then updates each placed player in slot
//! order. A player sees the players before it already moved this tick and
//! the ones after it still at their previous positions.

use super::collision::{Arena, update_body};
use super::state::{ObstacleKind, SimEvent, SimPhase, SimulationState};

/// Advance the sandbox by one tick
///
/// `dt` scales movement; 1.0 is one nominal tick. Does nothing unless the
/// simulation is running, so a solved level stays frozen.
pub fn tick(state: &mut SimulationState, dt: f64) {
    if state.phase != SimPhase::Running {
        return;
    }

    state.time_ticks += 1;

    for obstacle in &mut state.obstacles {
        if let ObstacleKind::Pusher(pusher) = &mut obstacle.kind {
            pusher.update(dt);
        }
    }

    let cell_size = state.cell_size();
    for slot in 0..state.players.len() {
        // Lift the body out of its slot so it never collides with itself
        let Some(mut body) = state.players[slot].take() else {
            continue;
        };

        let arena = Arena {
            canvas: state.canvas,
            cell_size,
            obstacles: &state.obstacles,
            peers: &state.players,
        };
        let contacts = update_body(&mut body, dt, &arena);
        state.players[slot] = Some(body);

        if contacts.shrunk {
            log::debug!("Player {} shrank", slot + 1);
            state.events.push(SimEvent::Shrunk { slot });
        }
        if contacts.finished {
            log::info!(
                "Player {} reached the finish after {} ticks",
                slot + 1,
                state.time_ticks
            );
            state.phase = SimPhase::Solved;
            state.events.push(SimEvent::Solved { slot });
            break;
        }
    }
}

/// By-value form of [`tick`] for callers that keep immutable snapshots
pub fn step(mut state: SimulationState, dt: f64) -> SimulationState {
    tick(&mut state, dt);
    state
}
