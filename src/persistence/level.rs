//! Saved level schema
//!
//! The JSON shape matches what earlier builds of the editor wrote to
//! LocalStorage, so old saves keep loading:
//!
//! ```json
//! { "walls": [{"x":0,"y":0,"color":"gray"}], "finishLines": [{"x":16,"y":0}],
//!   "shrinkers": [], "pushers": [{"x":32,"y":0,"direction":"south","length":3,"speed":0.5}],
//!   "playerPositions": [{"x":48,"y":0,"color":"#FF0000"}, null] }
//! ```

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_PUSHER_SPEED, PLAYER_SPEED};
use crate::sim::{Body, Direction, Obstacle, ObstacleKind, Pusher, SimulationState};

/// A single-cell obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileData {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A pusher as placed (arm state is not saved)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PusherData {
    pub x: f64,
    pub y: f64,
    pub direction: Direction,
    pub length: u32,
    pub speed: f64,
}

/// A player square's position and color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub x: f64,
    pub y: f64,
    pub color: String,
}

/// Everything needed to rebuild a level
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub walls: Vec<TileData>,
    pub finish_lines: Vec<TileData>,
    pub shrinkers: Vec<TileData>,
    #[serde(default)]
    pub pushers: Vec<PusherData>,
    /// One entry per player slot; absent in saves that predate players
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_positions: Option<Vec<Option<PlayerData>>>,
}

impl TileData {
    fn from_obstacle(obstacle: &Obstacle) -> Self {
        Self {
            x: obstacle.pos.x,
            y: obstacle.pos.y,
            color: obstacle.color.clone(),
        }
    }

    fn pos(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

impl LevelData {
    /// Snapshot the level as it currently stands (players at their live positions)
    pub fn capture(state: &SimulationState) -> Self {
        let mut level = Self::default();

        for obstacle in &state.obstacles {
            match &obstacle.kind {
                ObstacleKind::Wall => level.walls.push(TileData::from_obstacle(obstacle)),
                ObstacleKind::Finish => level.finish_lines.push(TileData::from_obstacle(obstacle)),
                ObstacleKind::Shrinker => level.shrinkers.push(TileData::from_obstacle(obstacle)),
                ObstacleKind::Pusher(pusher) => level.pushers.push(PusherData {
                    x: pusher.pos.x,
                    y: pusher.pos.y,
                    direction: pusher.direction,
                    length: pusher.length,
                    speed: pusher.speed,
                }),
            }
        }

        level.player_positions = Some(
            state
                .players
                .iter()
                .map(|slot| {
                    slot.as_ref().map(|body| PlayerData {
                        x: body.pos.x,
                        y: body.pos.y,
                        color: body.color.clone(),
                    })
                })
                .collect(),
        );

        level
    }

    /// Replace the state's obstacles (and players, if saved) with this level
    ///
    /// Pushers start retracted and players get a fresh full-size body with a
    /// new random heading. A solved level goes back to editing, and pusher
    /// speeds that are negative or not finite fall back to the default.
    pub fn apply(&self, state: &mut SimulationState) {
        let cell_size = state.cell_size();
        let mut obstacles = Vec::with_capacity(
            self.walls.len() + self.finish_lines.len() + self.shrinkers.len() + self.pushers.len(),
        );

        for tile in &self.walls {
            obstacles.push(Obstacle {
                pos: tile.pos(),
                kind: ObstacleKind::Wall,
                color: tile.color.clone(),
            });
        }
        for tile in &self.finish_lines {
            obstacles.push(Obstacle {
                pos: tile.pos(),
                kind: ObstacleKind::Finish,
                color: tile.color.clone(),
            });
        }
        for tile in &self.shrinkers {
            obstacles.push(Obstacle {
                pos: tile.pos(),
                kind: ObstacleKind::Shrinker,
                color: tile.color.clone(),
            });
        }
        for p in &self.pushers {
            let speed = if p.speed.is_finite() && p.speed >= 0.0 {
                p.speed
            } else {
                log::warn!(
                    "Pusher at ({}, {}) has invalid speed {}, using {}",
                    p.x,
                    p.y,
                    p.speed,
                    DEFAULT_PUSHER_SPEED
                );
                DEFAULT_PUSHER_SPEED
            };
            let pusher = Pusher::new(DVec2::new(p.x, p.y), p.direction, p.length, speed, cell_size);
            obstacles.push(Obstacle::pusher(pusher));
        }
        state.clear_obstacles();
        state.obstacles = obstacles;

        if let Some(players) = &self.player_positions {
            state.players = players
                .iter()
                .map(|slot| {
                    slot.as_ref().map(|p| {
                        let angle = state.rng_state.next_angle();
                        Body::new(DVec2::new(p.x, p.y), cell_size, angle, PLAYER_SPEED, p.color.clone())
                    })
                })
                .collect();
        }

        log::info!(
            "Level loaded: {} walls, {} finish tiles, {} shrinkers, {} pushers",
            self.walls.len(),
            self.finish_lines.len(),
            self.shrinkers.len(),
            self.pushers.len()
        );
    }

    /// Number of placed players in the save
    pub fn player_count(&self) -> usize {
        self.player_positions
            .as_ref()
            .map(|slots| slots.iter().flatten().count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GridPreset;

    const SAVED: &str = r##"{
        "walls": [{"x": 0, "y": 0, "color": "gray"}, {"x": 16, "y": 0, "color": "gray"}],
        "finishLines": [{"x": 160, "y": 320}],
        "shrinkers": [{"x": 64, "y": 64, "color": "blue"}],
        "pushers": [{"x": 96, "y": 96, "direction": "east", "length": 3, "speed": 0.5}],
        "playerPositions": [{"x": 32, "y": 48, "color": "#FF0000"}, null]
    }"##;

    fn state() -> SimulationState {
        SimulationState::new(GridPreset::Small, DVec2::new(320.0, 480.0), 1)
    }

    #[test]
    fn test_parse_saved_level() {
        let level: LevelData = serde_json::from_str(SAVED).unwrap();
        assert_eq!(level.walls.len(), 2);
        assert_eq!(level.finish_lines[0].color, None);
        assert_eq!(level.pushers[0].direction, Direction::East);
        assert_eq!(level.player_count(), 1);
    }

    #[test]
    fn test_missing_optional_sections() {
        let level: LevelData =
            serde_json::from_str(r#"{"walls": [], "finishLines": [], "shrinkers": []}"#).unwrap();
        assert!(level.pushers.is_empty());
        assert!(level.player_positions.is_none());

        // Players already on the board survive a load without player data
        let mut s = state();
        s.spawn_player(0, DVec2::new(16.0, 16.0));
        level.apply(&mut s);
        assert!(s.players[0].is_some());
    }

    #[test]
    fn test_apply_then_capture_reproduces_level() {
        let level: LevelData = serde_json::from_str(SAVED).unwrap();
        let mut s = state();
        level.apply(&mut s);

        assert_eq!(s.obstacles.len(), 5);
        assert_eq!(s.players.len(), 2);
        let body = s.players[0].as_ref().unwrap();
        assert_eq!(body.pos, DVec2::new(32.0, 48.0));
        assert_eq!(body.size, 16.0);
        assert_eq!(body.color, "#FF0000");

        let pusher = s.pushers().next().unwrap();
        assert_eq!(pusher.extension, 0.0);
        assert_eq!(pusher.max_extension(), 48.0);

        assert_eq!(LevelData::capture(&s), level);
    }

    #[test]
    fn test_invalid_pusher_speed_falls_back_to_default() {
        // serde_json cannot carry NaN, so only the negative case comes from JSON
        let json = r#"{"walls": [], "finishLines": [], "shrinkers": [],
            "pushers": [{"x": 96, "y": 96, "direction": "west", "length": 2, "speed": -4}]}"#;
        let mut level: LevelData = serde_json::from_str(json).unwrap();
        let mut s = state();
        level.apply(&mut s);
        assert_eq!(s.pushers().next().unwrap().speed, DEFAULT_PUSHER_SPEED);

        s.phase = crate::sim::SimPhase::Running;
        s.spawn_player(0, DVec2::new(16.0, 300.0));
        for _ in 0..200 {
            crate::sim::tick(&mut s, 1.0);
            let pusher = s.pushers().next().unwrap();
            assert!(pusher.extension >= 0.0);
            assert!(pusher.extension <= pusher.max_extension());
        }

        level.pushers[0].speed = f64::INFINITY;
        level.apply(&mut s);
        assert_eq!(s.pushers().next().unwrap().speed, DEFAULT_PUSHER_SPEED);
    }

    #[test]
    fn test_apply_leaves_solved_phase() {
        let level: LevelData = serde_json::from_str(SAVED).unwrap();
        let mut s = state();
        s.phase = crate::sim::SimPhase::Solved;
        level.apply(&mut s);
        assert_eq!(s.phase, crate::sim::SimPhase::Editing);
    }

    #[test]
    fn test_serialized_keys_match_saved_format() {
        let level: LevelData = serde_json::from_str(SAVED).unwrap();
        let json = serde_json::to_value(&level).unwrap();
        assert!(json.get("finishLines").is_some());
        assert!(json.get("playerPositions").is_some());
        assert_eq!(json["pushers"][0]["direction"], "east");
        assert!(json["finishLines"][0].get("color").is_none());
        assert!(json["playerPositions"][1].is_null());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn tile() -> impl Strategy<Value = TileData> {
            (0u32..40, 0u32..60, proptest::option::of("[a-z]{3,6}")).prop_map(|(x, y, color)| {
                TileData {
                    x: x as f64 * 16.0,
                    y: y as f64 * 16.0,
                    color,
                }
            })
        }

        fn pusher() -> impl Strategy<Value = PusherData> {
            (0u32..40, 0u32..60, 0usize..4, 1u32..99, 1u32..40).prop_map(
                |(x, y, dir, length, speed)| PusherData {
                    x: x as f64 * 16.0,
                    y: y as f64 * 16.0,
                    direction: Direction::ALL[dir],
                    length,
                    speed: speed as f64 * 0.25,
                },
            )
        }

        fn player() -> impl Strategy<Value = Option<PlayerData>> {
            proptest::option::of((0u32..2000, 0u32..2000, 0usize..6).prop_map(|(x, y, c)| {
                PlayerData {
                    x: x as f64 * 0.5,
                    y: y as f64 * 0.5,
                    color: crate::consts::PLAYER_COLORS[c].to_string(),
                }
            }))
        }

        proptest! {
            #[test]
            fn level_round_trips_through_json_and_state(
                walls in proptest::collection::vec(tile(), 0..20),
                finish_lines in proptest::collection::vec(tile(), 0..4),
                shrinkers in proptest::collection::vec(tile(), 0..6),
                pushers in proptest::collection::vec(pusher(), 0..6),
                players in proptest::collection::vec(player(), 1..7),
            ) {
                let level = LevelData {
                    walls,
                    finish_lines,
                    shrinkers,
                    pushers,
                    player_positions: Some(players),
                };

                let json = serde_json::to_string(&level).unwrap();
                let parsed: LevelData = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(&parsed, &level);

                let mut s = state();
                parsed.apply(&mut s);
                prop_assert_eq!(LevelData::capture(&s), level);
            }
        }
    }
}
