use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Contains Config properties which will be used by a world scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldConfig {
    /// Heightmap the terrain collaborator was built from
    pub map: String,
    pub flocks: u32,
    pub power_ups: u32,
    pub triggers: u32,
    /// Seconds until the round ends on its own
    pub round_time: f64,
    /// Edge length of the playable square, centered on the origin
    pub map_scale: f32,
    /// Spawn point of the local player on the ground plane (x, z)
    pub player_spawn: Vec2,
    /// Where the goal tree stands. Touching it wins the round
    pub goal_position: Vec3,
    pub goal_radius: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            map: "DinoIsland".to_string(),
            flocks: 0,
            power_ups: 0,
            triggers: 0,
            round_time: 120.0,
            map_scale: 300.0,
            player_spawn: Vec2::ZERO,
            goal_position: Vec3::new(100.0, 0.0, 100.0),
            goal_radius: 5.0,
        }
    }
}
