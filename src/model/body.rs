use glam::DVec3;

use super::scene::Spawn;

/// Kinematic state of the first-person body. The camera sits at `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: DVec3,
    pub vertical_velocity: f64,
    pub grounded: bool,
}

impl BodyState {
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            vertical_velocity: 0.0,
            grounded: true,
        }
    }

    /// Scene-initial pose: standing on the ground at the spawn point.
    pub fn spawn(spawn: &Spawn, ground_level: f64) -> Self {
        Self::at(DVec3::new(spawn.position.x, ground_level, spawn.position.z))
    }
}
