//! The two built-in scenes of the CV room.

use glam::DVec3;

use super::scene::{
    InteractableDescriptor, InteractableId, InteractableKind, Region, SceneConfig, SceneSet, Spawn,
    StaticObstacle,
};

pub const GROUND_LEVEL: f64 = 2.2;

fn interactable(
    id: InteractableId,
    position: [f64; 3],
    trigger_radius: f64,
    kind: InteractableKind,
    label: &str,
) -> InteractableDescriptor {
    InteractableDescriptor {
        id,
        position: DVec3::from_array(position),
        trigger_radius,
        kind,
        label: label.to_string(),
    }
}

/// The furnished room: desk, shelves, cases, lamps and four walls.
pub fn interior() -> SceneConfig {
    use InteractableId::*;
    use InteractableKind::{ExitDoor, Toggle};

    let obstacles = vec![
        // desk
        StaticObstacle::from_size([0.0, 0.8, 0.0], [6.2, 1.0, 2.7]),
        // side table
        StaticObstacle::from_size([-8.0, 0.0, 10.0], [1.4, 1.3, 1.4]),
        // phone shelf
        StaticObstacle::from_size([8.0, 1.0, 10.0], [2.4, 1.0, 1.2]),
        StaticObstacle::from_size([-8.0, 0.0, -12.0], [1.9, 2.5, 1.9]),
        // plant
        StaticObstacle::from_size([3.0, 1.2, 0.0], [1.2, 1.0, 1.2]),
        // floor lamps
        StaticObstacle::from_size([-10.0, 0.0, 5.0], [0.8, 2.5, 0.8]),
        StaticObstacle::from_size([10.0, 0.0, 5.0], [0.8, 2.5, 0.8]),
        // walls: back, left, right, front
        StaticObstacle::from_size([0.0, 5.0, -14.9], [30.0, 10.0, 0.5]),
        StaticObstacle::from_size([-14.9, 5.0, 0.0], [0.5, 10.0, 30.0]),
        StaticObstacle::from_size([14.9, 5.0, 0.0], [0.5, 10.0, 30.0]),
        StaticObstacle::from_size([0.0, 5.0, 14.9], [30.0, 10.0, 0.5]),
        // notebook and phone
        StaticObstacle::from_size([-8.0, 1.3, 10.0], [0.5, 0.1, 0.5]),
        StaticObstacle::from_size([8.0, 1.15, 10.0], [0.5, 0.1, 0.5]),
    ];

    let interactables = vec![
        interactable(Laptop, [0.5, 0.95, 0.0], 3.0, Toggle, "Laptop - Press F to open"),
        interactable(Whiteboard, [-14.5, 3.0, -8.0], 5.0, Toggle, "Skills Whiteboard - Press F to view"),
        interactable(Monitor, [14.5, 3.0, -8.0], 5.0, Toggle, "Education Monitor - Press F to view"),
        interactable(Trophy, [-8.0, 1.0, -12.0], 3.0, Toggle, "Trophy Case - Press F to view achievements"),
        interactable(Notebook, [-8.0, 1.3, 10.0], 3.0, Toggle, "Experience Notebook - Press F to read"),
        interactable(Phone, [8.0, 1.15, 10.0], 3.0, Toggle, "Contact Phone - Press F (E=Email, L=LinkedIn)"),
        interactable(Door, [0.0, 1.5, 14.9], 4.0, ExitDoor, "Exit Door - Press F to leave house"),
    ];

    SceneConfig {
        ground_level: GROUND_LEVEL,
        spawn: Spawn { position: DVec3::new(0.0, GROUND_LEVEL, 12.0), yaw: 0.0, pitch: 0.0 },
        obstacles,
        interactables,
        entry_region: None,
    }
}

/// The lawn in front of the house. The only interaction is the front door.
pub fn exterior() -> SceneConfig {
    SceneConfig {
        ground_level: GROUND_LEVEL,
        spawn: Spawn { position: DVec3::new(0.0, GROUND_LEVEL, 10.0), yaw: 0.0, pitch: 0.0 },
        obstacles: Vec::new(),
        interactables: Vec::new(),
        entry_region: Some(Region { min_x: -3.0, max_x: 3.0, min_z: -2.0, max_z: 2.0 }),
    }
}

pub fn scene_set() -> SceneSet {
    SceneSet { outside: exterior(), inside: interior() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        interior().validate().unwrap();
        exterior().validate().unwrap();
    }

    #[test]
    fn test_interior_has_single_exit() {
        let exits = interior()
            .interactables
            .iter()
            .filter(|d| d.kind == InteractableKind::ExitDoor)
            .count();
        assert_eq!(exits, 1);
    }
}
