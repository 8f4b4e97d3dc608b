use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Every object in the room that can be interacted with.
///
/// The set is closed so per-object state can live in a dense array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractableId {
    Laptop,
    Whiteboard,
    Monitor,
    Trophy,
    Notebook,
    Phone,
    Door,
}

impl InteractableId {
    pub const COUNT: usize = 7;

    pub const ALL: [InteractableId; Self::COUNT] = [
        InteractableId::Laptop,
        InteractableId::Whiteboard,
        InteractableId::Monitor,
        InteractableId::Trophy,
        InteractableId::Notebook,
        InteractableId::Phone,
        InteractableId::Door,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            InteractableId::Laptop => "laptop",
            InteractableId::Whiteboard => "whiteboard",
            InteractableId::Monitor => "monitor",
            InteractableId::Trophy => "trophy",
            InteractableId::Notebook => "notebook",
            InteractableId::Phone => "phone",
            InteractableId::Door => "door",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractableKind {
    /// Flips between open and closed.
    #[default]
    Toggle,
    /// Leaves the current scene instead of toggling.
    ExitDoor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneMode {
    Outside,
    Inside,
}

impl SceneMode {
    pub fn other(self) -> Self {
        match self {
            SceneMode::Outside => SceneMode::Inside,
            SceneMode::Inside => SceneMode::Outside,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SceneMode::Outside => "outside",
            SceneMode::Inside => "inside",
        }
    }
}

/// Axis-aligned box the body may not walk into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticObstacle {
    pub position: DVec3,
    pub half_extents: DVec3,
}

impl StaticObstacle {
    pub fn new(position: DVec3, half_extents: DVec3) -> Self {
        Self { position, half_extents }
    }

    /// Build from a full box size, the way scene authoring tools describe boxes.
    pub fn from_size(position: [f64; 3], size: [f64; 3]) -> Self {
        Self {
            position: DVec3::from_array(position),
            half_extents: DVec3::from_array(size) * 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractableDescriptor {
    pub id: InteractableId,
    pub position: DVec3,
    pub trigger_radius: f64,
    #[serde(default)]
    pub kind: InteractableKind,
    /// Prompt shown by the host while this object is nearest.
    #[serde(default)]
    pub label: String,
}

/// Open rectangle on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Region {
    pub fn contains(&self, p: DVec3) -> bool {
        p.x > self.min_x && p.x < self.max_x && p.z > self.min_z && p.z < self.max_z
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub position: DVec3,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
}

/// Everything the host supplies for one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub ground_level: f64,
    pub spawn: Spawn,
    #[serde(default)]
    pub obstacles: Vec<StaticObstacle>,
    #[serde(default)]
    pub interactables: Vec<InteractableDescriptor>,
    /// Standing here and interacting moves to the other scene.
    #[serde(default)]
    pub entry_region: Option<Region>,
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let scene: Self = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.ground_level.is_finite() {
            return Err(ConfigError::InvalidConstant { name: "ground_level", value: self.ground_level });
        }

        for (index, obstacle) in self.obstacles.iter().enumerate() {
            let h = obstacle.half_extents;
            if !h.is_finite() || h.min_element() < 0.0 || !obstacle.position.is_finite() {
                return Err(ConfigError::InvalidHalfExtents { index, half_extents: h.to_array() });
            }
        }

        let mut seen = [false; InteractableId::COUNT];
        let mut exits = 0;
        for desc in &self.interactables {
            if seen[desc.id.index()] {
                return Err(ConfigError::DuplicateInteractable(desc.id));
            }
            seen[desc.id.index()] = true;

            if !desc.trigger_radius.is_finite() || desc.trigger_radius <= 0.0 {
                return Err(ConfigError::InvalidTriggerRadius { id: desc.id, radius: desc.trigger_radius });
            }
            if desc.kind == InteractableKind::ExitDoor {
                exits += 1;
            }
        }
        if exits > 1 {
            return Err(ConfigError::MultipleExitDoors);
        }
        Ok(())
    }

    pub fn descriptor(&self, id: InteractableId) -> Option<&InteractableDescriptor> {
        self.interactables.iter().find(|d| d.id == id)
    }
}

/// Both scenes of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSet {
    pub outside: SceneConfig,
    pub inside: SceneConfig,
}

impl SceneSet {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let set: Self = serde_json::from_str(json)?;
        set.outside.validate()?;
        set.inside.validate()?;
        Ok(set)
    }

    pub fn get(&self, mode: SceneMode) -> &SceneConfig {
        match mode {
            SceneMode::Outside => &self.outside,
            SceneMode::Inside => &self.inside,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone(radius: f64) -> InteractableDescriptor {
        InteractableDescriptor {
            id: InteractableId::Phone,
            position: DVec3::ZERO,
            trigger_radius: radius,
            kind: InteractableKind::Toggle,
            label: String::new(),
        }
    }

    fn scene(interactables: Vec<InteractableDescriptor>) -> SceneConfig {
        SceneConfig {
            ground_level: 2.2,
            spawn: Spawn { position: DVec3::new(0.0, 2.2, 0.0), yaw: 0.0, pitch: 0.0 },
            obstacles: Vec::new(),
            interactables,
            entry_region: None,
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = scene(vec![phone(3.0), phone(2.0)]).validate().unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateInteractable(InteractableId::Phone)));
    }

    #[test]
    fn test_zero_radius_rejected() {
        let err = scene(vec![phone(0.0)]).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTriggerRadius { .. }));
    }

    #[test]
    fn test_second_exit_door_rejected() {
        let door = |id| InteractableDescriptor { id, kind: InteractableKind::ExitDoor, ..phone(3.0) };
        let err = scene(vec![door(InteractableId::Door), door(InteractableId::Trophy)]).validate().unwrap_err();
        assert!(matches!(err, ConfigError::MultipleExitDoors));
    }

    #[test]
    fn test_bad_half_extents_rejected() {
        for half_extents in [DVec3::new(-1.0, 1.0, 1.0), DVec3::new(1.0, f64::NAN, 1.0), DVec3::new(1.0, 1.0, f64::INFINITY)] {
            let mut s = scene(Vec::new());
            s.obstacles.push(StaticObstacle::new(DVec3::ZERO, DVec3::ONE));
            s.obstacles.push(StaticObstacle::new(DVec3::ZERO, half_extents));
            let err = s.validate().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidHalfExtents { index: 1, .. }));
        }
    }

    #[test]
    fn test_negative_half_extents_rejected_from_json() {
        let json = r#"{
            "ground_level": 2.2,
            "spawn": { "position": [0.0, 2.2, 0.0] },
            "obstacles": [ { "position": [0.0, 0.0, 0.0], "half_extents": [-1.0, 1.0, 1.0] } ]
        }"#;
        let err = SceneConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHalfExtents { index: 0, .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(SceneSet::from_json("{"), Err(ConfigError::Json(_))));
        assert!(matches!(SceneConfig::from_json(r#"{ "ground_level": "low" }"#), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_scene_from_json() {
        let json = r#"{
            "ground_level": 2.2,
            "spawn": { "position": [0.0, 2.2, 12.0] },
            "obstacles": [ { "position": [0.0, 0.8, 0.0], "half_extents": [3.1, 0.5, 1.35] } ],
            "interactables": [
                { "id": "door", "position": [0.0, 1.5, 14.9], "trigger_radius": 4.0, "kind": "exit_door" }
            ]
        }"#;
        let scene = SceneConfig::from_json(json).unwrap();
        assert_eq!(scene.obstacles.len(), 1);
        assert_eq!(scene.interactables[0].kind, InteractableKind::ExitDoor);
        assert_eq!(scene.spawn.yaw, 0.0);
    }

    #[test]
    fn test_names_roundtrip() {
        for id in InteractableId::ALL {
            assert_eq!(InteractableId::from_name(id.name()), Some(id));
        }
        assert_eq!(InteractableId::from_name("sofa"), None);
    }
}
