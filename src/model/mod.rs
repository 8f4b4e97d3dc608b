// MODEL: Scene data and simulation state
pub mod body;
pub mod camera;
pub mod presets;
pub mod scene;

pub use body::BodyState;
pub use camera::{CameraPose, OrientationState, PoseUniform};
pub use scene::{
    InteractableDescriptor, InteractableId, InteractableKind, Region, SceneConfig, SceneMode,
    SceneSet, Spawn, StaticObstacle,
};
