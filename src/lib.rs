// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;

// Model / controller split
pub mod controller;
pub mod model;

// Browser glue
#[cfg(target_arch = "wasm32")]
pub mod bindings;

pub use config::NavigationConfig;
pub use controller::{FrameLoopContext, InputEvent, LookSource, NavigationHost};
pub use error::ConfigError;
pub use model::{presets, CameraPose, InteractableId, SceneMode, SceneSet};
