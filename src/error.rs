use thiserror::Error;

use crate::model::InteractableId;

/// Errors raised while loading or validating scene and tuning configuration.
///
/// Nothing in the per-frame path returns these; a frame either applies input
/// or does nothing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("interactable {0:?} is registered more than once")]
    DuplicateInteractable(InteractableId),

    #[error("interactable {id:?} has invalid trigger radius {radius}")]
    InvalidTriggerRadius { id: InteractableId, radius: f64 },

    #[error("obstacle #{index} has invalid half extents {half_extents:?}")]
    InvalidHalfExtents { index: usize, half_extents: [f64; 3] },

    #[error("scene declares more than one exit door")]
    MultipleExitDoors,

    #[error("`{name}` must be finite and non-negative, got {value}")]
    InvalidConstant { name: &'static str, value: f64 },
}
