//! Tuning constants for the navigation core.
//!
//! Defaults match the built-in room. Hosts can override any of them from JSON.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::InteractableId;

/// Radians of yaw/pitch per pixel of pointer-lock movement.
pub const MOUSE_SENSITIVITY: f64 = 0.002;
/// Radians of yaw/pitch per pixel of touch drag.
pub const TOUCH_SENSITIVITY: f64 = 0.003;

pub const WALK_SPEED: f64 = 8.0;
pub const RUN_SPEED: f64 = 15.0;
pub const GRAVITY: f64 = 25.0;
pub const JUMP_IMPULSE: f64 = 8.0;

/// Horizontal padding added around every obstacle.
pub const COLLISION_MARGIN: f64 = 0.3;
/// Extra height above an obstacle's top that still counts as overlapping.
pub const VERTICAL_ALLOWANCE: f64 = 1.0;

pub const JOYSTICK_DEADZONE: f64 = 0.3;
/// Nearest-interactable lookup runs once every this many frames.
pub const PROXIMITY_INTERVAL: u32 = 5;

pub const INTERACT_COOLDOWN_MS: f64 = 300.0;
pub const SHORTCUT_COOLDOWN_MS: f64 = 1000.0;
/// Delay between an exit-door interaction and the actual scene swap.
pub const EXIT_DELAY_MS: f64 = 100.0;
/// Minimum spacing between two accepted presses of the same virtual button.
pub const BUTTON_REPEAT_MS: f64 = 200.0;
/// Upper bound for a single frame step, in seconds.
pub const MAX_FRAME_DT: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub mouse_sensitivity: f64,
    pub touch_sensitivity: f64,
    pub walk_speed: f64,
    pub run_speed: f64,
    pub gravity: f64,
    pub jump_impulse: f64,
    pub collision_margin: f64,
    pub vertical_allowance: f64,
    pub joystick_deadzone: f64,
    pub proximity_interval: u32,
    pub interact_cooldown_ms: f64,
    pub shortcut_cooldown_ms: f64,
    pub exit_delay_ms: f64,
    pub button_repeat_ms: f64,
    pub max_frame_dt: f64,
    /// The only interactable that enables the auxiliary shortcuts.
    pub shortcut_target: InteractableId,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: MOUSE_SENSITIVITY,
            touch_sensitivity: TOUCH_SENSITIVITY,
            walk_speed: WALK_SPEED,
            run_speed: RUN_SPEED,
            gravity: GRAVITY,
            jump_impulse: JUMP_IMPULSE,
            collision_margin: COLLISION_MARGIN,
            vertical_allowance: VERTICAL_ALLOWANCE,
            joystick_deadzone: JOYSTICK_DEADZONE,
            proximity_interval: PROXIMITY_INTERVAL,
            interact_cooldown_ms: INTERACT_COOLDOWN_MS,
            shortcut_cooldown_ms: SHORTCUT_COOLDOWN_MS,
            exit_delay_ms: EXIT_DELAY_MS,
            button_repeat_ms: BUTTON_REPEAT_MS,
            max_frame_dt: MAX_FRAME_DT,
            shortcut_target: InteractableId::Phone,
        }
    }
}

impl NavigationConfig {
    /// Parse a (possibly partial) JSON object; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let constants = [
            ("mouse_sensitivity", self.mouse_sensitivity),
            ("touch_sensitivity", self.touch_sensitivity),
            ("walk_speed", self.walk_speed),
            ("run_speed", self.run_speed),
            ("gravity", self.gravity),
            ("jump_impulse", self.jump_impulse),
            ("collision_margin", self.collision_margin),
            ("vertical_allowance", self.vertical_allowance),
            ("joystick_deadzone", self.joystick_deadzone),
            ("interact_cooldown_ms", self.interact_cooldown_ms),
            ("shortcut_cooldown_ms", self.shortcut_cooldown_ms),
            ("exit_delay_ms", self.exit_delay_ms),
            ("button_repeat_ms", self.button_repeat_ms),
            ("max_frame_dt", self.max_frame_dt),
        ];
        for (name, value) in constants {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidConstant { name, value });
            }
        }
        Ok(())
    }

    /// Clamped interval, so a zero in the config still refreshes every frame.
    pub fn proximity_interval(&self) -> u32 {
        self.proximity_interval.max(1)
    }
}
