use glam::DVec3;

use super::input::ControlVector;
use crate::config::NavigationConfig;
use crate::model::{BodyState, OrientationState};

/// Handles player motion (walking, gravity, jumping). Collision is applied afterwards.
#[derive(Debug, Clone)]
pub struct KinematicBody {
    pub walk_speed: f64,
    pub run_speed: f64,
    pub gravity: f64,
    pub jump_impulse: f64,
}

impl KinematicBody {
    pub fn new(config: &NavigationConfig) -> Self {
        Self {
            walk_speed: config.walk_speed,
            run_speed: config.run_speed,
            gravity: config.gravity,
            jump_impulse: config.jump_impulse,
        }
    }

    /// Proposed horizontal displacement for this frame, before collision.
    pub fn horizontal_step(&self, control: &ControlVector, orientation: &OrientationState, dt: f64) -> DVec3 {
        let forward = orientation.flat_forward();
        let right = orientation.flat_right();

        let mut wish = DVec3::ZERO;
        if control.forward {
            wish += forward;
        }
        if control.backward {
            wish -= forward;
        }
        if control.left {
            wish -= right;
        }
        if control.right {
            wish += right;
        }

        // Normalize before scaling so diagonals are no faster than a single axis.
        let speed = if control.run { self.run_speed } else { self.walk_speed };
        wish.normalize_or_zero() * speed * dt
    }

    /// Jump, gravity and landing. Never gated by collision.
    pub fn vertical_step(&self, body: &mut BodyState, jump: bool, ground_level: f64, dt: f64) {
        if jump && body.grounded {
            body.vertical_velocity = self.jump_impulse;
            body.grounded = false;
            return;
        }

        if body.grounded {
            body.position.y = ground_level;
            return;
        }

        body.vertical_velocity -= self.gravity * dt;
        body.position.y += body.vertical_velocity * dt;

        if body.position.y <= ground_level {
            body.position.y = ground_level;
            body.vertical_velocity = 0.0;
            body.grounded = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND: f64 = 2.2;

    fn body() -> KinematicBody {
        KinematicBody::new(&NavigationConfig::default())
    }

    #[test]
    fn test_diagonal_not_faster_than_single_axis() {
        let o = OrientationState::new(0.3, 0.9);
        let straight = ControlVector { forward: true, ..Default::default() };
        let diagonal = ControlVector { forward: true, left: true, ..Default::default() };

        let a = body().horizontal_step(&straight, &o, 0.1).length();
        let b = body().horizontal_step(&diagonal, &o, 0.1).length();
        assert!((a - 0.8).abs() < 1e-12);
        assert!((b - a).abs() < 1e-12);
    }

    #[test]
    fn test_run_speed_and_level_motion() {
        let o = OrientationState::new(0.0, 1.4);
        let cv = ControlVector { forward: true, run: true, ..Default::default() };
        let step = body().horizontal_step(&cv, &o, 0.1);
        assert_eq!(step.y, 0.0);
        assert!((step.length() - 1.5).abs() < 1e-12);
        assert!(step.z < 0.0);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let cv = ControlVector { forward: true, backward: true, ..Default::default() };
        assert_eq!(body().horizontal_step(&cv, &OrientationState::default(), 0.1), DVec3::ZERO);
    }

    #[test]
    fn test_jump_arc_lands_exactly_on_ground() {
        let k = body();
        let mut b = BodyState::at(DVec3::new(0.0, GROUND, 0.0));

        k.vertical_step(&mut b, true, GROUND, 1.0 / 60.0);
        assert_eq!(b.vertical_velocity, 8.0);
        assert!(!b.grounded);

        let mut peak = GROUND;
        let mut frames = 0;
        while !b.grounded {
            k.vertical_step(&mut b, false, GROUND, 1.0 / 60.0);
            peak = peak.max(b.position.y);
            if !b.grounded {
                assert!(b.position.y > GROUND);
            }
            frames += 1;
            assert!(frames < 600, "never landed");
        }

        assert!(peak > GROUND + 1.0);
        assert_eq!(b.position.y, GROUND);
        assert_eq!(b.vertical_velocity, 0.0);
    }

    #[test]
    fn test_no_double_jump_in_air() {
        let k = body();
        let mut b = BodyState::at(DVec3::new(0.0, GROUND, 0.0));
        k.vertical_step(&mut b, true, GROUND, 1.0 / 60.0);
        k.vertical_step(&mut b, false, GROUND, 1.0 / 60.0);
        let v = b.vertical_velocity;
        k.vertical_step(&mut b, true, GROUND, 1.0 / 60.0);
        assert!(b.vertical_velocity < v);
    }
}
