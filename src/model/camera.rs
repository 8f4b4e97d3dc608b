use std::f64::consts::FRAC_PI_2;

use glam::{DMat4, DQuat, DVec3, EulerRot};

/// Accumulated look angles. Roll does not exist here, so it is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationState {
    pub yaw: f64,
    pub pitch: f64,
}

impl OrientationState {
    pub fn new(yaw: f64, pitch: f64) -> Self {
        Self { yaw, pitch: pitch.clamp(-FRAC_PI_2, FRAC_PI_2) }
    }

    /// Subtract a scaled delta from both angles and clamp pitch.
    pub fn apply_delta(&mut self, dx: f64, dy: f64, sensitivity: f64) {
        self.yaw -= dx * sensitivity;
        self.pitch = (self.pitch - dy * sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Yaw is applied before pitch; composing the other way round leaks roll.
    pub fn rotation(&self) -> DQuat {
        DQuat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Level forward direction used for movement (pitch ignored).
    pub fn flat_forward(&self) -> DVec3 {
        DVec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn flat_right(&self) -> DVec3 {
        DVec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }
}

/// What the renderer reads back each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: DVec3,
    pub orientation: OrientationState,
}

impl CameraPose {
    pub fn yaw(&self) -> f64 {
        self.orientation.yaw
    }

    pub fn pitch(&self) -> f64 {
        self.orientation.pitch
    }

    pub fn rotation(&self) -> DQuat {
        self.orientation.rotation()
    }

    pub fn forward(&self) -> DVec3 {
        self.rotation() * DVec3::NEG_Z
    }

    pub fn up(&self) -> DVec3 {
        self.rotation() * DVec3::Y
    }

    pub fn view(&self) -> DMat4 {
        DMat4::look_to_rh(self.position, self.forward(), self.up())
    }

    pub fn uniform(&self) -> PoseUniform {
        let p = self.position.as_vec3();
        PoseUniform {
            view: self.view().as_mat4().to_cols_array_2d(),
            eye: [p.x, p.y, p.z, 1.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PoseUniform {
    pub view: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roll_of(q: DQuat) -> f64 {
        let (_, _, roll) = q.to_euler(EulerRot::YXZ);
        roll
    }

    #[test]
    fn test_pitch_clamped_and_roll_zero() {
        let mut o = OrientationState::default();
        for step in 0..500 {
            let dy = if step % 3 == 0 { -900.0 } else { 1300.0 };
            o.apply_delta(37.0, dy, 0.002);
            assert!(o.pitch >= -FRAC_PI_2 && o.pitch <= FRAC_PI_2);
            assert!(roll_of(o.rotation()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_mouse_right_turns_right() {
        let mut o = OrientationState::default();
        o.apply_delta(100.0, 0.0, 0.002);
        // Turning right from -Z swings forward towards +X.
        assert!(o.flat_forward().x > 0.0);
    }

    #[test]
    fn test_flat_basis_is_level_and_orthogonal() {
        let o = OrientationState::new(0.7, 1.2);
        assert_eq!(o.flat_forward().y, 0.0);
        assert!(o.flat_forward().dot(o.flat_right()).abs() < 1e-12);
        assert!((o.flat_forward().length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pose_forward_matches_flat_forward_at_zero_pitch() {
        let pose = CameraPose {
            position: DVec3::new(0.0, 2.2, 12.0),
            orientation: OrientationState::new(0.4, 0.0),
        };
        assert!((pose.forward() - pose.orientation.flat_forward()).length() < 1e-9);
    }

    #[test]
    fn test_uniform_moves_eye_to_origin() {
        let pose = CameraPose {
            position: DVec3::new(1.0, 2.2, 12.0),
            orientation: OrientationState::new(-0.3, 0.2),
        };
        let u = pose.uniform();
        assert_eq!(u.eye, [1.0, 2.2, 12.0, 1.0]);
        let view = glam::Mat4::from_cols_array_2d(&u.view);
        let eye_in_view = view.transform_point3(glam::Vec3::new(1.0, 2.2, 12.0));
        assert!(eye_in_view.length() < 1e-4);
        assert_eq!(bytemuck::bytes_of(&u).len(), 80);
    }
}
