//! Position, rotation and scale

use glam::{Mat3, Mat4, Quat, Vec3};

/// Transform for positioning objects in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            ..Default::default()
        }
    }

    /// Place at `position` with local +Z pointing at `target`
    pub fn facing(position: Vec3, target: Vec3) -> Self {
        let forward = (target - position).normalize_or_zero();
        let reference = if forward.y.abs() > 0.999 { Vec3::Z } else { Vec3::Y };
        let right = reference.cross(forward).normalize_or_zero();
        let up = forward.cross(right);
        Self {
            position,
            rotation: Quat::from_mat3(&Mat3::from_cols(right, up, forward)),
            scale: Vec3::ONE,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Model matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Local +Z in world space
    pub fn front(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_facing_points_front_at_target() {
        let t = Transform::facing(Vec3::new(0.0, 10.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        let expected = Vec3::new(1.0, -1.0, 0.0).normalize();
        assert_relative_eq!(t.front().x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(t.front().y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(t.front().z, expected.z, epsilon = 1e-5);
    }

    #[test]
    fn test_straight_down() {
        let t = Transform::facing(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);
        assert_relative_eq!(t.front().y, -1.0, epsilon = 1e-5);
    }
}
