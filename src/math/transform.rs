use std::ops::Mul;

use glam::{Affine3A, Mat3, Mat4, Quat, Vec3};

/// Rigid transform with uniform scale.
///
/// Applying a transform to a point scales it, rotates it and finally
/// translates it. Uniform scale keeps composition closed: the composition
/// of two transforms is again a translation, a rotation and a single scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: 1.0,
    };

    #[must_use]
    pub const fn new(translation: Vec3, rotation: Quat, scale: f32) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY, 1.0)
    }

    #[must_use]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self::new(Vec3::ZERO, rotation, 1.0)
    }

    /// `self ∘ child`: the transform that applies `child` first, then `self`.
    #[must_use]
    pub fn compose(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.transform_point(child.translation),
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }

    #[must_use]
    pub fn inverse(&self) -> Transform {
        let rotation = self.rotation.inverse();
        let scale = 1.0 / self.scale;
        Transform {
            translation: rotation * (-self.translation * scale),
            rotation,
            scale,
        }
    }

    #[inline]
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (point * self.scale)
    }

    /// Rotates and scales `vector`, ignoring translation.
    #[inline]
    #[must_use]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (vector * self.scale)
    }

    /// Rotates `direction` only. Unit vectors stay unit length.
    #[inline]
    #[must_use]
    pub fn transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }

    /// Local -Z in parent space.
    #[inline]
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    #[inline]
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    #[inline]
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Rotates the transform so that its forward axis points at `target`.
    ///
    /// `target` and `up` are given in the same space as the translation.
    /// Degenerate configurations (target on the up axis or at the
    /// translation) leave the rotation untouched.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.translation).normalize_or_zero();
        if forward.cross(up).length_squared() < 1e-8 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, new_up, -forward)).normalize();
    }

    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.translation,
        )
    }

    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.translation,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, child: Transform) -> Transform {
        self.compose(&child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).abs().max_element() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn compose_matches_matrix_product() {
        let parent = Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.7), 2.0);
        let child = Transform::new(Vec3::new(-1.0, 0.5, 4.0), Quat::from_rotation_x(-0.3), 0.5);
        let p = Vec3::new(0.3, -0.2, 1.1);

        let composed = parent.compose(&child).transform_point(p);
        let matrices = (parent.to_mat4() * child.to_mat4()).transform_point3(p);
        assert_vec_eq(composed, matrices);
    }

    #[test]
    fn inverse_undoes_transform() {
        let t = Transform::new(Vec3::new(4.0, -2.0, 1.0), Quat::from_rotation_z(1.2), 3.0);
        let p = Vec3::new(0.5, 0.25, -7.0);
        assert_vec_eq(t.inverse().transform_point(t.transform_point(p)), p);
        assert_vec_eq((t * t.inverse()).translation, Vec3::ZERO);
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut t = Transform::from_translation(Vec3::new(0.0, 0.0, 5.0));
        t.look_at(Vec3::new(5.0, 0.0, 5.0), Vec3::Y);
        assert_vec_eq(t.forward(), Vec3::X);
    }
}
