use glam::Vec3;

use crate::math::Transform;

/// Axis-aligned bounding box.
///
/// The default box is [`Aabb::INVALID`], an inverted box that acts as the
/// identity for [`union`](Aabb::union) and [`grow_to_contain`](Aabb::grow_to_contain).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const INVALID: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Self::INVALID, |aabb, &p| aabb.grow_to_contain(p))
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn grow_to_contain(&self, point: Vec3) -> Aabb {
        Aabb {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    /// True if `other` lies inside `self`, allowing `epsilon` of slack.
    #[must_use]
    pub fn contains(&self, other: &Aabb, epsilon: f32) -> bool {
        (self.min - epsilon).cmple(other.min).all() && other.max.cmple(self.max + epsilon).all()
    }

    /// Bounds of the eight transformed corners.
    #[must_use]
    pub fn transform(&self, transform: &Transform) -> Aabb {
        if !self.is_valid() {
            return *self;
        }

        let mut result = Aabb::INVALID;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            result = result.grow_to_contain(transform.transform_point(corner));
        }
        result
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::INVALID
    }
}
