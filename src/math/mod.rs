//! Math primitives shared by the scene tables.
//!
//! Vectors, quaternions and matrices come from `glam`; this module adds the
//! engine-specific types on top of them.

pub mod aabb;
pub mod color;
pub mod rng;
pub mod transform;

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

pub use aabb::Aabb;
pub use color::{luminance, parse_rgb};
pub use transform::Transform;

/// Rectangle in normalized screen space, origin at the lower left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// The whole screen.
    pub const FULL: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// An empty rectangle covers no pixels; cameras with one are skipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }

    /// Maps `point` from screen space into `[0, 1]^2` relative to the rectangle.
    #[must_use]
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        (point - Vec2::new(self.x, self.y)) / Vec2::new(self.width, self.height)
    }

    /// Width over height, or 1 for empty rectangles.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width / self.height
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Latitude-longitude texture coordinates of a unit `direction`.
///
/// `u` follows the azimuth around +Y, `v` runs from -Y (0) to +Y (1).
#[must_use]
pub fn direction_to_latlong_texcoord(direction: Vec3) -> Vec2 {
    let u = (direction.z.atan2(direction.x) + PI) / TAU;
    let v = (direction.y.clamp(-1.0, 1.0).asin() + PI * 0.5) / PI;
    Vec2::new(u, v)
}

/// Inverse of [`direction_to_latlong_texcoord`].
#[must_use]
pub fn latlong_texcoord_to_direction(uv: Vec2) -> Vec3 {
    let phi = uv.x * TAU;
    let theta = uv.y * PI;
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    -Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi)
}
