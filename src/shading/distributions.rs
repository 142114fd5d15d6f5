//! Hemisphere sampling distributions.

use std::f32::consts::{FRAC_1_PI, TAU};

use glam::{Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalSample {
    pub direction: Vec3,
    pub pdf: f32,
}

/// Cosine-weighted distribution over the +Z hemisphere.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

impl Cosine {
    #[inline]
    #[must_use]
    pub fn pdf(cos_theta: f32) -> f32 {
        cos_theta.max(0.0) * FRAC_1_PI
    }

    /// Maps a unit square sample onto the hemisphere.
    #[must_use]
    pub fn sample(random: Vec2) -> DirectionalSample {
        let radius = random.x.sqrt();
        let phi = TAU * random.y;
        let (sin_phi, cos_phi) = phi.sin_cos();
        let z = (1.0 - random.x).max(0.0).sqrt();

        DirectionalSample {
            direction: Vec3::new(radius * cos_phi, radius * sin_phi, z),
            pdf: Self::pdf(z),
        }
    }
}
