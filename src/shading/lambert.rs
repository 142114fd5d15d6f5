//! The Lambertian diffuse BSDF.

use std::f32::consts::FRAC_1_PI;

use glam::{Vec2, Vec3};

use crate::shading::BsdfSample;
use crate::shading::distributions::Cosine;

/// Perfectly diffuse reflection scaled by a tint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambert {
    pub tint: Vec3,
}

impl Default for Lambert {
    fn default() -> Self {
        Self { tint: Vec3::ONE }
    }
}

impl Lambert {
    #[must_use]
    pub fn new(tint: Vec3) -> Self {
        Self { tint }
    }

    #[inline]
    #[must_use]
    pub fn evaluate(&self) -> Vec3 {
        self.tint * FRAC_1_PI
    }

    /// PDF of sampling `wi` given `wo`. Zero when they lie in opposite hemispheres.
    #[must_use]
    pub fn pdf(&self, wo: Vec3, wi: Vec3) -> f32 {
        if wo.z * wi.z <= 0.0 {
            return 0.0;
        }
        Cosine::pdf(wi.z.abs())
    }

    #[must_use]
    pub fn sample(&self, random: Vec2) -> BsdfSample {
        let cosine = Cosine::sample(random);
        BsdfSample {
            direction: cosine.direction,
            pdf: cosine.pdf,
            reflectance: self.evaluate(),
        }
    }
}
