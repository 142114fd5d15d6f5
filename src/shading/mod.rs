//! Reference shading models shared by the renderers' CPU-side tests and
//! tools. Directions are expressed in a local shading frame with the
//! surface normal along +Z.

pub mod distributions;
pub mod lambert;

use glam::Vec3;

pub use distributions::{Cosine, DirectionalSample};
pub use lambert::Lambert;

/// A direction sampled from a BSDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BsdfSample {
    pub direction: Vec3,
    pub pdf: f32,
    /// BSDF value for `direction`, not divided by the PDF.
    pub reflectance: Vec3,
}
