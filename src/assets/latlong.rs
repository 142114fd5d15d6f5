//! Importance sampling of latitude-longitude environment maps.
//!
//! The environment is treated as a piecewise-constant 2D function over the
//! texture's `[0, 1]^2` domain, one cell per pixel, weighted by pixel
//! luminance times `sin θ` of the pixel row. The `sin θ` factor accounts
//! for the rows near the poles covering less solid angle, so directions are
//! drawn proportionally to the light they carry.

use std::f32::consts::PI;

use glam::{UVec2, Vec2, Vec3};

use crate::assets::image::Images;
use crate::assets::texture::{MagnificationFilter, TextureId, Textures, WrapMode, filter_2d};
use crate::math::{direction_to_latlong_texcoord, latlong_texcoord_to_direction, luminance};

/// A direction sampled towards a light, with the radiance arriving from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    pub radiance: Vec3,
    pub direction_to_light: Vec3,
    pub distance: f32,
    /// Solid angle density of `direction_to_light`.
    pub pdf: f32,
}

/// Piecewise-constant 1D distribution over `[0, 1)`.
#[derive(Debug, Clone)]
struct Distribution1D {
    function: Vec<f32>,
    cdf: Vec<f32>,
    integral: f32,
}

impl Distribution1D {
    fn new(function: &[f32]) -> Self {
        let n = function.len() as f32;
        let mut cdf = Vec::with_capacity(function.len() + 1);
        cdf.push(0.0);
        let mut running = 0.0f64;
        for &f in function {
            running += f64::from(f) / f64::from(n);
            cdf.push(running as f32);
        }
        let integral = running as f32;

        if integral > 0.0 {
            for c in &mut cdf {
                *c /= integral;
            }
        } else {
            for (i, c) in cdf.iter_mut().enumerate() {
                *c = i as f32 / n;
            }
        }
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }

        Self {
            function: function.to_vec(),
            cdf,
            integral,
        }
    }

    /// Continuous sample in `[0, 1)` and the index of the cell it fell in.
    fn sample_continuous(&self, u: f32) -> (f32, usize) {
        let count = self.function.len();
        // Last cdf entry <= u.
        let offset = self.cdf.partition_point(|&c| c <= u).saturating_sub(1).min(count - 1);
        let width = self.cdf[offset + 1] - self.cdf[offset];
        let mut du = u - self.cdf[offset];
        if width > 0.0 {
            du /= width;
        }
        let x = (offset as f32 + du.clamp(0.0, 1.0)) / count as f32;
        (x.min(1.0 - f32::EPSILON), offset)
    }
}

/// Environment importance sampler built from a latitude-longitude texture.
///
/// The distribution owns a snapshot of the environment's radiance; it does
/// not observe later edits to the image.
#[derive(Debug, Clone)]
pub struct LatLongDistribution {
    size: UVec2,
    radiance: Vec<Vec3>,
    filter: MagnificationFilter,
    wrap_u: WrapMode,
    wrap_v: WrapMode,
    // One conditional distribution per row, over the row's columns.
    conditionals: Vec<Distribution1D>,
    marginal: Distribution1D,
}

impl LatLongDistribution {
    #[must_use]
    pub fn new(textures: &Textures, images: &Images, texture: TextureId) -> Self {
        let image = textures.get_image_id(texture);
        let size = images.get_size(image).max(UVec2::ONE);

        let mut radiance = Vec::with_capacity((size.x * size.y) as usize);
        for y in 0..size.y {
            for x in 0..size.x {
                radiance.push(images.get_pixel(image, UVec2::new(x, y)).truncate());
            }
        }

        let width = size.x as usize;
        let mut weights: Vec<f32> = radiance.iter().map(|&rgb| luminance(rgb).max(0.0)).collect();
        let black = weights.iter().all(|&w| w == 0.0);
        for (row, chunk) in weights.chunks_mut(width).enumerate() {
            let sin_theta = (PI * (row as f32 + 0.5) / size.y as f32).sin();
            for w in chunk {
                // A black environment falls back to sampling the sphere uniformly.
                *w = if black { sin_theta } else { *w * sin_theta };
            }
        }

        let conditionals: Vec<Distribution1D> = weights.chunks(width).map(Distribution1D::new).collect();
        let row_integrals: Vec<f32> = conditionals.iter().map(|d| d.integral).collect();
        let marginal = Distribution1D::new(&row_integrals);

        Self {
            size,
            radiance,
            filter: textures.get_magnification_filter(texture),
            wrap_u: textures.get_wrapmode_u(texture),
            wrap_v: textures.get_wrapmode_v(texture),
            conditionals,
            marginal,
        }
    }

    #[must_use]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Radiance arriving from `direction`.
    #[must_use]
    pub fn evaluate(&self, direction: Vec3) -> Vec3 {
        let uv = direction_to_latlong_texcoord(direction);
        let width = self.size.x;
        filter_2d(self.size, self.filter, self.wrap_u, self.wrap_v, uv, |coord| {
            self.radiance[(coord.x + coord.y * width) as usize].extend(1.0)
        })
        .truncate()
    }

    /// Solid angle density of sampling `direction`.
    #[must_use]
    pub fn pdf(&self, direction: Vec3) -> f32 {
        let sin_theta = (1.0 - direction.y * direction.y).max(0.0).sqrt();
        if sin_theta == 0.0 || self.marginal.integral == 0.0 {
            return 0.0;
        }

        let uv = direction_to_latlong_texcoord(direction);
        let column = ((uv.x * self.size.x as f32) as usize).min(self.size.x as usize - 1);
        let row = ((uv.y * self.size.y as f32) as usize).min(self.size.y as usize - 1);
        let pdf_uv = self.conditionals[row].function[column] / self.marginal.integral;

        pdf_uv / (2.0 * PI * PI * sin_theta)
    }

    /// Draws a direction proportionally to the environment's weights.
    ///
    /// The returned PDF and radiance are those of the sampled direction, as
    /// reported by [`pdf`](Self::pdf) and [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn sample(&self, random: Vec2) -> LightSample {
        let (v, row) = self.marginal.sample_continuous(random.y);
        let (u, _) = self.conditionals[row].sample_continuous(random.x);
        let direction = latlong_texcoord_to_direction(Vec2::new(u, v));

        LightSample {
            radiance: self.evaluate(direction),
            direction_to_light: direction,
            distance: f32::INFINITY,
            pdf: self.pdf(direction),
        }
    }
}
