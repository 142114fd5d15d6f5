//! Cutout detection for coverage textures.
//!
//! A coverage mask is a *cutout* when it is black and white apart from
//! one-pixel anti-aliased borders. Pixels are inspected in 2×2 groups: a
//! grey pixel is accepted when its right, bottom or bottom-right neighbour
//! is black or white. A single grey pixel without such a neighbour makes
//! the whole mask transparent. The last row and column are only inspected
//! as neighbours.

use rustc_hash::FxHashMap;

use crate::assets::image::{ImageId, Images, PixelFormat};
use crate::assets::material::MaterialFlags;
use crate::core::id::EntityId;
use crate::world::SceneDatabase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coverage {
    Cutout,
    Transparent,
}

#[inline]
fn is_cutout_opacity(intensity: u8) -> bool {
    intensity < 2 || intensity > 253
}

/// Classifies an 8-bit coverage image.
///
/// Images that are not single channel 8-bit are reported as
/// [`Coverage::Transparent`].
#[must_use]
pub fn classify_coverage(images: &Images, image: ImageId) -> Coverage {
    let format = images.get_pixel_format(image);
    if format != PixelFormat::I8 {
        log::warn!("Coverage image {image} has pixel format {format:?}, expected I8; treating it as transparent");
        return Coverage::Transparent;
    }

    let size = images.get_size(image);
    let (width, height) = (size.x as usize, size.y as usize);
    let pixels = images.get_pixels(image);

    for y in 0..height.saturating_sub(1) {
        for x in 0..width.saturating_sub(1) {
            if is_cutout_opacity(pixels[x + y * width]) {
                continue;
            }
            let cutout_border = is_cutout_opacity(pixels[(x + 1) + y * width])
                || is_cutout_opacity(pixels[x + (y + 1) * width])
                || is_cutout_opacity(pixels[(x + 1) + (y + 1) * width]);
            if !cutout_border {
                return Coverage::Transparent;
            }
        }
    }
    Coverage::Cutout
}

/// Memoizes [`classify_coverage`] per image.
#[derive(Debug, Default)]
pub struct CutoutDetector {
    classified: FxHashMap<ImageId, Coverage>,
}

impl CutoutDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, images: &Images, image: ImageId) -> Coverage {
        *self
            .classified
            .entry(image)
            .or_insert_with(|| classify_coverage(images, image))
    }

    /// Forgets the classification of images whose pixels changed this tick.
    pub fn invalidate_changed(&mut self, images: &Images) {
        if self.classified.is_empty() {
            return;
        }
        for (image, changes) in images.get_changed_with_masks() {
            if !changes.is_empty() {
                self.classified.remove(&image);
            }
        }
    }

    /// Sets or clears [`MaterialFlags::CUTOUT`] on every material with a
    /// coverage texture, according to that texture's image. Returns the
    /// number of materials flagged as cutouts.
    pub fn flag_cutout_materials(&mut self, database: &mut SceneDatabase) -> usize {
        let materials: Vec<_> = database.materials.get_iterable().collect();
        let mut cutouts = 0;
        for material in materials {
            let texture = database.materials.get_coverage_texture_id(material);
            if texture.is_sentinel() || !database.textures.has(texture) {
                continue;
            }

            let image = database.textures.get_image_id(texture);
            let is_cutout = self.classify(&database.images, image) == Coverage::Cutout;
            let mut flags = database.materials.get_flags(material);
            if flags.contains(MaterialFlags::CUTOUT) != is_cutout {
                flags.set(MaterialFlags::CUTOUT, is_cutout);
                database.materials.set_flags(material, flags);
            }
            cutouts += usize::from(is_cutout);
        }
        log::debug!("Flagged {cutouts} cutout materials");
        cutouts
    }
}
