//! Textures.
//!
//! A texture is a sampler over an image: filtering and per-axis wrapping.
//! Several textures may share one image.

use glam::{IVec2, UVec2, Vec2, Vec4};

use crate::assets::image::{ImageId, Images};
use crate::core::table::{Columns, Table};

crate::define_id! {
    /// Identifies a texture.
    pub struct TextureId;
}

crate::change_flags! {
    pub struct TextureChanges {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MagnificationFilter {
    None,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MinificationFilter {
    None,
    #[default]
    Linear,
    Trilinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    Clamp,
    #[default]
    Repeat,
}

impl WrapMode {
    fn apply(self, coord: i32, size: u32) -> u32 {
        let size = size as i32;
        match self {
            Self::Clamp => coord.clamp(0, size - 1) as u32,
            Self::Repeat => coord.rem_euclid(size) as u32,
        }
    }
}

#[derive(Debug, Default)]
pub struct TextureData {
    images: Vec<ImageId>,
    magnification_filters: Vec<MagnificationFilter>,
    minification_filters: Vec<MinificationFilter>,
    wrap_u: Vec<WrapMode>,
    wrap_v: Vec<WrapMode>,
}

impl Columns for TextureData {
    type Id = TextureId;
    type Changes = TextureChanges;
    const NAME: &'static str = "Textures";

    fn resize(&mut self, capacity: usize) {
        self.images.resize(capacity, ImageId::INVALID);
        self.magnification_filters.resize(capacity, MagnificationFilter::default());
        self.minification_filters.resize(capacity, MinificationFilter::default());
        self.wrap_u.resize(capacity, WrapMode::default());
        self.wrap_v.resize(capacity, WrapMode::default());
    }
}

pub type Textures = Table<TextureData>;

impl Table<TextureData> {
    pub fn create_2d(
        &mut self,
        image: ImageId,
        magnification_filter: MagnificationFilter,
        minification_filter: MinificationFilter,
        wrap_u: WrapMode,
        wrap_v: WrapMode,
    ) -> TextureId {
        let Some((id, index)) = self.acquire() else {
            return TextureId::INVALID;
        };
        let c = &mut self.columns;
        c.images[index] = image;
        c.magnification_filters[index] = magnification_filter;
        c.minification_filters[index] = minification_filter;
        c.wrap_u[index] = wrap_u;
        c.wrap_v[index] = wrap_v;
        id
    }

    /// A bilinear texture repeating in both directions.
    pub fn create_2d_default(&mut self, image: ImageId) -> TextureId {
        self.create_2d(
            image,
            MagnificationFilter::Linear,
            MinificationFilter::Linear,
            WrapMode::Repeat,
            WrapMode::Repeat,
        )
    }

    pub fn destroy(&mut self, id: TextureId) {
        self.release(id);
    }

    #[must_use]
    pub fn get_image_id(&self, id: TextureId) -> ImageId {
        self.columns.images[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_magnification_filter(&self, id: TextureId) -> MagnificationFilter {
        self.columns.magnification_filters[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_minification_filter(&self, id: TextureId) -> MinificationFilter {
        self.columns.minification_filters[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_wrapmode_u(&self, id: TextureId) -> WrapMode {
        self.columns.wrap_u[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_wrapmode_v(&self, id: TextureId) -> WrapMode {
        self.columns.wrap_v[self.slot_or_dummy(id)]
    }

    /// Samples the texture's image at `uv` in linear RGBA.
    ///
    /// Pixel centres sit at half-integer coordinates. Magnification filter
    /// `None` picks the nearest pixel, `Linear` blends the four nearest.
    /// Dead textures and images sample as transparent black.
    #[must_use]
    pub fn sample_2d(&self, images: &Images, id: TextureId, uv: Vec2) -> Vec4 {
        let Some(index) = self.slot(id) else {
            return Vec4::ZERO;
        };
        let image = self.columns.images[index];
        let size = images.get_size(image);
        if size.x == 0 || size.y == 0 {
            return Vec4::ZERO;
        }

        filter_2d(
            size,
            self.columns.magnification_filters[index],
            self.columns.wrap_u[index],
            self.columns.wrap_v[index],
            uv,
            |coord| images.get_pixel(image, coord),
        )
    }
}

/// Filters a `size` pixel grid at `uv`, reading pixels through `fetch`.
pub(crate) fn filter_2d(
    size: UVec2,
    filter: MagnificationFilter,
    wrap_u: WrapMode,
    wrap_v: WrapMode,
    uv: Vec2,
    fetch: impl Fn(UVec2) -> Vec4,
) -> Vec4 {
    let texel = |pixel: IVec2| fetch(UVec2::new(wrap_u.apply(pixel.x, size.x), wrap_v.apply(pixel.y, size.y)));

    let position = uv * size.as_vec2();
    match filter {
        MagnificationFilter::None => texel(position.floor().as_ivec2()),
        MagnificationFilter::Linear => {
            let position = position - 0.5;
            let base = position.floor();
            let t = position - base;
            let base = base.as_ivec2();

            let lower = texel(base).lerp(texel(base + IVec2::X), t.x);
            let upper = texel(base + IVec2::Y).lerp(texel(base + IVec2::ONE), t.x);
            lower.lerp(upper, t.y)
        }
    }
}
