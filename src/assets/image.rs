//! Images.
//!
//! Images are 2D pixel arrays in one of a handful of formats. 8-bit formats
//! store gamma-encoded values and are decoded to linear on read; float
//! formats are linear. All pixel accessors work in linear RGBA.

use glam::{UVec2, Vec4};

use crate::core::table::{Columns, Table};
use crate::errors::{Result, StrataError};

crate::define_id! {
    /// Identifies an image.
    pub struct ImageId;
}

crate::change_flags! {
    pub struct ImageChanges {
        const PIXELS = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    #[default]
    Unknown,
    /// Single channel intensity, one byte.
    I8,
    RGB24,
    RGBA32,
    RGBFloat,
    RGBAFloat,
}

impl PixelFormat {
    #[must_use]
    pub fn channel_count(self) -> usize {
        match self {
            Self::Unknown => 0,
            Self::I8 => 1,
            Self::RGB24 | Self::RGBFloat => 3,
            Self::RGBA32 | Self::RGBAFloat => 4,
        }
    }

    /// Bytes per pixel.
    #[must_use]
    pub fn size_of(self) -> usize {
        if self.is_float() {
            self.channel_count() * std::mem::size_of::<f32>()
        } else {
            self.channel_count()
        }
    }

    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, Self::RGBFloat | Self::RGBAFloat)
    }
}

/// Pixel storage. Float formats keep `f32` alignment.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    Bytes(Vec<u8>),
    Floats(Vec<f32>),
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::Bytes(Vec::new())
    }
}

impl PixelBuffer {
    fn zeroed(format: PixelFormat, pixel_count: usize) -> Self {
        let len = pixel_count * format.channel_count();
        if format.is_float() {
            Self::Floats(vec![0.0; len])
        } else {
            Self::Bytes(vec![0; len])
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Bytes(bytes) => bytes,
            Self::Floats(floats) => bytemuck::cast_slice(floats),
        }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Self::Bytes(bytes) => bytes,
            Self::Floats(floats) => bytemuck::cast_slice_mut(floats),
        }
    }

    #[must_use]
    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            Self::Bytes(_) => None,
            Self::Floats(floats) => Some(floats),
        }
    }
}

#[derive(Debug, Default)]
pub struct ImageData {
    names: Vec<String>,
    sizes: Vec<UVec2>,
    formats: Vec<PixelFormat>,
    gammas: Vec<f32>,
    mipmapable: Vec<bool>,
    pixels: Vec<PixelBuffer>,
}

impl Columns for ImageData {
    type Id = ImageId;
    type Changes = ImageChanges;
    const NAME: &'static str = "Images";

    fn resize(&mut self, capacity: usize) {
        self.names.resize(capacity, String::new());
        self.sizes.resize(capacity, UVec2::ZERO);
        self.formats.resize(capacity, PixelFormat::Unknown);
        self.gammas.resize(capacity, 1.0);
        self.mipmapable.resize(capacity, false);
        self.pixels.resize_with(capacity, PixelBuffer::default);
    }
}

pub type Images = Table<ImageData>;

#[inline]
fn decode_byte(value: u8, gamma: f32) -> f32 {
    (f32::from(value) / 255.0).powf(gamma)
}

#[inline]
fn encode_byte(value: f32, gamma: f32) -> u8 {
    (value.clamp(0.0, 1.0).powf(1.0 / gamma) * 255.0).round() as u8
}

impl Table<ImageData> {
    /// Creates an image with zeroed pixels. Returns the sentinel for
    /// [`PixelFormat::Unknown`] or when the table is full.
    pub fn create_2d(&mut self, name: impl Into<String>, format: PixelFormat, gamma: f32, size: UVec2) -> ImageId {
        if format == PixelFormat::Unknown {
            log::warn!("Images: refusing to create an image with an unknown pixel format");
            return ImageId::INVALID;
        }
        let Some((id, index)) = self.acquire() else {
            return ImageId::INVALID;
        };
        let c = &mut self.columns;
        c.names[index] = name.into();
        c.sizes[index] = size;
        c.formats[index] = format;
        c.gammas[index] = gamma;
        c.mipmapable[index] = false;
        c.pixels[index] = PixelBuffer::zeroed(format, (size.x * size.y) as usize);
        id
    }

    /// Creates an image from raw pixel bytes laid out row by row.
    pub fn create_2d_with_pixels(
        &mut self,
        name: impl Into<String>,
        format: PixelFormat,
        gamma: f32,
        size: UVec2,
        bytes: &[u8],
    ) -> Result<ImageId> {
        if format == PixelFormat::Unknown {
            return Err(StrataError::UnsupportedPixelFormat(format));
        }
        let expected = (size.x * size.y) as usize * format.size_of();
        if bytes.len() != expected {
            return Err(StrataError::ImageSizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        let id = self.create_2d(name, format, gamma, size);
        let index = self.slot(id).ok_or(StrataError::CapacityExhausted {
            table: ImageData::NAME,
        })?;
        self.columns.pixels[index].as_bytes_mut().copy_from_slice(bytes);
        Ok(id)
    }

    /// Destroys the image and frees its pixels.
    pub fn destroy(&mut self, id: ImageId) {
        if let Some(index) = self.release(id) {
            self.columns.pixels[index] = PixelBuffer::default();
        }
    }

    #[must_use]
    pub fn name(&self, id: ImageId) -> &str {
        &self.columns.names[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_size(&self, id: ImageId) -> UVec2 {
        self.columns.sizes[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_width(&self, id: ImageId) -> u32 {
        self.get_size(id).x
    }

    #[must_use]
    pub fn get_height(&self, id: ImageId) -> u32 {
        self.get_size(id).y
    }

    #[must_use]
    pub fn get_pixel_count(&self, id: ImageId) -> usize {
        let size = self.get_size(id);
        (size.x * size.y) as usize
    }

    #[must_use]
    pub fn get_pixel_format(&self, id: ImageId) -> PixelFormat {
        self.columns.formats[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_gamma(&self, id: ImageId) -> f32 {
        self.columns.gammas[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn is_mipmapable(&self, id: ImageId) -> bool {
        self.columns.mipmapable[self.slot_or_dummy(id)]
    }

    pub fn set_mipmapable(&mut self, id: ImageId, value: bool) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.mipmapable[index] = value;
        }
    }

    /// Raw pixel bytes. Empty for dead IDs.
    #[must_use]
    pub fn get_pixels(&self, id: ImageId) -> &[u8] {
        self.columns.pixels[self.slot_or_dummy(id)].as_bytes()
    }

    /// Mutable raw pixel bytes. Raises `PIXELS` on the assumption that the
    /// caller writes through them.
    pub fn get_pixels_mut(&mut self, id: ImageId) -> Option<&mut [u8]> {
        let index = self.slot_for_write(id)?;
        self.flag(index, ImageChanges::PIXELS);
        Some(self.columns.pixels[index].as_bytes_mut())
    }

    /// Float pixels of float formats.
    #[must_use]
    pub fn get_float_pixels(&self, id: ImageId) -> Option<&[f32]> {
        self.columns.pixels[self.slot_or_dummy(id)].as_floats()
    }

    /// The linear RGBA value of the pixel at `coord`. Out-of-range
    /// coordinates and dead IDs read as transparent black.
    #[must_use]
    pub fn get_pixel(&self, id: ImageId, coord: UVec2) -> Vec4 {
        let Some(index) = self.slot(id) else {
            return Vec4::ZERO;
        };
        let c = &self.columns;
        let size = c.sizes[index];
        if coord.x >= size.x || coord.y >= size.y {
            return Vec4::ZERO;
        }

        let format = c.formats[index];
        let gamma = c.gammas[index];
        let offset = (coord.x + coord.y * size.x) as usize * format.channel_count();
        match &c.pixels[index] {
            PixelBuffer::Bytes(bytes) => {
                let channel = |i: usize| decode_byte(bytes[offset + i], gamma);
                match format {
                    PixelFormat::I8 => {
                        let v = channel(0);
                        Vec4::new(v, v, v, 1.0)
                    }
                    PixelFormat::RGB24 => Vec4::new(channel(0), channel(1), channel(2), 1.0),
                    PixelFormat::RGBA32 => Vec4::new(channel(0), channel(1), channel(2), f32::from(bytes[offset + 3]) / 255.0),
                    _ => Vec4::ZERO,
                }
            }
            PixelBuffer::Floats(floats) => match format {
                PixelFormat::RGBFloat => Vec4::new(floats[offset], floats[offset + 1], floats[offset + 2], 1.0),
                PixelFormat::RGBAFloat => Vec4::from_slice(&floats[offset..offset + 4]),
                _ => Vec4::ZERO,
            },
        }
    }

    /// Writes a linear RGBA value. Single channel formats store `x`.
    pub fn set_pixel(&mut self, id: ImageId, color: Vec4, coord: UVec2) {
        let Some(index) = self.slot_for_write(id) else {
            return;
        };
        let c = &mut self.columns;
        let size = c.sizes[index];
        if coord.x >= size.x || coord.y >= size.y {
            return;
        }

        let format = c.formats[index];
        let gamma = c.gammas[index];
        let channels = format.channel_count();
        let offset = (coord.x + coord.y * size.x) as usize * channels;
        match &mut c.pixels[index] {
            PixelBuffer::Bytes(bytes) => {
                for i in 0..channels.min(3) {
                    bytes[offset + i] = encode_byte(color[i], gamma);
                }
                if format == PixelFormat::RGBA32 {
                    bytes[offset + 3] = (color.w.clamp(0.0, 1.0) * 255.0).round() as u8;
                }
            }
            PixelBuffer::Floats(floats) => {
                floats[offset..offset + channels].copy_from_slice(&color.to_array()[..channels]);
            }
        }
        self.flag(index, ImageChanges::PIXELS);
    }

    /// Converts the pixels of `id` to `format`, keeping gamma and size.
    pub fn change_format(&mut self, id: ImageId, format: PixelFormat) -> Result<()> {
        if format == PixelFormat::Unknown {
            return Err(StrataError::UnsupportedPixelFormat(format));
        }
        let Some(index) = self.slot(id) else {
            return Err(StrataError::InvalidId {
                table: ImageData::NAME,
                id: id.to_string(),
            });
        };
        if self.columns.formats[index] == format {
            return Ok(());
        }

        let size = self.columns.sizes[index];
        let colors: Vec<Vec4> = (0..size.y)
            .flat_map(|y| (0..size.x).map(move |x| UVec2::new(x, y)))
            .map(|coord| self.get_pixel(id, coord))
            .collect();

        self.columns.formats[index] = format;
        self.columns.pixels[index] = PixelBuffer::zeroed(format, colors.len());
        for (i, color) in colors.into_iter().enumerate() {
            let i = i as u32;
            self.set_pixel(id, color, UVec2::new(i % size.x, i / size.x));
        }
        self.flag(index, ImageChanges::PIXELS);
        Ok(())
    }
}
