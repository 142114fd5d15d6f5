//! Materials.
//!
//! A single physically based material model: a tinted, rough dielectric
//! blended with a metal by the `metallic` parameter. Coverage (opacity) is
//! a scalar optionally modulated by a single channel coverage texture.

use glam::Vec3;

use crate::assets::texture::TextureId;
use crate::core::table::{Columns, Table};

crate::define_id! {
    /// Identifies a material.
    pub struct MaterialId;
}

crate::change_flags! {
    pub struct MaterialChanges {
        const ATTRIBUTES = 1 << 2;
        const FLAGS = 1 << 3;
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MaterialFlags: u8 {
        /// Coverage is (near) binary and can be alpha tested.
        const CUTOUT = 1 << 0;
        const THIN_WALLED = 1 << 1;
    }
}

/// The user-facing material parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub tint: Vec3,
    pub tint_texture: TextureId,
    pub roughness: f32,
    pub specularity: f32,
    pub metallic: f32,
    pub coverage: f32,
    pub coverage_texture: TextureId,
    pub flags: MaterialFlags,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            tint: Vec3::ONE,
            tint_texture: TextureId::INVALID,
            roughness: 0.5,
            specularity: 0.04,
            metallic: 0.0,
            coverage: 1.0,
            coverage_texture: TextureId::INVALID,
            flags: MaterialFlags::empty(),
        }
    }
}

impl MaterialParams {
    #[must_use]
    pub fn with_tint(tint: Vec3) -> Self {
        Self {
            tint,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_cutout(&self) -> bool {
        self.flags.contains(MaterialFlags::CUTOUT)
    }
}

#[derive(Debug, Default)]
pub struct MaterialData {
    names: Vec<String>,
    params: Vec<MaterialParams>,
}

impl Columns for MaterialData {
    type Id = MaterialId;
    type Changes = MaterialChanges;
    const NAME: &'static str = "Materials";

    fn resize(&mut self, capacity: usize) {
        self.names.resize(capacity, String::new());
        self.params.resize(capacity, MaterialParams::default());
    }
}

pub type Materials = Table<MaterialData>;

impl Table<MaterialData> {
    pub fn create(&mut self, name: impl Into<String>, params: MaterialParams) -> MaterialId {
        let Some((id, index)) = self.acquire() else {
            return MaterialId::INVALID;
        };
        self.columns.names[index] = name.into();
        self.columns.params[index] = params;
        id
    }

    pub fn destroy(&mut self, id: MaterialId) {
        self.release(id);
    }

    #[must_use]
    pub fn name(&self, id: MaterialId) -> &str {
        &self.columns.names[self.slot_or_dummy(id)]
    }

    /// All parameters at once; the neutral defaults for dead IDs.
    #[must_use]
    pub fn get_params(&self, id: MaterialId) -> MaterialParams {
        self.columns.params[self.slot_or_dummy(id)]
    }

    /// Applies `update` to the parameters of `id` and raises `ATTRIBUTES`.
    fn update(&mut self, id: MaterialId, update: impl FnOnce(&mut MaterialParams)) {
        if let Some(index) = self.slot_for_write(id) {
            update(&mut self.columns.params[index]);
            self.flag(index, MaterialChanges::ATTRIBUTES);
        }
    }

    #[must_use]
    pub fn get_tint(&self, id: MaterialId) -> Vec3 {
        self.get_params(id).tint
    }

    pub fn set_tint(&mut self, id: MaterialId, tint: Vec3) {
        self.update(id, |p| p.tint = tint);
    }

    #[must_use]
    pub fn get_tint_texture_id(&self, id: MaterialId) -> TextureId {
        self.get_params(id).tint_texture
    }

    pub fn set_tint_texture_id(&mut self, id: MaterialId, texture: TextureId) {
        self.update(id, |p| p.tint_texture = texture);
    }

    #[must_use]
    pub fn get_roughness(&self, id: MaterialId) -> f32 {
        self.get_params(id).roughness
    }

    pub fn set_roughness(&mut self, id: MaterialId, roughness: f32) {
        self.update(id, |p| p.roughness = roughness);
    }

    #[must_use]
    pub fn get_specularity(&self, id: MaterialId) -> f32 {
        self.get_params(id).specularity
    }

    pub fn set_specularity(&mut self, id: MaterialId, specularity: f32) {
        self.update(id, |p| p.specularity = specularity);
    }

    #[must_use]
    pub fn get_metallic(&self, id: MaterialId) -> f32 {
        self.get_params(id).metallic
    }

    pub fn set_metallic(&mut self, id: MaterialId, metallic: f32) {
        self.update(id, |p| p.metallic = metallic);
    }

    #[must_use]
    pub fn get_coverage(&self, id: MaterialId) -> f32 {
        self.get_params(id).coverage
    }

    pub fn set_coverage(&mut self, id: MaterialId, coverage: f32) {
        self.update(id, |p| p.coverage = coverage);
    }

    #[must_use]
    pub fn get_coverage_texture_id(&self, id: MaterialId) -> TextureId {
        self.get_params(id).coverage_texture
    }

    pub fn set_coverage_texture_id(&mut self, id: MaterialId, texture: TextureId) {
        self.update(id, |p| p.coverage_texture = texture);
    }

    #[must_use]
    pub fn get_flags(&self, id: MaterialId) -> MaterialFlags {
        self.get_params(id).flags
    }

    pub fn set_flags(&mut self, id: MaterialId, flags: MaterialFlags) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.params[index].flags = flags;
            self.flag(index, MaterialChanges::FLAGS);
        }
    }

    #[must_use]
    pub fn is_cutout(&self, id: MaterialId) -> bool {
        self.get_flags(id).contains(MaterialFlags::CUTOUT)
    }

    /// Materials touched this tick with their change masks. Destroyed
    /// materials are included so renderers can release their resources.
    pub fn changed_materials(&self) -> impl Iterator<Item = (MaterialId, MaterialChanges)> + '_ {
        self.get_changed_with_masks()
    }
}
