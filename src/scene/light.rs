//! Light sources.
//!
//! A light is attached to a scene node; its position and, for spot and
//! directional lights, its direction come from the node's global transform.
//! Lights shine along the node's forward axis (-Z).

use glam::Vec3;

use crate::core::id::EntityId;
use crate::core::table::{Columns, Table};
use crate::scene::node::SceneNodeId;

crate::define_id! {
    /// Identifies a light source.
    pub struct LightSourceId;
}

crate::change_flags! {
    pub struct LightSourceChanges {
        const UPDATED = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightKind {
    #[default]
    Point,
    Sphere,
    Spot,
    Directional,
}

#[derive(Debug, Default)]
pub struct LightSourceData {
    nodes: Vec<SceneNodeId>,
    // Radiant power in watts, or irradiance for directional lights.
    powers: Vec<Vec3>,
    radii: Vec<f32>,
    cone_angles: Vec<f32>,
    kinds: Vec<LightKind>,
}

impl Columns for LightSourceData {
    type Id = LightSourceId;
    type Changes = LightSourceChanges;
    const NAME: &'static str = "LightSources";

    fn resize(&mut self, capacity: usize) {
        self.nodes.resize(capacity, SceneNodeId::INVALID);
        self.powers.resize(capacity, Vec3::ZERO);
        self.radii.resize(capacity, 0.0);
        self.cone_angles.resize(capacity, 0.0);
        self.kinds.resize(capacity, LightKind::Point);
    }
}

pub type LightSources = Table<LightSourceData>;

impl Table<LightSourceData> {
    fn create(&mut self, node: SceneNodeId, kind: LightKind, power: Vec3, radius: f32, cone_angle: f32) -> LightSourceId {
        let Some((id, index)) = self.acquire() else {
            return LightSourceId::INVALID;
        };
        let c = &mut self.columns;
        c.nodes[index] = node;
        c.powers[index] = power;
        c.radii[index] = radius.max(0.0);
        c.cone_angles[index] = cone_angle;
        c.kinds[index] = kind;
        id
    }

    /// An infinitely small light emitting `power` uniformly in all directions.
    pub fn create_point_light(&mut self, node: SceneNodeId, power: Vec3) -> LightSourceId {
        self.create(node, LightKind::Point, power, 0.0, 0.0)
    }

    pub fn create_sphere_light(&mut self, node: SceneNodeId, power: Vec3, radius: f32) -> LightSourceId {
        self.create(node, LightKind::Sphere, power, radius, 0.0)
    }

    /// A disk of `radius` emitting into a cone of half-angle `cone_angle` radians.
    pub fn create_spot_light(&mut self, node: SceneNodeId, power: Vec3, radius: f32, cone_angle: f32) -> LightSourceId {
        self.create(node, LightKind::Spot, power, radius, cone_angle.clamp(0.0, std::f32::consts::FRAC_PI_2))
    }

    /// A light infinitely far away along the node's backward axis.
    pub fn create_directional_light(&mut self, node: SceneNodeId, irradiance: Vec3) -> LightSourceId {
        self.create(node, LightKind::Directional, irradiance, 0.0, 0.0)
    }

    pub fn destroy(&mut self, id: LightSourceId) {
        self.release(id);
    }

    #[must_use]
    pub fn get_type(&self, id: LightSourceId) -> LightKind {
        self.columns.kinds[self.slot_or_dummy(id)]
    }

    /// The scene node the light is attached to.
    #[must_use]
    pub fn get_node_id(&self, id: LightSourceId) -> SceneNodeId {
        self.columns.nodes[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_power(&self, id: LightSourceId) -> Vec3 {
        self.columns.powers[self.slot_or_dummy(id)]
    }

    pub fn set_power(&mut self, id: LightSourceId, power: Vec3) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.powers[index] = power;
            self.flag(index, LightSourceChanges::UPDATED);
        }
    }

    #[must_use]
    pub fn get_radius(&self, id: LightSourceId) -> f32 {
        self.columns.radii[self.slot_or_dummy(id)]
    }

    /// Only meaningful for sphere and spot lights.
    pub fn set_radius(&mut self, id: LightSourceId, radius: f32) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.radii[index] = radius.max(0.0);
            self.flag(index, LightSourceChanges::UPDATED);
        }
    }

    #[must_use]
    pub fn get_cone_angle(&self, id: LightSourceId) -> f32 {
        self.columns.cone_angles[self.slot_or_dummy(id)]
    }

    pub fn set_cone_angle(&mut self, id: LightSourceId, cone_angle: f32) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.cone_angles[index] = cone_angle.clamp(0.0, std::f32::consts::FRAC_PI_2);
            self.flag(index, LightSourceChanges::UPDATED);
        }
    }

    /// True for lights that cannot be hit by a ray: points, zero-radius
    /// spheres and spots, and directional lights.
    #[must_use]
    pub fn is_delta_light(&self, id: LightSourceId) -> bool {
        match self.get_type(id) {
            LightKind::Point | LightKind::Directional => true,
            LightKind::Sphere | LightKind::Spot => self.get_radius(id) <= 0.0,
        }
    }

    /// Live lights attached to `node`.
    pub fn lights_on_node(&self, node: SceneNodeId) -> impl Iterator<Item = LightSourceId> + '_ {
        self.get_iterable().filter(move |&id| self.columns.nodes[id.index()] == node)
    }
}
