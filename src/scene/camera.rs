//! Cameras.
//!
//! A camera views one scene root through a viewport, a rectangle in
//! normalized screen space. Cameras are painted in ascending z-index, with
//! ties broken by creation order, so a camera with a higher z-index draws
//! on top (e.g. picture-in-picture views).

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::core::id::EntityId;
use crate::core::table::{Columns, Table};
use crate::math::{Ray, Rect, Transform};
use crate::scene::effects::CameraEffectsSettings;
use crate::scene::renderer::RendererId;
use crate::scene::root::SceneRootId;

crate::define_id! {
    /// Identifies a camera.
    pub struct CameraId;
}

crate::change_flags! {
    pub struct CameraChanges {
        const TRANSFORM = 1 << 2;
        const PROJECTION = 1 << 3;
        const EFFECTS = 1 << 4;
        const RENDERER = 1 << 5;
        const VIEWPORT = 1 << 6;
    }
}

/// A right-handed perspective projection mapping depth to `[0, 1]` and its
/// analytic inverse.
#[must_use]
pub fn compute_perspective_projection(near: f32, far: f32, field_of_view: f32, aspect_ratio: f32) -> (Mat4, Mat4) {
    let projection = Mat4::perspective_rh(field_of_view, aspect_ratio, near, far);

    let a = projection.x_axis.x;
    let b = projection.y_axis.y;
    let c = projection.z_axis.z;
    let d = projection.w_axis.z;
    let inverse_projection = Mat4::from_cols(
        Vec4::new(1.0 / a, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 1.0 / b, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0 / d),
        Vec4::new(0.0, 0.0, -1.0, c / d),
    );

    (projection, inverse_projection)
}

#[derive(Debug, Default)]
pub struct CameraData {
    names: Vec<String>,
    scene_roots: Vec<SceneRootId>,
    renderers: Vec<RendererId>,
    transforms: Vec<Transform>,
    projections: Vec<Mat4>,
    inverse_projections: Vec<Mat4>,
    viewports: Vec<Rect>,
    z_indices: Vec<i32>,
    effects: Vec<CameraEffectsSettings>,
    creation_order: Vec<u64>,
    next_creation_order: u64,
}

impl Columns for CameraData {
    type Id = CameraId;
    type Changes = CameraChanges;
    const NAME: &'static str = "Cameras";

    fn resize(&mut self, capacity: usize) {
        self.names.resize(capacity, String::new());
        self.scene_roots.resize(capacity, SceneRootId::INVALID);
        self.renderers.resize(capacity, RendererId::INVALID);
        self.transforms.resize(capacity, Transform::IDENTITY);
        self.projections.resize(capacity, Mat4::IDENTITY);
        self.inverse_projections.resize(capacity, Mat4::IDENTITY);
        self.viewports.resize(capacity, Rect::FULL);
        self.z_indices.resize(capacity, 0);
        self.effects.resize(capacity, CameraEffectsSettings::default());
        self.creation_order.resize(capacity, 0);
    }
}

pub type Cameras = Table<CameraData>;

impl Table<CameraData> {
    /// Creates a full-screen camera at z-index 0 with default effects.
    ///
    /// The camera has no renderer assigned; the database resolves it to the
    /// first renderer until one is set.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        scene_root: SceneRootId,
        projection: Mat4,
        inverse_projection: Mat4,
    ) -> CameraId {
        let Some((id, index)) = self.acquire() else {
            return CameraId::INVALID;
        };
        let c = &mut self.columns;
        c.names[index] = name.into();
        c.scene_roots[index] = scene_root;
        c.renderers[index] = RendererId::INVALID;
        c.transforms[index] = Transform::IDENTITY;
        c.projections[index] = projection;
        c.inverse_projections[index] = inverse_projection;
        c.viewports[index] = Rect::FULL;
        c.z_indices[index] = 0;
        c.effects[index] = CameraEffectsSettings::default();
        c.creation_order[index] = c.next_creation_order;
        c.next_creation_order += 1;
        id
    }

    pub fn destroy(&mut self, id: CameraId) {
        self.release(id);
    }

    #[must_use]
    pub fn name(&self, id: CameraId) -> &str {
        &self.columns.names[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_scene_id(&self, id: CameraId) -> SceneRootId {
        self.columns.scene_roots[self.slot_or_dummy(id)]
    }

    /// The explicitly assigned renderer, or the sentinel.
    #[must_use]
    pub fn get_renderer_id(&self, id: CameraId) -> RendererId {
        self.columns.renderers[self.slot_or_dummy(id)]
    }

    pub fn set_renderer_id(&mut self, id: CameraId, renderer: RendererId) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.renderers[index] = renderer;
            self.flag(index, CameraChanges::RENDERER);
        }
    }

    // ========================================================================
    // Transform & projection
    // ========================================================================

    /// The camera's world transform. The camera looks down its local -Z.
    #[must_use]
    pub fn get_transform(&self, id: CameraId) -> Transform {
        self.columns.transforms[self.slot_or_dummy(id)]
    }

    pub fn set_transform(&mut self, id: CameraId, transform: Transform) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.transforms[index] = transform;
            self.flag(index, CameraChanges::TRANSFORM);
        }
    }

    /// World-to-camera transform.
    #[must_use]
    pub fn get_view_transform(&self, id: CameraId) -> Transform {
        self.get_transform(id).inverse()
    }

    #[must_use]
    pub fn get_projection_matrix(&self, id: CameraId) -> Mat4 {
        self.columns.projections[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_inverse_projection_matrix(&self, id: CameraId) -> Mat4 {
        self.columns.inverse_projections[self.slot_or_dummy(id)]
    }

    pub fn set_projection_matrices(&mut self, id: CameraId, projection: Mat4, inverse_projection: Mat4) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.projections[index] = projection;
            self.columns.inverse_projections[index] = inverse_projection;
            self.flag(index, CameraChanges::PROJECTION);
        }
    }

    #[must_use]
    pub fn get_view_projection_matrix(&self, id: CameraId) -> Mat4 {
        self.get_projection_matrix(id) * self.get_view_transform(id).to_mat4()
    }

    /// World-space ray through `viewport_point`, given in `[0, 1]^2` relative
    /// to the camera's viewport with the origin at the lower left.
    #[must_use]
    pub fn ray_from_viewport_point(&self, id: CameraId, viewport_point: Vec2) -> Ray {
        let ndc = viewport_point * 2.0 - Vec2::ONE;
        let near_point = self
            .get_inverse_projection_matrix(id)
            .project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let transform = self.get_transform(id);
        Ray::new(
            transform.translation,
            transform.transform_direction(near_point.normalize_or_zero()),
        )
    }

    // ========================================================================
    // Viewport & ordering
    // ========================================================================

    #[must_use]
    pub fn get_viewport(&self, id: CameraId) -> Rect {
        self.columns.viewports[self.slot_or_dummy(id)]
    }

    /// Sets the viewport. An empty rectangle makes renderers skip the camera.
    pub fn set_viewport(&mut self, id: CameraId, viewport: Rect) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.viewports[index] = viewport;
            self.flag(index, CameraChanges::VIEWPORT);
        }
    }

    #[must_use]
    pub fn get_z_index(&self, id: CameraId) -> i32 {
        self.columns.z_indices[self.slot_or_dummy(id)]
    }

    pub fn set_z_index(&mut self, id: CameraId, z_index: i32) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.z_indices[index] = z_index;
            self.flag(index, CameraChanges::VIEWPORT);
        }
    }

    /// Live cameras in paint order: ascending z-index, then creation order.
    #[must_use]
    pub fn get_z_sorted(&self) -> Vec<CameraId> {
        let c = &self.columns;
        let mut cameras: Vec<CameraId> = self.get_iterable().collect();
        cameras.sort_by_key(|id| (c.z_indices[id.index()], c.creation_order[id.index()]));
        cameras
    }

    // ========================================================================
    // Effects
    // ========================================================================

    #[must_use]
    pub fn get_effects_settings(&self, id: CameraId) -> CameraEffectsSettings {
        self.columns.effects[self.slot_or_dummy(id)]
    }

    pub fn set_effects_settings(&mut self, id: CameraId, settings: CameraEffectsSettings) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.effects[index] = settings;
            self.flag(index, CameraChanges::EFFECTS);
        }
    }
}
