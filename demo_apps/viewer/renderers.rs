//! Stub renderers.
//!
//! No GPU work happens here. Each renderer mirrors the database the way a
//! real back-end would: it uploads what was created, refreshes what
//! changed, drops what was destroyed and then walks its cameras in paint
//! order.

use std::fmt;

use strata::assets::{LatLongDistribution, MaterialChanges, MaterialParams, MeshChanges, MeshModelChanges};
use strata::core::EntityId;
use strata::math::rng;
use strata::scene::{CameraChanges, CameraId, RendererId, SceneRootChanges};
use strata::{Engine, SceneDatabase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Rasterizer,
    PathTracer,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Rasterizer => "Rasterizer",
            Backend::PathTracer => "PathTracer",
        })
    }
}

/// Attached to the renderer's table entry so other code can ask what is
/// behind a [`RendererId`].
#[derive(Debug)]
pub struct RendererInfo {
    pub backend: Backend,
}

#[derive(Debug, Default, Clone, Copy)]
struct GpuMesh {
    vertex_count: usize,
    index_count: usize,
}

/// Host-side mirror of the scene, indexed by entity index.
///
/// The back-end is read from the [`RendererInfo`] attached to the renderer's
/// table entry each frame; a renderer whose entry is gone stops drawing.
pub struct StubRenderer {
    id: RendererId,
    meshes: Vec<Option<GpuMesh>>,
    materials: Vec<Option<MaterialParams>>,
    models: Vec<bool>,
    // Importance sampling tables of the environment, path tracer only.
    environment: Option<LatLongDistribution>,
    frames: u64,
}

fn slot<T: Default + Clone>(storage: &mut Vec<T>, index: usize) -> &mut T {
    if storage.len() <= index {
        storage.resize(index + 1, T::default());
    }
    &mut storage[index]
}

impl StubRenderer {
    pub fn new(id: RendererId) -> Self {
        Self {
            id,
            meshes: Vec::new(),
            materials: Vec::new(),
            models: Vec::new(),
            environment: None,
            frames: 0,
        }
    }

    pub fn render(&mut self, engine: &Engine) {
        let database = engine.database();
        let Some(info) = database.renderers.get_implementation_as::<RendererInfo>(self.id) else {
            return;
        };
        let backend = info.backend;
        self.handle_updates(database, backend);

        let mut drawn_cameras = 0;
        for camera in database.cameras.get_z_sorted() {
            if database.camera_renderer(camera) != self.id {
                continue;
            }
            if database.cameras.get_viewport(camera).is_empty() {
                continue;
            }

            let changes = database.cameras.get_changes(camera);
            if changes.intersects(CameraChanges::PROJECTION | CameraChanges::EFFECTS | CameraChanges::RENDERER) {
                log::debug!("{backend}: camera '{}' changed: {:?}", database.cameras.name(camera), changes);
            }

            let visible = self.count_visible_models(database, camera);
            log::trace!(
                "{backend}: camera '{}' draws {visible} models at z {}",
                database.cameras.name(camera),
                database.cameras.get_z_index(camera)
            );
            drawn_cameras += 1;
        }

        if drawn_cameras > 0 {
            self.frames += 1;
            if self.frames % 60 == 1 {
                let (vertices, indices) = self
                    .meshes
                    .iter()
                    .flatten()
                    .fold((0, 0), |(v, i), mesh| (v + mesh.vertex_count, i + mesh.index_count));
                log::info!(
                    "{backend}: frame {} ({vertices} vertices, {} triangles, {} models resident)",
                    self.frames,
                    indices / 3,
                    self.models.iter().filter(|&&resident| resident).count()
                );
            }
        }
    }

    fn handle_updates(&mut self, database: &SceneDatabase, backend: Backend) {
        for (mesh, changes) in database.meshes.get_changed_with_masks() {
            let entry = slot(&mut self.meshes, mesh.index());
            if changes.contains(MeshChanges::DESTROYED) {
                *entry = None;
            } else if changes.contains(MeshChanges::CREATED) {
                let data = database.meshes.get_mesh(mesh);
                *entry = Some(GpuMesh {
                    vertex_count: data.vertex_count(),
                    index_count: data.index_count(),
                });
                log::trace!("{backend}: uploaded mesh '{}' {:?}", database.meshes.name(mesh), entry);
            }
        }

        for (material, changes) in database.materials.changed_materials() {
            let entry = slot(&mut self.materials, material.index());
            *entry = if changes.contains(MaterialChanges::DESTROYED) {
                None
            } else {
                Some(database.materials.get_params(material))
            };
        }

        for (model, changes) in database.mesh_models.get_changed_with_masks() {
            let resident = !changes.contains(MeshModelChanges::DESTROYED)
                && database.meshes.has(database.mesh_models.get_mesh_id(model));
            *slot(&mut self.models, model.index()) = resident;
        }

        if backend == Backend::PathTracer {
            self.handle_environment_updates(database, backend);
        }
    }

    fn handle_environment_updates(&mut self, database: &SceneDatabase, backend: Backend) {
        for (scene, changes) in database.scene_roots.get_changed_with_masks() {
            if changes.contains(SceneRootChanges::DESTROYED) {
                continue;
            }
            let map = database.scene_roots.get_environment_map(scene);
            if !database.textures.has(map) {
                self.environment = None;
                continue;
            }

            let distribution = LatLongDistribution::new(&database.textures, &database.images, map);
            // Average pdf of a few samples, as a sanity check of the tables.
            let samples = 16;
            let mean_pdf = (0..samples)
                .map(|i| distribution.sample(rng::sample02(i)).pdf)
                .sum::<f32>()
                / samples as f32;
            log::info!(
                "{backend}: environment of '{}' is {:?} texels, mean sample pdf {mean_pdf:.3}",
                database.scene_roots.name(scene),
                distribution.size()
            );
            self.environment = Some(distribution);
        }
    }

    fn count_visible_models(&self, database: &SceneDatabase, camera: CameraId) -> usize {
        let view = database.cameras.get_view_transform(camera);
        database
            .mesh_models
            .get_iterable()
            .filter(|model| self.models.get(model.index()).copied().unwrap_or(false))
            .filter(|&model| {
                let mesh = database.mesh_models.get_mesh_id(model);
                let material = database.mesh_models.get_material_id(model);
                let uploaded = self.meshes.get(mesh.index()).is_some_and(Option::is_some);
                let coverage = self
                    .materials
                    .get(material.index())
                    .and_then(|params| params.map(|params| params.coverage))
                    .unwrap_or(1.0);
                uploaded && coverage > 0.0
            })
            .filter(|&model| {
                let bounds = database.meshes.get_bounds(database.mesh_models.get_mesh_id(model));
                let world = bounds.transform(&database.mesh_model_transform(model));
                // Anything reaching in front of the camera counts as visible.
                world.is_valid() && world.transform(&view).min.z < 0.0
            })
            .count()
    }
}
