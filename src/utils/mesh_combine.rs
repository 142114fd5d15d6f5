//! Mesh combination.
//!
//! [`combine`] bakes a list of transformed meshes into one mesh.
//! [`combine_whole_scene`] merges every group of mesh models sharing a
//! material and a vertex layout into a single model, then destroys the
//! meshes, models and scene nodes that were merged away.

use glam::{UVec3, Vec4};
use rustc_hash::FxHashSet;

use crate::assets::mesh::{Mesh, MeshFlags, MeshId, Meshes};
use crate::assets::mesh_model::MeshModelId;
use crate::core::id::EntityId;
use crate::math::Transform;
use crate::scene::node::SceneNodeId;
use crate::world::SceneDatabase;

/// A mesh placed in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformedMesh {
    pub mesh: MeshId,
    pub transform: Transform,
}

/// Bakes `meshes` into a new mesh carrying the buffers named by `flags`.
///
/// Buffers requested by `flags` but missing from a source mesh are zero
/// filled. Positions are fully transformed, normals and tangents rotated.
/// Dead source meshes contribute nothing.
pub fn combine(storage: &mut Meshes, name: &str, meshes: &[TransformedMesh], flags: MeshFlags) -> MeshId {
    let (primitive_count, vertex_count) = meshes.iter().fold((0, 0), |(primitives, vertices), transformed| {
        let mesh = storage.get_mesh(transformed.mesh);
        (primitives + mesh.primitive_count(), vertices + mesh.vertex_count())
    });

    let mut combined = Mesh::new(primitive_count, vertex_count, flags);
    let mut primitive_offset = 0;
    let mut vertex_offset = 0;
    for transformed in meshes {
        let mesh = storage.get_mesh(transformed.mesh);
        let transform = &transformed.transform;
        let vertices = vertex_offset..vertex_offset + mesh.vertex_count();

        let base = vertex_offset as u32;
        for (dst, src) in combined.primitives[primitive_offset..].iter_mut().zip(&mesh.primitives) {
            *dst = *src + UVec3::splat(base);
        }

        if let (Some(dst), Some(src)) = (combined.positions.as_mut(), mesh.positions.as_ref()) {
            for (dst, src) in dst[vertices.clone()].iter_mut().zip(src) {
                *dst = transform.transform_point(*src);
            }
        }
        if let (Some(dst), Some(src)) = (combined.normals.as_mut(), mesh.normals.as_ref()) {
            for (dst, src) in dst[vertices.clone()].iter_mut().zip(src) {
                *dst = transform.rotation * *src;
            }
        }
        if let (Some(dst), Some(src)) = (combined.tangents.as_mut(), mesh.tangents.as_ref()) {
            for (dst, src) in dst[vertices.clone()].iter_mut().zip(src) {
                let rotated = transform.rotation * src.truncate();
                *dst = Vec4::new(rotated.x, rotated.y, rotated.z, src.w);
            }
        }
        if let (Some(dst), Some(src)) = (combined.texcoords.as_mut(), mesh.texcoords.as_ref()) {
            for (dst, src) in dst[vertices].iter_mut().zip(src) {
                *dst = *src;
            }
        }

        primitive_offset += mesh.primitive_count();
        vertex_offset += mesh.vertex_count();
    }

    let bounds = combined.compute_bounds();
    storage.create_from(name, combined, bounds)
}

#[derive(Debug, Clone, Copy)]
struct OrderedModel {
    key: u32,
    model: MeshModelId,
}

/// Sort key: material index in the high bits, mesh flags in the low 8 bits.
fn model_key(database: &SceneDatabase, model: MeshModelId) -> u32 {
    let material = database.mesh_models.get_material_id(model);
    let mesh = database.mesh_models.get_mesh_id(model);
    let flags = database.meshes.get_mesh(mesh).flags();
    ((material.index() as u32) << 8) | u32::from(flags.bits())
}

/// Merges every group of mesh models that share a material and mesh flags.
///
/// Each group with more than one model is replaced by a single model on a
/// new scene node parented to `scene_root`, whose mesh holds the group's
/// geometry baked in world space. The merged models, their scene nodes and
/// meshes no longer referenced by any model are destroyed. Returns the
/// number of models created.
pub fn combine_whole_scene(database: &mut SceneDatabase, scene_root: SceneNodeId) -> usize {
    database.scene_nodes.update_global_transforms();

    let mut ordered: Vec<OrderedModel> = database
        .mesh_models
        .get_iterable()
        .map(|model| OrderedModel {
            key: model_key(database, model),
            model,
        })
        .collect();
    ordered.sort_by_key(|ordered| ordered.key);

    let mut used_meshes = vec![false; database.meshes.capacity()];
    let mut merged_models = Vec::new();
    let mut created = 0;

    for group in ordered.chunk_by(|a, b| a.key == b.key) {
        if let [single] = group {
            let mesh = database.mesh_models.get_mesh_id(single.model);
            if let Some(used) = used_meshes.get_mut(mesh.index()) {
                *used = true;
            }
            continue;
        }

        let material = database.mesh_models.get_material_id(group[0].model);
        let material_name = database.materials.name(material).to_owned();
        let flags = MeshFlags::from_bits_truncate((group[0].key & 0xFF) as u8);

        let transformed: Vec<TransformedMesh> = group
            .iter()
            .map(|ordered| TransformedMesh {
                mesh: database.mesh_models.get_mesh_id(ordered.model),
                transform: database.mesh_model_transform(ordered.model),
            })
            .collect();

        let merged_mesh = combine(
            &mut database.meshes,
            &format!("{material_name}_combined_mesh"),
            &transformed,
            flags,
        );
        if merged_mesh.is_sentinel() {
            log::error!("Could not combine {} models using material {material}", group.len());
            for ordered in group {
                let mesh = database.mesh_models.get_mesh_id(ordered.model);
                if let Some(used) = used_meshes.get_mut(mesh.index()) {
                    *used = true;
                }
            }
            continue;
        }

        // The geometry is already in world space.
        let merged_node = database
            .scene_nodes
            .create(format!("{material_name}_combined"), Transform::IDENTITY);
        database.scene_nodes.set_parent(merged_node, scene_root);
        database.scene_nodes.set_global_transform(merged_node, Transform::IDENTITY);

        database.mesh_models.create(merged_node, merged_mesh, material);
        if merged_mesh.index() >= used_meshes.len() {
            used_meshes.resize(merged_mesh.index() + 1, false);
        }
        used_meshes[merged_mesh.index()] = true;

        merged_models.extend(group.iter().map(|ordered| ordered.model));
        created += 1;
    }

    let unused: Vec<MeshId> = database
        .meshes
        .get_iterable()
        .filter(|mesh| !used_meshes.get(mesh.index()).copied().unwrap_or(false))
        .collect();
    for mesh in unused {
        database.meshes.destroy(mesh);
    }

    let mut orphaned_nodes: Vec<SceneNodeId> = Vec::with_capacity(merged_models.len());
    for model in merged_models {
        orphaned_nodes.push(database.mesh_models.get_scene_node_id(model));
        database.mesh_models.destroy(model);
    }
    // Nodes still carrying an unmerged model survive.
    let referenced: FxHashSet<SceneNodeId> = database
        .mesh_models
        .get_iterable()
        .map(|model| database.mesh_models.get_scene_node_id(model))
        .collect();
    for node in orphaned_nodes {
        if !referenced.contains(&node) {
            database.scene_nodes.destroy(node);
        }
    }

    log::info!("Combined mesh models into {created} merged models");
    created
}
