//! Procedural mesh generators.
//!
//! Every generator produces a unit-sized shape centred on the origin and
//! returns the sentinel when asked for zero quads. `flags` selects which
//! vertex buffers are kept; positions are always generated to compute the
//! bounds.

use std::f32::consts::{PI, TAU};

use glam::{UVec3, Vec2, Vec3};

use crate::assets::mesh::{Mesh, MeshFlags, MeshId, Meshes};
use crate::math::Aabb;

#[derive(Default)]
struct MeshBuilder {
    primitives: Vec<UVec3>,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    texcoords: Vec<Vec2>,
}

impl MeshBuilder {
    fn with_capacity(primitive_count: usize, vertex_count: usize) -> Self {
        Self {
            primitives: Vec::with_capacity(primitive_count),
            positions: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(vertex_count),
            texcoords: Vec::with_capacity(vertex_count),
        }
    }

    fn vertex(&mut self, position: Vec3, normal: Vec3, texcoord: Vec2) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.texcoords.push(texcoord);
        index
    }

    fn build(self, meshes: &mut Meshes, name: &str, flags: MeshFlags, bounds: Option<Aabb>) -> MeshId {
        let vertex_count = self.positions.len();
        let mut mesh = Mesh::new(0, vertex_count, flags & MeshFlags::TANGENT);
        let bounds = bounds.unwrap_or_else(|| Aabb::from_points(&self.positions));

        if let Some(tangents) = mesh.tangents.as_mut() {
            for (tangent, normal) in tangents.iter_mut().zip(&self.normals) {
                *tangent = orthogonal_tangent(*normal).extend(1.0);
            }
        }
        mesh.primitives = self.primitives;
        mesh.positions = flags.contains(MeshFlags::POSITION).then_some(self.positions);
        mesh.normals = flags.contains(MeshFlags::NORMAL).then_some(self.normals);
        mesh.texcoords = flags.contains(MeshFlags::TEXCOORD).then_some(self.texcoords);

        meshes.create_from(name, mesh, bounds)
    }
}

fn orthogonal_tangent(normal: Vec3) -> Vec3 {
    let helper = if normal.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
    (helper - normal * normal.dot(helper)).normalize_or_zero()
}

fn reject_empty(kind: &str, quads: &[u32]) -> bool {
    if quads.contains(&0) {
        log::warn!("{kind}: cannot build a mesh with zero quads along an edge");
        return true;
    }
    false
}

/// A `1 x 1` quad grid per quad in the XZ plane, facing +Y, centred on the
/// origin.
pub fn plane(meshes: &mut Meshes, quads_per_edge: u32, flags: MeshFlags) -> MeshId {
    if reject_empty("plane", &[quads_per_edge]) {
        return MeshId::INVALID;
    }

    let size = quads_per_edge + 1;
    let half = quads_per_edge as f32 * 0.5;
    let texcoord_scale = 1.0 / quads_per_edge as f32;
    let mut builder =
        MeshBuilder::with_capacity((quads_per_edge * quads_per_edge * 2) as usize, (size * size) as usize);

    for z in 0..size {
        for x in 0..size {
            builder.vertex(
                Vec3::new(x as f32 - half, 0.0, z as f32 - half),
                Vec3::Y,
                Vec2::new(x as f32, z as f32) * texcoord_scale,
            );
        }
    }

    for z in 0..quads_per_edge {
        for x in 0..quads_per_edge {
            let base = x + z * size;
            builder.primitives.push(UVec3::new(base, base + size, base + 1));
            builder.primitives.push(UVec3::new(base + 1, base + size, base + size + 1));
        }
    }

    builder.build(meshes, "Plane", flags, None)
}

/// A unit cube spanning `[-0.5, 0.5]^3` with `quads_per_edge^2` quads per side.
pub fn cube(meshes: &mut Meshes, quads_per_edge: u32, flags: MeshFlags) -> MeshId {
    if reject_empty("cube", &[quads_per_edge]) {
        return MeshId::INVALID;
    }

    // (normal, u, v) with u x v == normal, so the grid winds counter-clockwise
    // seen from outside.
    const SIDES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let verts_per_edge = quads_per_edge + 1;
    let scale = 1.0 / quads_per_edge as f32;
    let mut builder = MeshBuilder::with_capacity(
        (quads_per_edge * quads_per_edge * 12) as usize,
        (verts_per_edge * verts_per_edge * 6) as usize,
    );

    for (normal, u, v) in SIDES {
        let side_offset = builder.positions.len() as u32;
        for i in 0..verts_per_edge {
            for j in 0..verts_per_edge {
                let s = j as f32 * scale;
                let t = i as f32 * scale;
                builder.vertex(
                    normal * 0.5 + u * (s - 0.5) + v * (t - 0.5),
                    normal,
                    Vec2::new(s, t),
                );
            }
        }

        for i in 0..quads_per_edge {
            for j in 0..quads_per_edge {
                let a = side_offset + j + i * verts_per_edge;
                let b = a + 1;
                let c = a + verts_per_edge;
                let d = c + 1;
                builder.primitives.push(UVec3::new(a, b, c));
                builder.primitives.push(UVec3::new(b, d, c));
            }
        }
    }

    let bounds = Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5));
    builder.build(meshes, "Cube", flags, Some(bounds))
}

/// A capped cylinder of radius 0.5 and height 1 around the Y axis.
pub fn cylinder(meshes: &mut Meshes, vertical_quads: u32, circumference_quads: u32, flags: MeshFlags) -> MeshId {
    if reject_empty("cylinder", &[vertical_quads, circumference_quads]) {
        return MeshId::INVALID;
    }

    let radius = 0.5;
    let ring: Vec<Vec3> = (0..circumference_quads)
        .map(|j| {
            let angle = j as f32 / circumference_quads as f32 * TAU;
            Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
        })
        .collect();

    let lid_vertices = circumference_quads + 1;
    let side_vertices = (vertical_quads + 1) * circumference_quads;
    let mut builder = MeshBuilder::with_capacity(
        (2 * circumference_quads + 2 * vertical_quads * circumference_quads) as usize,
        (2 * lid_vertices + side_vertices) as usize,
    );

    // Lids: a centre vertex followed by the rim.
    for (y, normal) in [(radius, Vec3::Y), (-radius, Vec3::NEG_Y)] {
        let centre = builder.vertex(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5));
        for p in &ring {
            builder.vertex(
                Vec3::new(p.x, y, p.z),
                normal,
                Vec2::new(p.x, p.z) + 0.5,
            );
        }
        for j in 0..circumference_quads {
            let current = centre + 1 + j;
            let next = centre + 1 + (j + 1) % circumference_quads;
            let primitive = if y > 0.0 {
                UVec3::new(centre, next, current)
            } else {
                UVec3::new(centre, current, next)
            };
            builder.primitives.push(primitive);
        }
    }

    let side_offset = builder.positions.len() as u32;
    for i in 0..=vertical_quads {
        let v = i as f32 / vertical_quads as f32;
        let y = radius - v * 2.0 * radius;
        for (j, p) in ring.iter().enumerate() {
            // Mirrored u so the texture wraps without a seam.
            let u = (1.0 - 2.0 * j as f32 / circumference_quads as f32).abs();
            builder.vertex(Vec3::new(p.x, y, p.z), p.normalize(), Vec2::new(u, v));
        }
    }

    for i in 0..vertical_quads {
        for j in 0..circumference_quads {
            let next_j = (j + 1) % circumference_quads;
            let i0 = side_offset + i * circumference_quads + j;
            let i1 = side_offset + (i + 1) * circumference_quads + j;
            let i2 = side_offset + i * circumference_quads + next_j;
            let i3 = side_offset + (i + 1) * circumference_quads + next_j;
            builder.primitives.push(UVec3::new(i0, i1, i3));
            builder.primitives.push(UVec3::new(i0, i3, i2));
        }
    }

    let bounds = Aabb::new(Vec3::splat(-radius), Vec3::splat(radius));
    builder.build(meshes, "Cylinder", flags, Some(bounds))
}

/// A sphere of radius 0.5 built by revolving a half circle around the Y axis.
pub fn revolved_sphere(meshes: &mut Meshes, longitude_quads: u32, latitude_quads: u32, flags: MeshFlags) -> MeshId {
    if reject_empty("revolved_sphere", &[longitude_quads, latitude_quads]) {
        return MeshId::INVALID;
    }

    let columns = longitude_quads + 1;
    let mut builder = MeshBuilder::with_capacity(
        (2 * longitude_quads * latitude_quads) as usize,
        (columns * (latitude_quads + 1)) as usize,
    );

    for i in 0..=latitude_quads {
        let v = i as f32 / latitude_quads as f32;
        let (sin_theta, cos_theta) = (v * PI).sin_cos();
        for j in 0..=longitude_quads {
            let u = j as f32 / longitude_quads as f32;
            let (sin_phi, cos_phi) = (u * TAU).sin_cos();
            let normal = Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi);
            builder.vertex(normal * 0.5, normal, Vec2::new(u, v));
        }
    }

    for i in 0..latitude_quads {
        for j in 0..longitude_quads {
            let a = i * columns + j;
            let b = a + 1;
            let c = a + columns;
            let d = c + 1;
            builder.primitives.push(UVec3::new(a, b, c));
            builder.primitives.push(UVec3::new(b, d, c));
        }
    }

    builder.build(meshes, "RevolvedSphere", flags, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meshes() -> Meshes {
        let mut meshes = Meshes::new();
        meshes.allocate(4);
        meshes
    }

    #[test]
    fn plane_grid_is_unit_spaced() {
        let mut meshes = meshes();
        let id = plane(&mut meshes, 2, MeshFlags::ALL_BUFFERS);
        let mesh = meshes.get_mesh(id);
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.primitive_count(), 8);
        assert_eq!(meshes.get_bounds(id), Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0)));
    }

    #[test]
    fn indices_stay_in_range() {
        let mut meshes = meshes();
        let ids = [
            plane(&mut meshes, 3, MeshFlags::POSITION),
            cube(&mut meshes, 2, MeshFlags::POSITION),
            cylinder(&mut meshes, 2, 8, MeshFlags::POSITION),
            revolved_sphere(&mut meshes, 8, 4, MeshFlags::POSITION),
        ];
        for id in ids {
            let mesh = meshes.get_mesh(id);
            let max = mesh.primitives.iter().map(|p| p.max_element()).max().unwrap_or(0);
            assert!((max as usize) < mesh.vertex_count(), "{}", meshes.name(id));
        }
    }

    #[test]
    fn flags_select_buffers() {
        let mut meshes = meshes();
        let id = cube(&mut meshes, 1, MeshFlags::POSITION | MeshFlags::TANGENT);
        assert_eq!(meshes.get_mesh(id).flags(), MeshFlags::POSITION | MeshFlags::TANGENT);
    }

    #[test]
    fn zero_quads_yield_sentinel() {
        let mut meshes = meshes();
        assert_eq!(plane(&mut meshes, 0, MeshFlags::ALL_BUFFERS), MeshId::INVALID);
        assert_eq!(cylinder(&mut meshes, 1, 0, MeshFlags::ALL_BUFFERS), MeshId::INVALID);
        assert!(meshes.is_empty());
    }
}
