//! Asset tables.
//!
//! Meshes, materials, images and textures are shared between scenes; a
//! [`MeshModel`](mesh_model) places one mesh with one material on a scene
//! node. Cross-table references are stored as IDs and validated on read.

pub mod image;
pub mod latlong;
pub mod material;
pub mod mesh;
pub mod mesh_creation;
pub mod mesh_model;
pub mod texture;

pub use image::{ImageChanges, ImageId, Images, PixelFormat};
pub use latlong::{LatLongDistribution, LightSample};
pub use material::{MaterialChanges, MaterialFlags, MaterialId, MaterialParams, Materials};
pub use mesh::{Mesh, MeshChanges, MeshFlags, MeshId, Meshes};
pub use mesh_model::{MeshModelChanges, MeshModelId, MeshModels};
pub use texture::{MagnificationFilter, MinificationFilter, TextureId, Textures, WrapMode};
