//! Scene tables.
//!
//! - [`SceneNodes`]: the transform hierarchy
//! - [`SceneRoots`]: one entry per renderable scene, with its environment
//! - [`LightSources`]: lights attached to scene nodes
//! - [`Cameras`]: viewports, projections and post-process settings
//! - [`Renderers`]: the renderers cameras are assigned to

pub mod camera;
pub mod effects;
pub mod light;
pub mod node;
pub mod renderer;
pub mod root;
pub mod wrapper;

pub use camera::{CameraChanges, CameraId, Cameras, compute_perspective_projection};
pub use effects::{CameraEffectsSettings, ExposureMode, TonemappingMode};
pub use light::{LightKind, LightSourceChanges, LightSourceId, LightSources};
pub use node::{SceneNodeChanges, SceneNodeId, SceneNodes};
pub use renderer::{RendererHandle, RendererId, Renderers};
pub use root::{SceneRootChanges, SceneRootId, SceneRoots};
pub use wrapper::SceneNodeMut;
