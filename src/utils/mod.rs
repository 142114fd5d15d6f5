//! Scene utilities and the engine time model.
//!
//! - [`cutout`]: classification of coverage textures
//! - [`mesh_combine`]: merging mesh models that share a material
//! - [`time`]: real, smoothed and scaled tick deltas
//! - [`FpsCounter`]: frame rate over the last eight ticks

pub mod cutout;
pub mod fps_counter;
pub mod mesh_combine;
pub mod time;

pub use cutout::{Coverage, CutoutDetector, classify_coverage};
pub use fps_counter::FpsCounter;
pub use mesh_combine::{TransformedMesh, combine, combine_whole_scene};
pub use time::{Clock, Time};
