#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Strata: the scene database of a small real-time engine.
//!
//! Entities live in column-oriented tables addressed by generational IDs.
//! Every table records per-tick change notifications that renderers
//! consume, and the [`Engine`] drives the tick that mutates and renders
//! the [`SceneDatabase`].

pub mod assets;
pub mod core;
pub mod engine;
pub mod errors;
pub mod input;
pub mod math;
pub mod scene;
pub mod shading;
pub mod utils;
pub mod world;

#[doc(hidden)]
pub use bitflags;

pub use crate::core::id::EntityId;
pub use engine::{Engine, Window};
pub use errors::{Result, StrataError};
pub use math::{Aabb, Rect, Transform};
pub use world::{SceneCapacities, SceneDatabase};
