//! Renderer registry.
//!
//! The database only records which renderers exist and which camera each
//! one draws. The implementation behind a renderer is an opaque handle the
//! host attaches and later downcasts.

use std::any::Any;
use std::sync::Arc;

use crate::core::id::EntityId;
use crate::core::table::{Columns, Table};

crate::define_id! {
    /// Identifies a renderer.
    pub struct RendererId;
}

crate::change_flags! {
    pub struct RendererChanges {}
}

/// Opaque renderer implementation.
pub type RendererHandle = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct RendererData {
    names: Vec<String>,
    implementations: Vec<Option<RendererHandle>>,
    // Starts at 1; the dummy keeps 0 and sorts before every renderer.
    creation_order: Vec<u64>,
    next_creation_order: u64,
}

impl std::fmt::Debug for RendererData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererData").field("names", &self.names).finish_non_exhaustive()
    }
}

impl Columns for RendererData {
    type Id = RendererId;
    type Changes = RendererChanges;
    const NAME: &'static str = "Renderers";

    fn resize(&mut self, capacity: usize) {
        self.names.resize(capacity, String::new());
        self.implementations.resize(capacity, None);
        self.creation_order.resize(capacity, 0);
    }
}

pub type Renderers = Table<RendererData>;

impl Table<RendererData> {
    pub fn create(&mut self, name: impl Into<String>, implementation: Option<RendererHandle>) -> RendererId {
        let Some((id, index)) = self.acquire() else {
            return RendererId::INVALID;
        };
        let c = &mut self.columns;
        c.names[index] = name.into();
        c.implementations[index] = implementation;
        c.next_creation_order += 1;
        c.creation_order[index] = c.next_creation_order;
        id
    }

    /// Destroys the renderer and drops its implementation handle.
    pub fn destroy(&mut self, id: RendererId) {
        if let Some(index) = self.release(id) {
            self.columns.implementations[index] = None;
        }
    }

    #[must_use]
    pub fn name(&self, id: RendererId) -> &str {
        &self.columns.names[self.slot_or_dummy(id)]
    }

    #[must_use]
    pub fn get_implementation(&self, id: RendererId) -> Option<&RendererHandle> {
        self.columns.implementations[self.slot_or_dummy(id)].as_ref()
    }

    /// Typed view of the implementation, if it is a `T`.
    #[must_use]
    pub fn get_implementation_as<T: Any + Send + Sync>(&self, id: RendererId) -> Option<&T> {
        self.get_implementation(id)?.downcast_ref::<T>()
    }

    pub fn set_implementation(&mut self, id: RendererId, implementation: Option<RendererHandle>) {
        if let Some(index) = self.slot_for_write(id) {
            self.columns.implementations[index] = implementation;
        }
    }

    fn creation_order(&self, id: RendererId) -> u64 {
        self.columns.creation_order[id.index()]
    }

    /// The earliest-created live renderer, or the sentinel.
    #[must_use]
    pub fn first(&self) -> RendererId {
        self.get_iterable()
            .min_by_key(|&id| self.creation_order(id))
            .unwrap_or(RendererId::INVALID)
    }

    /// The live renderer created next after `id`, wrapping around to
    /// [`first`](Self::first). A dead `id` yields the first renderer.
    ///
    /// With a single live renderer this returns that renderer.
    #[must_use]
    pub fn next_after(&self, id: RendererId) -> RendererId {
        let order = self.columns.creation_order[self.slot_or_dummy(id)];
        self.get_iterable()
            .filter(|&other| self.creation_order(other) > order)
            .min_by_key(|&other| self.creation_order(other))
            .unwrap_or_else(|| self.first())
    }
}
