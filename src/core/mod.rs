//! Storage primitives every scene and asset table is built from.

pub mod changes;
pub mod id;
pub mod table;

pub use changes::{ChangeFlags, ChangeStream};
pub use id::{EntityId, IdAllocator, MAX_IDS};
pub use table::{Columns, Table};
