//! Shared value types used by every burrow crate.

mod types;

pub use types::{CellCoord, ChunkKind, ConsumableKind, EntityId, Tag, Transform2};
