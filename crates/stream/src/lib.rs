//! Streaming: grid index, cell windows, chunk streaming around the viewpoint.
//!
//! # Invariants
//! - A cell is never both spawned and mined.
//! - Once mined, a cell is never spawned again.
//! - Entity removal goes through `destroy` so destroy hooks always run.

mod destroy;
mod grid;
mod streamer;
mod window;

pub use destroy::destroy;
pub use grid::GridIndex;
pub use streamer::{ScanReport, StreamConfig, StreamStats, Streamer};
pub use window::{CellWindow, Viewpoint};

pub fn crate_info() -> &'static str {
    "burrow-stream v0.1.0"
}
