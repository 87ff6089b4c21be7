//! World Kernel: authoritative world state, simulation stepping, timers.
//!
//! # Invariants
//! - All state mutations flow through explicit operations.
//! - Destroy hooks are data; the kernel returns them, callers dispatch them.
//! - Timed work is polled from a `TimerQueue`, never run in the background.

pub mod timer;
pub mod world;

pub use timer::{TimerId, TimerQueue};
pub use world::{BoxHit, ChunkData, DestroyHook, EntityData, EntityKind, World, WorldEvent};

pub fn crate_info() -> &'static str {
    "burrow-kernel v0.1.0"
}
