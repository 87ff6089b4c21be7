//! Lava front: a descending line that prunes the world above it.
//!
//! # Invariants
//! - Dormant → Active is one-way.
//! - The row strictly decreases, one row per step.
//! - The column range only grows.
//! - After each step no breakable entity lies above the line.

mod front;

pub use front::{LavaConfig, LavaFront, LavaState, LavaStep};

pub fn crate_info() -> &'static str {
    "burrow-lava v0.1.0"
}
