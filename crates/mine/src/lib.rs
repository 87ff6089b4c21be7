//! Mining: chunk subdivision, the fuel pool and consumable pickups.
//!
//! # Invariants
//! - A chunk breaks at most once.
//! - Breaking a rock chunk of size S into N×N tiles yields N² tiles of size S/N
//!   tiling the parent footprint exactly.
//! - The fuel level never leaves `[0, max]`.

mod chunk;
mod fuel;
mod locate;
pub mod pickup;

pub use chunk::{BreakOutcome, Breaker, MineConfig, SubdivideOutcome, tile_layout};
pub use fuel::{FuelConfig, FuelPool, ResourcePool};
pub use locate::{FuelSignal, nearest_fuel};
pub use pickup::PlayerStats;

pub fn crate_info() -> &'static str {
    "burrow-mine v0.1.0"
}
