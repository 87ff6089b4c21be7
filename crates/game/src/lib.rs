//! Game session: the one object that owns a run's world, grid, fuel, lava
//! front and deferred work, driven tick by tick.

mod config;
mod error;
mod session;

pub use config::GameConfig;
pub use error::ConfigError;
pub use session::{Scheduled, Session, SessionState, TickReport};

pub fn crate_info() -> &'static str {
    "burrow-game v0.1.0"
}
