use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where mined fuel ends up.
pub trait ResourcePool {
    fn add_fuel(&mut self, amount: f32);
    fn remove_fuel(&mut self, amount: f32);
    fn level(&self) -> f32;
    fn max_level(&self) -> f32;
}

/// Fuel tank configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelConfig {
    /// Fuel at session start.
    pub initial: f32,
    /// Tank capacity.
    pub max: f32,
    /// Fuel burned per second of simulated time.
    pub passive_drain_per_sec: f32,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            initial: 100.0,
            max: 100.0,
            passive_drain_per_sec: 0.3,
        }
    }
}

/// The player's fuel tank. The level always stays within `[0, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelPool {
    level: f32,
    max: f32,
    drain_per_sec: f32,
}

impl FuelPool {
    pub fn new(config: &FuelConfig) -> Self {
        Self {
            level: config.initial.clamp(0.0, config.max),
            max: config.max,
            drain_per_sec: config.passive_drain_per_sec,
        }
    }

    /// Burn fuel for `dt` of simulated time.
    pub fn drain(&mut self, dt: Duration) {
        self.remove_fuel(self.drain_per_sec * dt.as_secs_f32());
    }

    /// Grow the capacity by `percent` of its current value.
    pub fn raise_capacity(&mut self, percent: f32) {
        self.max *= 1.0 + percent / 100.0;
    }

    pub fn is_depleted(&self) -> bool {
        self.level <= 0.0
    }
}

impl ResourcePool for FuelPool {
    fn add_fuel(&mut self, amount: f32) {
        self.level = (self.level + amount).min(self.max);
    }

    fn remove_fuel(&mut self, amount: f32) {
        self.level = (self.level - amount).max(0.0);
    }

    fn level(&self) -> f32 {
        self.level
    }

    fn max_level(&self) -> f32 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(initial: f32) -> FuelPool {
        FuelPool::new(&FuelConfig {
            initial,
            ..FuelConfig::default()
        })
    }

    #[test]
    fn add_clamps_to_max() {
        let mut p = pool(90.0);
        p.add_fuel(75.0);
        assert_eq!(p.level(), 100.0);
    }

    #[test]
    fn remove_clamps_to_zero() {
        let mut p = pool(10.0);
        p.remove_fuel(25.0);
        assert_eq!(p.level(), 0.0);
        assert!(p.is_depleted());
    }

    #[test]
    fn passive_drain_scales_with_time() {
        let mut p = pool(100.0);
        p.drain(Duration::from_secs(10));
        assert!((p.level() - 97.0).abs() < 1e-4);
    }

    #[test]
    fn raise_capacity_allows_more_fuel() {
        let mut p = pool(100.0);
        p.raise_capacity(15.0);
        assert!((p.max_level() - 115.0).abs() < 1e-4);
        p.add_fuel(50.0);
        assert!((p.level() - 115.0).abs() < 1e-4);
    }

    #[test]
    fn initial_level_is_clamped() {
        let p = FuelPool::new(&FuelConfig {
            initial: 500.0,
            max: 100.0,
            passive_drain_per_sec: 0.0,
        });
        assert_eq!(p.level(), 100.0);
    }
}
