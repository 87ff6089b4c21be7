use burrow_common::ConsumableKind;
use rand::Rng;

use crate::fuel::{FuelPool, ResourcePool};

pub const FOSSIL_FUEL_AMOUNT: f32 = 75.0;
pub const SPEED_INCREASE: f32 = 10.0;
pub const JUMP_DISTANCE_INCREASE: f32 = 15.0;
pub const BATTERY_CAPACITY_PERCENT: f32 = 15.0;
pub const MINING_SPEED_PERCENT: f32 = 15.0;

/// Bonus kinds a cleared dungeon can drop.
const BONUSES: [ConsumableKind; 4] = [
    ConsumableKind::Speed,
    ConsumableKind::JumpDistance,
    ConsumableKind::BatteryCapacity,
    ConsumableKind::MiningSpeed,
];

/// Player upgrades collected from pickups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStats {
    pub move_speed: f32,
    pub jump_distance: f32,
    /// Multiplier on mining speed; break delays are divided by it.
    pub mining_speed: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_distance: 5.0,
            mining_speed: 1.0,
        }
    }
}

/// Apply a collected pickup.
pub fn apply(kind: ConsumableKind, stats: &mut PlayerStats, pool: &mut FuelPool) {
    match kind {
        ConsumableKind::FossilFuel => pool.add_fuel(FOSSIL_FUEL_AMOUNT),
        ConsumableKind::Speed => stats.move_speed += SPEED_INCREASE,
        ConsumableKind::JumpDistance => stats.jump_distance += JUMP_DISTANCE_INCREASE,
        ConsumableKind::BatteryCapacity => pool.raise_capacity(BATTERY_CAPACITY_PERCENT),
        ConsumableKind::MiningSpeed => stats.mining_speed *= 1.0 + MINING_SPEED_PERCENT / 100.0,
    }
    tracing::debug!(?kind, "pickup applied");
}

/// Uniformly pick one of the non-fuel bonuses.
pub fn random_bonus(rng: &mut impl Rng) -> ConsumableKind {
    BONUSES[rng.gen_range(0..BONUSES.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuel::FuelConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn fuel_pickup_refills() {
        let mut stats = PlayerStats::default();
        let mut pool = FuelPool::new(&FuelConfig {
            initial: 10.0,
            ..FuelConfig::default()
        });
        apply(ConsumableKind::FossilFuel, &mut stats, &mut pool);
        assert_eq!(pool.level(), 85.0);
        assert_eq!(stats, PlayerStats::default());
    }

    #[test]
    fn stat_pickups_raise_stats() {
        let mut stats = PlayerStats::default();
        let mut pool = FuelPool::new(&FuelConfig::default());
        apply(ConsumableKind::Speed, &mut stats, &mut pool);
        apply(ConsumableKind::JumpDistance, &mut stats, &mut pool);
        apply(ConsumableKind::MiningSpeed, &mut stats, &mut pool);
        apply(ConsumableKind::BatteryCapacity, &mut stats, &mut pool);
        assert_eq!(stats.move_speed, 15.0);
        assert_eq!(stats.jump_distance, 20.0);
        assert!((stats.mining_speed - 1.15).abs() < 1e-6);
        assert!((pool.max_level() - 115.0).abs() < 1e-4);
    }

    #[test]
    fn random_bonus_never_drops_fuel() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            assert_ne!(random_bonus(&mut rng), ConsumableKind::FossilFuel);
        }
    }
}
