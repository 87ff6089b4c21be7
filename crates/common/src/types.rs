use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Unique identifier for an entity in the world.
///
/// Ids are handed out sequentially by the world that owns the entity, so a
/// seeded session allocates the same ids on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// A 2D cell coordinate in the world grid, in chunk-size units.
///
/// Rows grow upward: row 0 is the surface and everything below it is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Center of this cell in world units.
    pub fn center(self, cell_size: f32) -> Vec2 {
        Vec2::new(self.x as f32 * cell_size, self.y as f32 * cell_size)
    }

    /// Cell containing a world position (floor division by cell size).
    pub fn containing(position: Vec2, cell_size: f32) -> Self {
        Self {
            x: (position.x / cell_size).floor() as i32,
            y: (position.y / cell_size).floor() as i32,
        }
    }
}

/// Spatial transform of a square world entity: center position and edge length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2 {
    pub position: Vec2,
    pub size: f32,
}

impl Transform2 {
    pub fn new(position: Vec2, size: f32) -> Self {
        Self { position, size }
    }

    /// Lower-left and upper-right corners of the footprint.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::splat(self.size * 0.5);
        (self.position - half, self.position + half)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = self.bounds();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

impl Default for Transform2 {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: 1.0,
        }
    }
}

/// Marker carried by entities so sweeps and queries can select them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// Can be mined away and is removed by the lava sweep.
    Breakable,
    /// Part of the lava line.
    Lava,
    /// Collectable by the player on overlap.
    Pickup,
}

/// What a world chunk contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Rock,
    Fuel,
    SmallFuel,
    Dungeon,
    LavaMarker,
}

impl ChunkKind {
    pub fn is_fuel(self) -> bool {
        matches!(self, Self::Fuel | Self::SmallFuel)
    }
}

/// Consumable pickups found in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumableKind {
    FossilFuel,
    Speed,
    JumpDistance,
    BatteryCapacity,
    MiningSpeed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_floors_negative_positions() {
        assert_eq!(CellCoord::containing(Vec2::new(5.0, -0.1), 10.0), CellCoord::new(0, -1));
        assert_eq!(CellCoord::containing(Vec2::new(-10.0, -25.0), 10.0), CellCoord::new(-1, -3));
    }

    #[test]
    fn center_scales_by_cell_size() {
        assert_eq!(CellCoord::new(2, -3).center(10.0), Vec2::new(20.0, -30.0));
    }

    #[test]
    fn transform_bounds_and_contains() {
        let t = Transform2::new(Vec2::new(10.0, 10.0), 4.0);
        let (min, max) = t.bounds();
        assert_eq!(min, Vec2::new(8.0, 8.0));
        assert_eq!(max, Vec2::new(12.0, 12.0));
        assert!(t.contains(Vec2::new(11.9, 8.1)));
        assert!(!t.contains(Vec2::new(12.1, 10.0)));
    }

    #[test]
    fn cell_coords_order_row_major_by_x_first() {
        let mut cells = vec![CellCoord::new(1, 0), CellCoord::new(0, 5), CellCoord::new(0, -1)];
        cells.sort();
        assert_eq!(cells, vec![CellCoord::new(0, -1), CellCoord::new(0, 5), CellCoord::new(1, 0)]);
    }

    #[test]
    fn fuel_kinds() {
        assert!(ChunkKind::Fuel.is_fuel());
        assert!(ChunkKind::SmallFuel.is_fuel());
        assert!(!ChunkKind::Rock.is_fuel());
    }
}
