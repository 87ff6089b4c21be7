use burrow_assets::{AssetError, Template, TemplateStore, names};
use burrow_common::{ChunkKind, EntityId, Tag, Transform2};
use burrow_kernel::{EntityData, EntityKind, World};
use burrow_stream::{GridIndex, destroy};
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::fuel::ResourcePool;
use crate::pickup;

/// Mining configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MineConfig {
    /// Fine tiles per side when a rock chunk subdivides.
    pub grid_size: u32,
    /// Fuel granted by breaking a fuel chunk.
    pub fuel_reward: f32,
    /// Fuel granted by breaking a small fuel chunk.
    pub small_fuel_reward: f32,
    /// Seconds between a hit and the target breaking, at mining speed 1.
    pub break_delay_secs: f32,
    /// Reach of the mining tool in world units.
    pub mining_distance: f32,
    /// Width of the mining tool's sweep.
    pub mining_width: f32,
    /// Distance from the viewpoint within which pickups are collected.
    pub pickup_radius: f32,
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            fuel_reward: 75.0,
            small_fuel_reward: 25.0,
            break_delay_secs: 0.25,
            mining_distance: 5.0,
            mining_width: 1.0,
            pickup_radius: 1.0,
        }
    }
}

/// Result of breaking a chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum SubdivideOutcome {
    /// Nothing happened: missing entity, not a chunk, lava, or already broken.
    Skipped,
    /// A fuel chunk paid out and was removed.
    FuelAwarded { amount: f32 },
    /// A rock chunk was replaced by fine tiles.
    Subdivided { tiles: Vec<EntityId> },
    /// A dungeon was cleared and left a pickup behind.
    Cleared { pickup: EntityId },
}

/// Result of a deferred break firing on any entity.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakOutcome {
    Chunk(SubdivideOutcome),
    TileRemoved,
    /// The target was gone or cannot be broken.
    Skipped,
}

/// Centers and sizes of the `n`×`n` sub-cells tiling a square footprint.
pub fn tile_layout(parent: Transform2, n: u32) -> Vec<Transform2> {
    let n = n.max(1);
    let tile = parent.size / n as f32;
    let origin = parent.position - Vec2::splat(parent.size * 0.5);
    let mut tiles = Vec::with_capacity((n * n) as usize);
    for i in 0..n {
        for j in 0..n {
            let offset = Vec2::new((i as f32 + 0.5) * tile, (j as f32 + 0.5) * tile);
            tiles.push(Transform2::new(origin + offset, tile));
        }
    }
    tiles
}

/// Breaks chunks and tiles.
///
/// Holds the tile and pickup templates resolved at startup, so breaking never
/// fails at run time.
pub struct Breaker {
    pub config: MineConfig,
    tile: Template,
    pickup: Template,
}

impl Breaker {
    pub fn new(config: MineConfig, templates: &TemplateStore) -> Result<Self, AssetError> {
        Ok(Self {
            config,
            tile: templates.require(names::TILE)?.clone(),
            pickup: templates.require(names::PICKUP)?.clone(),
        })
    }

    /// Break a chunk: pay out fuel, clear a dungeon, or split rock into tiles.
    ///
    /// The chunk's `subdivided` flag is set before any side effect, and the
    /// parent is removed through its destroy hook so its cell is retired.
    /// Calling this twice on the same entity does nothing the second time.
    pub fn subdivide(
        &self,
        world: &mut World,
        grid: &mut GridIndex,
        pool: &mut impl ResourcePool,
        id: EntityId,
        rng: &mut impl Rng,
    ) -> SubdivideOutcome {
        let Some(data) = world.get_mut(id) else {
            return SubdivideOutcome::Skipped;
        };
        let parent = data.transform;
        let EntityKind::Chunk(chunk) = &mut data.kind else {
            return SubdivideOutcome::Skipped;
        };
        if chunk.subdivided || chunk.kind == ChunkKind::LavaMarker {
            return SubdivideOutcome::Skipped;
        }
        chunk.subdivided = true;
        let chunk = *chunk;

        let outcome = match chunk.kind {
            ChunkKind::Fuel | ChunkKind::SmallFuel => {
                let amount = if chunk.kind == ChunkKind::Fuel {
                    self.config.fuel_reward
                } else {
                    self.config.small_fuel_reward
                };
                pool.add_fuel(amount);
                SubdivideOutcome::FuelAwarded { amount }
            }
            ChunkKind::Dungeon => {
                let kind = pickup::random_bonus(rng);
                let pickup = world.spawn(EntityData {
                    transform: Transform2::new(parent.position, self.pickup.size),
                    kind: EntityKind::Pickup(kind),
                    tags: self.pickup.tags.clone(),
                    template: self.pickup.name.clone(),
                    on_destroy: None,
                });
                SubdivideOutcome::Cleared { pickup }
            }
            // LavaMarker was filtered out above.
            ChunkKind::Rock | ChunkKind::LavaMarker => {
                let tiles = tile_layout(parent, chunk.grid_size)
                    .into_iter()
                    .map(|transform| {
                        world.spawn(EntityData {
                            transform,
                            kind: EntityKind::Tile,
                            tags: self.tile.tags.clone(),
                            template: self.tile.name.clone(),
                            on_destroy: None,
                        })
                    })
                    .collect();
                SubdivideOutcome::Subdivided { tiles }
            }
        };

        destroy(world, grid, id);
        tracing::debug!(coord = ?chunk.coord, kind = ?chunk.kind, "chunk broken");
        outcome
    }

    /// Break whatever `id` is: chunks subdivide, breakable tiles disappear.
    pub fn break_entity(
        &self,
        world: &mut World,
        grid: &mut GridIndex,
        pool: &mut impl ResourcePool,
        id: EntityId,
        rng: &mut impl Rng,
    ) -> BreakOutcome {
        let Some(data) = world.get(id) else {
            return BreakOutcome::Skipped;
        };
        let (kind, breakable) = (data.kind, data.has_tag(Tag::Breakable));
        match kind {
            EntityKind::Chunk(_) => BreakOutcome::Chunk(self.subdivide(world, grid, pool, id, rng)),
            EntityKind::Tile if breakable => {
                destroy(world, grid, id);
                BreakOutcome::TileRemoved
            }
            _ => BreakOutcome::Skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuel::{FuelConfig, FuelPool};
    use burrow_common::CellCoord;
    use burrow_kernel::{ChunkData, DestroyHook};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::BTreeSet;

    struct Fixture {
        world: World,
        grid: GridIndex,
        pool: FuelPool,
        breaker: Breaker,
        rng: StdRng,
    }

    fn fixture(grid_size: u32) -> Fixture {
        Fixture {
            world: World::new(),
            grid: GridIndex::new(),
            pool: FuelPool::new(&FuelConfig {
                initial: 10.0,
                ..FuelConfig::default()
            }),
            breaker: Breaker::new(
                MineConfig {
                    grid_size,
                    ..MineConfig::default()
                },
                &TemplateStore::stock(),
            )
            .unwrap(),
            rng: StdRng::seed_from_u64(11),
        }
    }

    fn place(f: &mut Fixture, coord: CellCoord, kind: ChunkKind, size: f32, grid_size: u32) -> EntityId {
        let id = f.world.spawn(EntityData {
            transform: Transform2::new(coord.center(size), size),
            kind: EntityKind::Chunk(ChunkData {
                coord,
                kind,
                subdivided: false,
                grid_size,
            }),
            tags: BTreeSet::from([Tag::Breakable]),
            template: "rock".into(),
            on_destroy: Some(DestroyHook::RetireCell(coord)),
        });
        f.grid.insert_spawned(coord, id);
        id
    }

    fn subdivide(f: &mut Fixture, id: EntityId) -> SubdivideOutcome {
        f.breaker
            .subdivide(&mut f.world, &mut f.grid, &mut f.pool, id, &mut f.rng)
    }

    #[test]
    fn layout_example_size_ten_grid_five() {
        let tiles = tile_layout(Transform2::new(Vec2::ZERO, 10.0), 5);
        assert_eq!(tiles.len(), 25);
        let steps = [-4.0, -2.0, 0.0, 2.0, 4.0];
        for (k, tile) in tiles.iter().enumerate() {
            assert!((tile.size - 2.0).abs() < 1e-6);
            let expected = Vec2::new(steps[k / 5], steps[k % 5]);
            assert!((tile.position - expected).length() < 1e-5, "{k}: {:?}", tile.position);
        }
    }

    #[test]
    fn layout_tiles_cover_footprint_without_overlap() {
        let parent = Transform2::new(Vec2::new(30.0, -70.0), 10.0);
        let tiles = tile_layout(parent, 4);
        let area: f32 = tiles.iter().map(|t| t.size * t.size).sum();
        assert!((area - 100.0).abs() < 1e-3);
        let (pmin, pmax) = parent.bounds();
        for (a, ta) in tiles.iter().enumerate() {
            let (min, max) = ta.bounds();
            assert!(min.x >= pmin.x - 1e-4 && min.y >= pmin.y - 1e-4);
            assert!(max.x <= pmax.x + 1e-4 && max.y <= pmax.y + 1e-4);
            for tb in tiles.iter().skip(a + 1) {
                assert!((ta.position - tb.position).abs().max_element() >= ta.size - 1e-4);
            }
        }
    }

    #[test]
    fn rock_subdivides_into_grid_and_retires_cell() {
        let mut f = fixture(5);
        let coord = CellCoord::new(0, 0);
        let id = place(&mut f, coord, ChunkKind::Rock, 10.0, 5);

        let SubdivideOutcome::Subdivided { tiles } = subdivide(&mut f, id) else {
            panic!("rock should subdivide");
        };
        assert_eq!(tiles.len(), 25);
        assert!(!f.world.contains(id));
        assert!(f.grid.is_mined(coord));
        assert!(!f.grid.is_spawned(coord));
        for tile in &tiles {
            let data = f.world.get(*tile).unwrap();
            assert_eq!(data.kind, EntityKind::Tile);
            assert!((data.transform.size - 2.0).abs() < 1e-6);
            assert!(data.has_tag(Tag::Breakable));
        }
    }

    #[test]
    fn subdivide_twice_matches_once() {
        let mut f = fixture(3);
        let id = place(&mut f, CellCoord::new(1, -1), ChunkKind::Rock, 10.0, 3);
        subdivide(&mut f, id);
        let entities = f.world.entity_count();
        let events = f.world.events().len();
        let mined = f.grid.mined_count();

        assert_eq!(subdivide(&mut f, id), SubdivideOutcome::Skipped);
        assert_eq!(f.world.entity_count(), entities);
        assert_eq!(f.world.events().len(), events);
        assert_eq!(f.grid.mined_count(), mined);
    }

    #[test]
    fn flagged_chunk_is_not_subdivided_again() {
        let mut f = fixture(3);
        let id = place(&mut f, CellCoord::new(0, -2), ChunkKind::Rock, 10.0, 3);
        if let Some(EntityKind::Chunk(chunk)) = f.world.get_mut(id).map(|d| &mut d.kind) {
            chunk.subdivided = true;
        }
        assert_eq!(subdivide(&mut f, id), SubdivideOutcome::Skipped);
        assert!(f.world.contains(id));
    }

    #[test]
    fn fuel_chunk_pays_once_without_tiles() {
        let mut f = fixture(10);
        let id = place(&mut f, CellCoord::new(2, -3), ChunkKind::Fuel, 10.0, 10);
        let before = f.world.entity_count();

        assert_eq!(subdivide(&mut f, id), SubdivideOutcome::FuelAwarded { amount: 75.0 });
        assert_eq!(f.pool.level(), 85.0);
        assert_eq!(f.world.entity_count(), before - 1);
        assert!(f.grid.is_mined(CellCoord::new(2, -3)));

        subdivide(&mut f, id);
        assert_eq!(f.pool.level(), 85.0);
    }

    #[test]
    fn small_fuel_pays_small_reward() {
        let mut f = fixture(10);
        let id = place(&mut f, CellCoord::new(0, -1), ChunkKind::SmallFuel, 10.0, 10);
        assert_eq!(subdivide(&mut f, id), SubdivideOutcome::FuelAwarded { amount: 25.0 });
        assert_eq!(f.pool.level(), 35.0);
    }

    #[test]
    fn dungeon_clears_into_pickup() {
        let mut f = fixture(10);
        let coord = CellCoord::new(-1, -4);
        let id = place(&mut f, coord, ChunkKind::Dungeon, 10.0, 10);

        let SubdivideOutcome::Cleared { pickup } = subdivide(&mut f, id) else {
            panic!("dungeon should clear");
        };
        let data = f.world.get(pickup).unwrap();
        assert!(matches!(data.kind, EntityKind::Pickup(_)));
        assert_eq!(data.transform.position, coord.center(10.0));
        assert!(data.has_tag(Tag::Pickup));
        assert!(f.grid.is_mined(coord));
        assert_eq!(f.world.entity_count(), 1);
    }

    #[test]
    fn lava_marker_is_skipped() {
        let mut f = fixture(10);
        let id = place(&mut f, CellCoord::new(0, 3), ChunkKind::LavaMarker, 10.0, 10);
        assert_eq!(subdivide(&mut f, id), SubdivideOutcome::Skipped);
        assert!(f.world.contains(id));
    }

    #[test]
    fn break_entity_removes_tiles_and_skips_missing() {
        let mut f = fixture(2);
        let id = place(&mut f, CellCoord::new(0, -1), ChunkKind::Rock, 10.0, 2);
        let BreakOutcome::Chunk(SubdivideOutcome::Subdivided { tiles }) =
            f.breaker
                .break_entity(&mut f.world, &mut f.grid, &mut f.pool, id, &mut f.rng)
        else {
            panic!("chunk should subdivide");
        };
        assert_eq!(
            f.breaker
                .break_entity(&mut f.world, &mut f.grid, &mut f.pool, tiles[0], &mut f.rng),
            BreakOutcome::TileRemoved
        );
        assert_eq!(
            f.breaker
                .break_entity(&mut f.world, &mut f.grid, &mut f.pool, tiles[0], &mut f.rng),
            BreakOutcome::Skipped
        );
        assert_eq!(f.world.entity_count(), 3);
    }
}
