use std::time::{Duration, Instant};

use burrow_assets::{AssetError, Template, TemplateStore, names};
use burrow_common::{CellCoord, ChunkKind, Transform2};
use burrow_kernel::{ChunkData, DestroyHook, EntityData, EntityKind, World};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::GridIndex;
use crate::window::{CellWindow, Viewpoint};

/// Streaming configuration: window padding, unload policy and kind weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Extra cells generated beyond the visible area on every side.
    pub padding: i32,
    /// Highest row that ever receives chunks (the surface).
    pub surface_row: i32,
    /// Spawned cells further than this many cells outside the window are unloaded.
    pub retain_margin: i32,
    /// Maximum number of cells to unload per scan.
    pub unload_budget: usize,
    /// Probability that a new chunk holds fuel.
    pub fuel_chance: f32,
    /// Share of fuel chunks that are the small variety.
    pub small_fuel_share: f32,
    /// Probability that a new chunk is a dungeon. Drawn after fuel.
    pub dungeon_chance: f32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            padding: 2,
            surface_row: 0,
            retain_margin: 4,
            unload_budget: 64,
            fuel_chance: 0.05,
            small_fuel_share: 0.5,
            dungeon_chance: 0.01,
        }
    }
}

/// Outcome of one window scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanReport {
    pub window: CellWindow,
    pub spawned: usize,
    /// Window cells skipped because they were mined.
    pub skipped_mined: usize,
    pub unloaded: usize,
    pub scan_time: Duration,
}

/// Running streaming statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    pub scans: u64,
    pub total_spawned: u64,
    pub total_unloaded: u64,
    pub last_scan: Option<ScanReport>,
}

/// Spawns chunks around a moving viewpoint.
///
/// The window is rescanned only when the viewpoint enters a new cell. Every
/// window cell that is neither spawned nor mined gets exactly one new chunk.
pub struct Streamer {
    pub config: StreamConfig,
    cell_size: f32,
    grid_size: u32,
    rock: Template,
    fuel: Template,
    small_fuel: Template,
    dungeon: Template,
    last_cell: Option<CellCoord>,
    stats: StreamStats,
}

impl Streamer {
    /// Resolve the chunk templates up front; a missing one is fatal.
    ///
    /// The cell size is the footprint of the rock template.
    pub fn new(config: StreamConfig, templates: &TemplateStore, grid_size: u32) -> Result<Self, AssetError> {
        let rock = templates.require(names::ROCK)?.clone();
        Ok(Self {
            config,
            cell_size: rock.size,
            grid_size,
            fuel: templates.require(names::FUEL)?.clone(),
            small_fuel: templates.require(names::SMALL_FUEL)?.clone(),
            dungeon: templates.require(names::DUNGEON)?.clone(),
            rock,
            last_cell: None,
            stats: StreamStats::default(),
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Scan the window if the viewpoint changed cell since the last call.
    ///
    /// Returns `None` when the viewpoint is still in the same cell.
    pub fn update(
        &mut self,
        world: &mut World,
        grid: &mut GridIndex,
        viewpoint: &Viewpoint,
        rng: &mut impl Rng,
    ) -> Option<ScanReport> {
        let cell = viewpoint.cell(self.cell_size);
        if self.last_cell == Some(cell) {
            return None;
        }
        self.last_cell = Some(cell);
        Some(self.scan(world, grid, viewpoint, rng))
    }

    /// Unconditionally scan the window around `viewpoint`.
    pub fn scan(
        &mut self,
        world: &mut World,
        grid: &mut GridIndex,
        viewpoint: &Viewpoint,
        rng: &mut impl Rng,
    ) -> ScanReport {
        let _span = tracing::info_span!("stream_update").entered();
        let scan_start = Instant::now();

        let window = CellWindow::around(viewpoint, self.cell_size, self.config.padding, self.config.surface_row);

        let mut spawned = 0;
        let mut skipped_mined = 0;
        for coord in window.cells() {
            if grid.is_mined(coord) {
                skipped_mined += 1;
                continue;
            }
            if grid.is_spawned(coord) {
                continue;
            }
            let kind = self.draw_kind(rng);
            let id = world.spawn(self.chunk_data(coord, kind));
            grid.insert_spawned(coord, id);
            tracing::debug!(?coord, ?kind, "spawning chunk");
            spawned += 1;
        }

        let unloaded = self.unload_outside(world, grid, window.grown(self.config.retain_margin));

        let report = ScanReport {
            window,
            spawned,
            skipped_mined,
            unloaded,
            scan_time: scan_start.elapsed(),
        };
        self.stats.scans += 1;
        self.stats.total_spawned += spawned as u64;
        self.stats.total_unloaded += unloaded as u64;
        self.stats.last_scan = Some(report);

        tracing::trace!(
            spawned,
            skipped_mined,
            unloaded,
            total = grid.spawned_count(),
            "stream scan complete"
        );
        report
    }

    /// Weighted draw: fuel, then dungeon, else rock.
    pub fn draw_kind(&self, rng: &mut impl Rng) -> ChunkKind {
        let roll: f32 = rng.gen_range(0.0..1.0);
        if roll < self.config.fuel_chance {
            if rng.gen_bool(f64::from(self.config.small_fuel_share)) {
                ChunkKind::SmallFuel
            } else {
                ChunkKind::Fuel
            }
        } else if roll < self.config.fuel_chance + self.config.dungeon_chance {
            ChunkKind::Dungeon
        } else {
            ChunkKind::Rock
        }
    }

    fn chunk_data(&self, coord: CellCoord, kind: ChunkKind) -> EntityData {
        let template = match kind {
            ChunkKind::Fuel => &self.fuel,
            ChunkKind::SmallFuel => &self.small_fuel,
            ChunkKind::Dungeon => &self.dungeon,
            ChunkKind::Rock | ChunkKind::LavaMarker => &self.rock,
        };
        EntityData {
            transform: Transform2::new(coord.center(self.cell_size), template.size),
            kind: EntityKind::Chunk(ChunkData {
                coord,
                kind,
                subdivided: false,
                grid_size: self.grid_size,
            }),
            tags: template.tags.clone(),
            template: template.name.clone(),
            on_destroy: Some(DestroyHook::RetireCell(coord)),
        }
    }

    /// Unload spawned cells outside `retain`, oldest coordinates first.
    fn unload_outside(&self, world: &mut World, grid: &mut GridIndex, retain: CellWindow) -> usize {
        let stale: Vec<CellCoord> = grid
            .spawned()
            .map(|(coord, _)| coord)
            .filter(|coord| !retain.contains(*coord))
            .take(self.config.unload_budget)
            .collect();
        for coord in &stale {
            if let Some(id) = grid.unload(*coord) {
                tracing::debug!(?coord, "unloading chunk");
                // Unloading is not mining: skip the retire hook.
                world.despawn(id);
            }
        }
        stale.len()
    }
}
