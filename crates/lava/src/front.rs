use burrow_assets::{AssetError, Template, TemplateStore, names};
use burrow_common::{CellCoord, ChunkKind, EntityId, Tag, Transform2};
use burrow_kernel::{ChunkData, EntityData, EntityKind, World};
use burrow_stream::{GridIndex, destroy};
use serde::{Deserialize, Serialize};

/// Lava front configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LavaConfig {
    /// The front activates once the viewpoint drops below this world height.
    pub start_y: f32,
    /// Rows above the trigger row at which the first lava line appears.
    pub initial_offset_rows: i32,
    /// Seconds between one-row descents.
    pub seconds_per_row: f32,
    /// Columns added beyond the outermost spawned chunk on each side.
    pub edge_padding: i32,
    /// Column range used when no chunks are spawned.
    pub default_min_x: i32,
    pub default_max_x: i32,
    /// Entities carrying any of these tags are removed once above the line.
    pub breakable_tags: Vec<Tag>,
}

impl Default for LavaConfig {
    fn default() -> Self {
        Self {
            start_y: -10.0,
            initial_offset_rows: 5,
            seconds_per_row: 1.0,
            edge_padding: 2,
            default_min_x: -10,
            default_max_x: 10,
            breakable_tags: vec![Tag::Breakable],
        }
    }
}

/// Where the front is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LavaState {
    Dormant,
    Active { row: i32, min_x: i32, max_x: i32 },
}

/// Result of one descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LavaStep {
    pub row: i32,
    /// Columns covered by the new line.
    pub columns: usize,
    /// Breakable entities removed above the line.
    pub deleted: usize,
}

/// A line of lava that, once triggered, sinks one row at a time and removes
/// everything breakable above it.
///
/// The covered column range only ever grows.
pub struct LavaFront {
    pub config: LavaConfig,
    cell_size: f32,
    template: Template,
    state: LavaState,
    markers: Vec<EntityId>,
}

impl LavaFront {
    pub fn new(config: LavaConfig, templates: &TemplateStore, cell_size: f32) -> Result<Self, AssetError> {
        Ok(Self {
            config,
            cell_size,
            template: templates.require(names::LAVA)?.clone(),
            state: LavaState::Dormant,
            markers: Vec::new(),
        })
    }

    pub fn state(&self) -> LavaState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, LavaState::Active { .. })
    }

    pub fn row(&self) -> Option<i32> {
        match self.state {
            LavaState::Active { row, .. } => Some(row),
            LavaState::Dormant => None,
        }
    }

    /// World height of the current line.
    pub fn line_y(&self) -> Option<f32> {
        self.row().map(|row| row as f32 * self.cell_size)
    }

    pub fn bounds(&self) -> Option<(i32, i32)> {
        match self.state {
            LavaState::Active { min_x, max_x, .. } => Some((min_x, max_x)),
            LavaState::Dormant => None,
        }
    }

    pub fn markers(&self) -> &[EntityId] {
        &self.markers
    }

    /// Per-tick check. Activates the front when the viewpoint sinks below
    /// `start_y`, and widens an active line to follow the spawned chunks.
    ///
    /// Returns the first row on the tick the front activates.
    pub fn update(&mut self, world: &mut World, grid: &GridIndex, viewpoint_y: f32) -> Option<i32> {
        match self.state {
            LavaState::Dormant => {
                if viewpoint_y >= self.config.start_y {
                    return None;
                }
                let trigger_row = (self.config.start_y / self.cell_size).floor() as i32;
                let row = trigger_row + self.config.initial_offset_rows;
                let (min_x, max_x) = self.target_bounds(grid);
                self.state = LavaState::Active { row, min_x, max_x };
                self.spawn_line(world, row, min_x, max_x);
                tracing::info!(row, min_x, max_x, "lava front activated");
                Some(row)
            }
            LavaState::Active { row, min_x, max_x } => {
                let (target_min, target_max) = self.target_bounds(grid);
                let (new_min, new_max) = (min_x.min(target_min), max_x.max(target_max));
                for x in (new_min..min_x).chain(max_x + 1..=new_max) {
                    self.spawn_marker(world, x, row);
                }
                if (new_min, new_max) != (min_x, max_x) {
                    tracing::debug!(new_min, new_max, "lava line widened");
                }
                self.state = LavaState::Active {
                    row,
                    min_x: new_min,
                    max_x: new_max,
                };
                None
            }
        }
    }

    /// Sink the line one row and remove every breakable entity above it.
    ///
    /// Breakable entities are removed through `destroy`, so chunks swallowed
    /// by the lava retire their cells. Does nothing while dormant.
    pub fn step(&mut self, world: &mut World, grid: &mut GridIndex) -> Option<LavaStep> {
        let LavaState::Active { row, min_x, max_x } = self.state else {
            return None;
        };
        let _span = tracing::info_span!("lava_step", row = row - 1).entered();

        let row = row - 1;
        let (target_min, target_max) = self.target_bounds(grid);
        let (min_x, max_x) = (min_x.min(target_min), max_x.max(target_max));
        self.state = LavaState::Active { row, min_x, max_x };

        self.clear_line(world, grid);
        self.spawn_line(world, row, min_x, max_x);

        let line_y = row as f32 * self.cell_size;
        let doomed: Vec<EntityId> = world
            .entities()
            .iter()
            .filter(|(_, data)| data.transform.position.y > line_y && self.is_swallowed(data))
            .map(|(id, _)| *id)
            .collect();
        for id in &doomed {
            destroy(world, grid, *id);
        }

        tracing::debug!(row, deleted = doomed.len(), "lava descended");
        Some(LavaStep {
            row,
            columns: (max_x - min_x + 1) as usize,
            deleted: doomed.len(),
        })
    }

    fn is_swallowed(&self, data: &EntityData) -> bool {
        let is_lava = data.has_tag(Tag::Lava)
            || matches!(data.chunk(), Some(chunk) if chunk.kind == ChunkKind::LavaMarker);
        !is_lava && self.config.breakable_tags.iter().any(|tag| data.has_tag(*tag))
    }

    /// Spawned column range padded by `edge_padding`, or the default range.
    fn target_bounds(&self, grid: &GridIndex) -> (i32, i32) {
        let (min_x, max_x) = grid
            .spawned_x_range()
            .unwrap_or((self.config.default_min_x, self.config.default_max_x));
        (min_x - self.config.edge_padding, max_x + self.config.edge_padding)
    }

    fn spawn_line(&mut self, world: &mut World, row: i32, min_x: i32, max_x: i32) {
        for x in min_x..=max_x {
            self.spawn_marker(world, x, row);
        }
    }

    fn spawn_marker(&mut self, world: &mut World, x: i32, row: i32) {
        let coord = CellCoord::new(x, row);
        let id = world.spawn(EntityData {
            transform: Transform2::new(coord.center(self.cell_size), self.template.size),
            kind: EntityKind::Chunk(ChunkData {
                coord,
                kind: ChunkKind::LavaMarker,
                subdivided: false,
                grid_size: 0,
            }),
            tags: self.template.tags.clone(),
            template: self.template.name.clone(),
            on_destroy: None,
        });
        self.markers.push(id);
    }

    fn clear_line(&mut self, world: &mut World, grid: &mut GridIndex) {
        for id in self.markers.drain(..) {
            destroy(world, grid, id);
        }
    }
}
