use burrow_common::{CellCoord, ChunkKind, ConsumableKind, EntityId, Tag, Transform2};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// An event record produced by every mutation to the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorldEvent {
    /// Entity was spawned with the given data.
    Spawned { id: EntityId, data: EntityData },
    /// Entity was despawned. Carries the transform it had.
    Despawned { id: EntityId, transform: Transform2 },
    /// Simulation advanced one tick.
    Stepped { tick: u64, seed: u64, elapsed: Duration },
}

/// Per-chunk state for entities that occupy a whole grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkData {
    pub coord: CellCoord,
    pub kind: ChunkKind,
    /// Set once the chunk has been broken so it can never break twice.
    pub subdivided: bool,
    /// Number of fine tiles per side produced when a rock chunk breaks.
    pub grid_size: u32,
}

/// What an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Chunk(ChunkData),
    /// A fine tile left behind by a subdivided chunk.
    Tile,
    Pickup(ConsumableKind),
}

/// Action run by whoever destroys the entity.
///
/// The kernel stores hooks but never runs them; `World::despawn` hands the
/// hook back with the removed data so the caller can dispatch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyHook {
    /// Report the cell as permanently mined.
    RetireCell(CellCoord),
}

/// Per-entity data stored in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    pub transform: Transform2,
    pub kind: EntityKind,
    pub tags: BTreeSet<Tag>,
    /// Name of the template this entity was built from.
    pub template: String,
    pub on_destroy: Option<DestroyHook>,
}

impl EntityData {
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn chunk(&self) -> Option<&ChunkData> {
        match &self.kind {
            EntityKind::Chunk(chunk) => Some(chunk),
            _ => None,
        }
    }
}

/// Nearest entity hit by `World::cast_box`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxHit {
    pub id: EntityId,
    /// Distance along the cast direction at which the box first touches the entity.
    pub distance: f32,
}

/// The authoritative world state.
///
/// All mutations go through explicit operations. Uses BTreeMap for
/// deterministic iteration order, and hands out sequential entity ids so a
/// seeded session replays identically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    entities: BTreeMap<EntityId, EntityData>,
    next_id: u64,
    tick: u64,
    /// Seed for deterministic RNG. Advanced each step.
    seed: u64,
    /// Simulated time since the world was created.
    elapsed: Duration,
    /// Append-only event log of all mutations.
    #[serde(skip)]
    event_log: Vec<WorldEvent>,
}

impl World {
    /// Create an empty world at tick 0 with seed 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a world with a specific seed for deterministic replay.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Current simulation tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Current RNG seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Simulated time since creation.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Events recorded since the last drain.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Read-only access to all entities (BTreeMap for deterministic iteration).
    pub fn entities(&self) -> &BTreeMap<EntityId, EntityData> {
        &self.entities
    }

    /// Spawn a new entity. Returns its id.
    pub fn spawn(&mut self, data: EntityData) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.event_log.push(WorldEvent::Spawned {
            id,
            data: data.clone(),
        });
        self.entities.insert(id, data);
        id
    }

    /// Remove an entity. Returns the data if it existed.
    ///
    /// The entity's destroy hook is returned untouched inside the data.
    pub fn despawn(&mut self, id: EntityId) -> Option<EntityData> {
        let data = self.entities.remove(&id);
        if let Some(ref d) = data {
            self.event_log.push(WorldEvent::Despawned {
                id,
                transform: d.transform,
            });
        }
        data
    }

    /// Check if an entity exists.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Get a reference to entity data.
    pub fn get(&self, id: EntityId) -> Option<&EntityData> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to entity data.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityData> {
        self.entities.get_mut(&id)
    }

    /// Advance the simulation by one tick of `dt`.
    pub fn step(&mut self, dt: Duration) {
        self.tick += 1;
        self.elapsed += dt;
        self.seed = splitmix64(self.seed);
        self.event_log.push(WorldEvent::Stepped {
            tick: self.tick,
            seed: self.seed,
            elapsed: self.elapsed,
        });
    }

    /// Entities whose footprint contains `point`, in id order.
    pub fn entities_at(&self, point: Vec2) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, data)| data.transform.contains(point))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Sweep a square box of edge `width` from `origin` along `direction`
    /// and return the nearest entity accepted by `filter` within `max_distance`.
    ///
    /// An entity already overlapping the box at the origin is hit at distance 0.
    /// A zero direction never hits anything.
    pub fn cast_box(
        &self,
        origin: Vec2,
        direction: Vec2,
        width: f32,
        max_distance: f32,
        filter: impl Fn(&EntityData) -> bool,
    ) -> Option<BoxHit> {
        let dir = direction.try_normalize()?;
        let inflate = Vec2::splat(width * 0.5);
        let mut best: Option<BoxHit> = None;
        for (id, data) in &self.entities {
            if !filter(data) {
                continue;
            }
            let (min, max) = data.transform.bounds();
            let Some(distance) = ray_aabb(origin, dir, min - inflate, max + inflate) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            // Strict comparison keeps the lowest id on ties.
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(BoxHit { id: *id, distance });
            }
        }
        best
    }

    /// Reconstruct world state from a sequence of events (for replay).
    pub fn replay(events: &[WorldEvent]) -> Self {
        let mut world = Self::new();
        for event in events {
            match event {
                WorldEvent::Spawned { id, data } => {
                    world.entities.insert(*id, data.clone());
                    world.next_id = world.next_id.max(id.0 + 1);
                }
                WorldEvent::Despawned { id, .. } => {
                    world.entities.remove(id);
                }
                WorldEvent::Stepped {
                    tick,
                    seed,
                    elapsed,
                } => {
                    world.tick = *tick;
                    world.seed = *seed;
                    world.elapsed = *elapsed;
                }
            }
        }
        world
    }

    /// Compute a deterministic hash of the world state for comparison.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        mix(&mut h, &self.seed.to_le_bytes());
        for (id, data) in &self.entities {
            mix(&mut h, &id.0.to_le_bytes());
            mix(&mut h, &data.transform.position.x.to_le_bytes());
            mix(&mut h, &data.transform.position.y.to_le_bytes());
            mix(&mut h, &data.transform.size.to_le_bytes());
            mix(&mut h, data.template.as_bytes());
        }
        h
    }
}

/// Entry distance of a ray into an axis-aligned box, or `None` if it misses.
fn ray_aabb(origin: Vec2, dir: Vec2, min: Vec2, max: Vec2) -> Option<f32> {
    let mut t_enter = 0.0f32;
    let mut t_exit = f32::INFINITY;
    let (o, d, lo, hi) = (
        origin.to_array(),
        dir.to_array(),
        min.to_array(),
        max.to_array(),
    );
    for axis in 0..2 {
        if d[axis].abs() < f32::EPSILON {
            if o[axis] < lo[axis] || o[axis] > hi[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d[axis];
        let mut t1 = (lo[axis] - o[axis]) * inv;
        let mut t2 = (hi[axis] - o[axis]) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_enter = t_enter.max(t1);
        t_exit = t_exit.min(t2);
        if t_enter > t_exit {
            return None;
        }
    }
    Some(t_enter)
}

/// Splitmix64 step function used to advance the world seed each tick.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
