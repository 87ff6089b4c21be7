use std::collections::BTreeSet;
use std::time::Duration;

use burrow_common::{ChunkKind, ConsumableKind, EntityId, Tag};
use burrow_kernel::{EntityData, EntityKind, TimerQueue, World};
use burrow_lava::{LavaFront, LavaStep};
use burrow_mine::{BreakOutcome, Breaker, FuelPool, FuelSignal, PlayerStats, ResourcePool, nearest_fuel, pickup};
use burrow_stream::{GridIndex, ScanReport, Streamer, Viewpoint, destroy};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::error::ConfigError;

/// Work deferred to a later tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    Break(EntityId),
    LavaStep,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    Running,
    /// The tank ran dry. `depth` is the final score.
    GameOver { depth: f32 },
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub scan: Option<ScanReport>,
    pub breaks: Vec<BreakOutcome>,
    /// Row of the first lava line, on the tick the front wakes up.
    pub lava_activated: Option<i32>,
    pub lava_steps: Vec<LavaStep>,
    pub collected: Vec<ConsumableKind>,
    pub game_over: bool,
    /// World events recorded this tick. The log is drained every tick.
    pub events: usize,
}

/// One run of the game from fresh world to game over.
///
/// Owns every piece of mutable game state; nothing is global.
pub struct Session {
    config: GameConfig,
    world: World,
    grid: GridIndex,
    streamer: Streamer,
    breaker: Breaker,
    pool: FuelPool,
    stats: PlayerStats,
    lava: LavaFront,
    timers: TimerQueue<Scheduled>,
    pending_breaks: BTreeSet<EntityId>,
    rng: StdRng,
    state: SessionState,
}

impl Session {
    /// Validate `config` and build a fresh session from it.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let templates = config
            .validate()
            .inspect_err(|err| tracing::error!(%err, "invalid game config"))?;
        let streamer = Streamer::new(config.stream.clone(), &templates, config.mine.grid_size)?;
        let breaker = Breaker::new(config.mine.clone(), &templates)?;
        let lava = LavaFront::new(config.lava.clone(), &templates, streamer.cell_size())?;
        tracing::info!(seed = config.seed, cell_size = streamer.cell_size(), "session started");

        Ok(Self {
            world: World::with_seed(config.seed),
            grid: GridIndex::new(),
            streamer,
            breaker,
            pool: FuelPool::new(&config.fuel),
            stats: PlayerStats::default(),
            lava,
            timers: TimerQueue::new(),
            pending_breaks: BTreeSet::new(),
            rng: StdRng::seed_from_u64(config.seed),
            state: SessionState::Running,
            config,
        })
    }

    /// Throw everything away and start over with the same config.
    pub fn restart(&mut self) -> Result<(), ConfigError> {
        *self = Self::new(self.config.clone())?;
        Ok(())
    }

    /// Advance the game by `dt` with the camera at `viewpoint`.
    ///
    /// Does nothing once the game is over.
    pub fn tick(&mut self, dt: Duration, viewpoint: &Viewpoint) -> TickReport {
        if self.is_over() {
            return TickReport {
                tick: self.world.tick(),
                game_over: true,
                ..TickReport::default()
            };
        }
        let _span = tracing::info_span!("session_tick", tick = self.world.tick() + 1).entered();

        self.world.step(dt);
        self.pool.drain(dt);
        let mut report = TickReport {
            tick: self.world.tick(),
            scan: self
                .streamer
                .update(&mut self.world, &mut self.grid, viewpoint, &mut self.rng),
            ..TickReport::default()
        };

        let now = self.world.elapsed();
        for (_, job) in self.timers.pop_due(now) {
            match job {
                Scheduled::Break(id) => {
                    self.pending_breaks.remove(&id);
                    let outcome =
                        self.breaker
                            .break_entity(&mut self.world, &mut self.grid, &mut self.pool, id, &mut self.rng);
                    if outcome != BreakOutcome::Skipped {
                        report.breaks.push(outcome);
                    }
                }
                Scheduled::LavaStep => {
                    if let Some(step) = self.lava.step(&mut self.world, &mut self.grid) {
                        report.lava_steps.push(step);
                    }
                }
            }
        }

        report.lava_activated = self
            .lava
            .update(&mut self.world, &self.grid, viewpoint.position.y);
        if report.lava_activated.is_some() {
            let interval = secs(self.config.lava.seconds_per_row);
            self.timers
                .schedule_repeating(now + interval, interval, Scheduled::LavaStep);
        }

        report.collected = self.collect_pickups(viewpoint.position);

        if self.pool.is_depleted() {
            let depth = self.depth(viewpoint.position.y);
            self.state = SessionState::GameOver { depth };
            report.game_over = true;
            tracing::info!(depth, tick = report.tick, "fuel depleted, game over");
        }

        report.events = self.world.drain_events().len();
        tracing::trace!(
            tick = report.tick,
            fuel = self.pool.level(),
            entities = self.world.entity_count(),
            events = report.events,
            "tick complete"
        );
        report
    }

    /// Queue a break on the first mineable entity under `point`.
    pub fn mine_at(&mut self, point: Vec2) -> bool {
        let target = self
            .world
            .entities_at(point)
            .into_iter()
            .find(|id| self.world.get(*id).is_some_and(is_mineable));
        match target {
            Some(id) => self.schedule_break(id),
            None => false,
        }
    }

    /// Sweep the mining tool from `origin` along `direction` and queue a break
    /// on the nearest mineable entity it reaches.
    pub fn mine_toward(&mut self, origin: Vec2, direction: Vec2) -> bool {
        let hit = self.world.cast_box(
            origin,
            direction,
            self.config.mine.mining_width,
            self.config.mine.mining_distance,
            is_mineable,
        );
        match hit {
            Some(hit) => self.schedule_break(hit.id),
            None => false,
        }
    }

    /// Closest unbroken fuel chunk within `range` of `origin`.
    pub fn nearest_fuel(&self, origin: Vec2, range: f32) -> Option<FuelSignal> {
        nearest_fuel(&self.world, origin, range)
    }

    /// Distance below the depth origin.
    pub fn depth(&self, y: f32) -> f32 {
        (self.config.depth_origin_y - y).abs()
    }

    fn schedule_break(&mut self, id: EntityId) -> bool {
        if self.is_over() || self.pending_breaks.contains(&id) {
            return false;
        }
        let delay = secs(self.config.mine.break_delay_secs / self.stats.mining_speed);
        self.timers
            .schedule_once(self.world.elapsed() + delay, Scheduled::Break(id));
        self.pending_breaks.insert(id);
        tracing::debug!(?id, ?delay, "break scheduled");
        true
    }

    fn collect_pickups(&mut self, position: Vec2) -> Vec<ConsumableKind> {
        let radius = self.config.mine.pickup_radius;
        let touched: Vec<(EntityId, ConsumableKind)> = self
            .world
            .entities()
            .iter()
            .filter_map(|(id, data)| match data.kind {
                EntityKind::Pickup(kind) if data.transform.position.distance(position) <= radius => {
                    Some((*id, kind))
                }
                _ => None,
            })
            .collect();
        touched
            .into_iter()
            .map(|(id, kind)| {
                destroy(&mut self.world, &mut self.grid, id);
                pickup::apply(kind, &mut self.stats, &mut self.pool);
                kind
            })
            .collect()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, SessionState::GameOver { .. })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    pub fn streamer(&self) -> &Streamer {
        &self.streamer
    }

    pub fn pool(&self) -> &FuelPool {
        &self.pool
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    pub fn lava(&self) -> &LavaFront {
        &self.lava
    }

    pub fn pending_breaks(&self) -> usize {
        self.pending_breaks.len()
    }

    pub fn cell_size(&self) -> f32 {
        self.streamer.cell_size()
    }
}

fn is_mineable(data: &EntityData) -> bool {
    match data.chunk() {
        Some(chunk) => chunk.kind != ChunkKind::LavaMarker && !chunk.subdivided,
        None => matches!(data.kind, EntityKind::Tile) && data.has_tag(Tag::Breakable),
    }
}

fn secs(seconds: f32) -> Duration {
    Duration::try_from_secs_f32(seconds).unwrap_or_default()
}
