use burrow_common::{CellCoord, EntityId};
use std::collections::{BTreeMap, BTreeSet};

/// Spawned/mined bookkeeping for world cells.
///
/// A cell is either spawned (has a live chunk), mined (permanently excluded
/// from respawn), or neither. Never both: mining a cell moves it out of the
/// spawned map, and a mined cell refuses to be spawned again.
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    spawned: BTreeMap<CellCoord, EntityId>,
    mined: BTreeSet<CellCoord>,
}

impl GridIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_spawned(&self, coord: CellCoord) -> bool {
        self.spawned.contains_key(&coord)
    }

    pub fn is_mined(&self, coord: CellCoord) -> bool {
        self.mined.contains(&coord)
    }

    /// Entity occupying a spawned cell.
    pub fn entity_at(&self, coord: CellCoord) -> Option<EntityId> {
        self.spawned.get(&coord).copied()
    }

    /// Record a live chunk at `coord`.
    ///
    /// Returns false without changing anything if the cell is mined or
    /// already spawned.
    pub fn insert_spawned(&mut self, coord: CellCoord, id: EntityId) -> bool {
        if self.mined.contains(&coord) || self.spawned.contains_key(&coord) {
            return false;
        }
        self.spawned.insert(coord, id);
        true
    }

    /// Retire a cell for the rest of the session.
    ///
    /// Idempotent: returns true only the first time the cell is mined.
    pub fn mark_mined(&mut self, coord: CellCoord) -> bool {
        self.spawned.remove(&coord);
        let newly = self.mined.insert(coord);
        if newly {
            tracing::debug!(?coord, "cell mined");
        }
        newly
    }

    /// Forget a spawned cell without mining it. The cell may be spawned again.
    pub fn unload(&mut self, coord: CellCoord) -> Option<EntityId> {
        self.spawned.remove(&coord)
    }

    /// Leftmost and rightmost spawned columns.
    pub fn spawned_x_range(&self) -> Option<(i32, i32)> {
        // Keys order by x first, so the ends of the map hold the extreme columns.
        let first = self.spawned.keys().next()?;
        let last = self.spawned.keys().next_back()?;
        Some((first.x, last.x))
    }

    /// Spawned cells in coordinate order.
    pub fn spawned(&self) -> impl Iterator<Item = (CellCoord, EntityId)> + '_ {
        self.spawned.iter().map(|(c, id)| (*c, *id))
    }

    pub fn mined(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.mined.iter().copied()
    }

    pub fn spawned_count(&self) -> usize {
        self.spawned.len()
    }

    pub fn mined_count(&self) -> usize {
        self.mined.len()
    }
}
