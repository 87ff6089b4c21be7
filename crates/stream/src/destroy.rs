use burrow_common::EntityId;
use burrow_kernel::{DestroyHook, World};

use crate::grid::GridIndex;

/// Remove an entity and run its destroy hook.
///
/// Returns false if the entity was already gone; nothing happens in that case,
/// so destroying twice is the same as destroying once.
pub fn destroy(world: &mut World, grid: &mut GridIndex, id: EntityId) -> bool {
    let Some(data) = world.despawn(id) else {
        return false;
    };
    if let Some(DestroyHook::RetireCell(coord)) = data.on_destroy {
        grid.mark_mined(coord);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_common::{CellCoord, Transform2};
    use burrow_kernel::{EntityData, EntityKind};
    use std::collections::BTreeSet;

    fn hooked(coord: CellCoord) -> EntityData {
        EntityData {
            transform: Transform2::new(coord.center(10.0), 10.0),
            kind: EntityKind::Tile,
            tags: BTreeSet::new(),
            template: "rock".into(),
            on_destroy: Some(DestroyHook::RetireCell(coord)),
        }
    }

    #[test]
    fn destroy_runs_retire_hook() {
        let mut world = World::new();
        let mut grid = GridIndex::new();
        let c = CellCoord::new(0, -1);
        let id = world.spawn(hooked(c));
        grid.insert_spawned(c, id);

        assert!(destroy(&mut world, &mut grid, id));
        assert!(grid.is_mined(c));
        assert!(!grid.is_spawned(c));
        assert!(!world.contains(id));
    }

    #[test]
    fn destroy_twice_is_a_noop() {
        let mut world = World::new();
        let mut grid = GridIndex::new();
        let c = CellCoord::new(3, -3);
        let id = world.spawn(hooked(c));
        grid.insert_spawned(c, id);

        assert!(destroy(&mut world, &mut grid, id));
        let events = world.events().len();
        assert!(!destroy(&mut world, &mut grid, id));
        assert_eq!(world.events().len(), events);
        assert_eq!(grid.mined_count(), 1);
    }
}
