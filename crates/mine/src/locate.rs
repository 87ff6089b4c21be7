use burrow_common::EntityId;
use burrow_kernel::World;
use glam::Vec2;

/// The closest unbroken fuel chunk seen from some origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelSignal {
    pub id: EntityId,
    /// Unit vector from the origin toward the chunk center.
    pub direction: Vec2,
    pub distance: f32,
    /// `(1 - distance / range)²`: 1 on top of the fuel, 0 at the edge of range.
    pub intensity: f32,
}

/// Find the nearest fuel chunk strictly closer than `range` to `origin`.
///
/// Ties go to the lowest entity id.
pub fn nearest_fuel(world: &World, origin: Vec2, range: f32) -> Option<FuelSignal> {
    if range.is_nan() || range <= 0.0 {
        return None;
    }
    let mut best: Option<(EntityId, Vec2, f32)> = None;
    for (id, data) in world.entities() {
        let Some(chunk) = data.chunk() else {
            continue;
        };
        if !chunk.kind.is_fuel() || chunk.subdivided {
            continue;
        }
        let offset = data.transform.position - origin;
        let distance = offset.length();
        if distance < best.map_or(range, |(_, _, d)| d) {
            best = Some((*id, offset, distance));
        }
    }
    best.map(|(id, offset, distance)| {
        let closeness = 1.0 - distance / range;
        FuelSignal {
            id,
            direction: offset.normalize_or_zero(),
            distance,
            intensity: closeness * closeness,
        }
    })
}
