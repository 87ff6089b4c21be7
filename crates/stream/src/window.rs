use burrow_common::CellCoord;
use glam::Vec2;

/// What the camera sees this tick: its world position and visible extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub position: Vec2,
    /// Visible width and height in world units.
    pub extent: Vec2,
}

impl Viewpoint {
    pub fn new(position: Vec2, extent: Vec2) -> Self {
        Self { position, extent }
    }

    /// Cell the viewpoint currently sits in.
    pub fn cell(&self, cell_size: f32) -> CellCoord {
        CellCoord::containing(self.position, cell_size)
    }
}

/// Inclusive rectangle of cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellWindow {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl CellWindow {
    /// Cells covering the visible area plus `padding` cells on every side,
    /// cut off above `surface_row`.
    pub fn around(viewpoint: &Viewpoint, cell_size: f32, padding: i32, surface_row: i32) -> Self {
        let half = viewpoint.extent * 0.5;
        let lo = (viewpoint.position - half) / cell_size;
        let hi = (viewpoint.position + half) / cell_size;
        Self {
            min_x: lo.x.floor() as i32 - padding,
            max_x: hi.x.ceil() as i32 + padding,
            min_y: lo.y.floor() as i32 - padding,
            max_y: (hi.y.ceil() as i32 + padding).min(surface_row),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        (self.min_x..=self.max_x).contains(&coord.x) && (self.min_y..=self.max_y).contains(&coord.y)
    }

    pub fn cell_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let w = (self.max_x - self.min_x + 1) as usize;
        let h = (self.max_y - self.min_y + 1) as usize;
        w * h
    }

    /// The window grown by `margin` cells on every side.
    pub fn grown(&self, margin: i32) -> Self {
        Self {
            min_x: self.min_x - margin,
            max_x: self.max_x + margin,
            min_y: self.min_y - margin,
            max_y: self.max_y + margin,
        }
    }

    /// Every cell in the window, column by column.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let (min_y, max_y) = (self.min_y, self.max_y);
        (self.min_x..=self.max_x).flat_map(move |x| (min_y..=max_y).map(move |y| CellCoord::new(x, y)))
    }
}
