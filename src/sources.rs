use glam::Vec2;

use crate::api::ObstacleSource;
use crate::types::*;

/// Inclusive cell span covered by `region` (cells flush against the region
/// count), clamped to the grid. Cells outside the grid are empty.
fn cell_span(
    region: Rect,
    cell_size: f32,
    width: usize,
    height: usize,
) -> Result<Option<(usize, usize, usize, usize)>, QueryError> {
    if !region.is_finite() {
        return Err(QueryError::NonFinite(region));
    }
    let x0 = ((region.min.x / cell_size).ceil() as i64 - 1).max(0);
    let y0 = ((region.min.y / cell_size).ceil() as i64 - 1).max(0);
    let x1 = ((region.max.x / cell_size).floor() as i64).min(width as i64 - 1);
    let y1 = ((region.max.y / cell_size).floor() as i64).min(height as i64 - 1);
    if x0 > x1 || y0 > y1 {
        return Ok(None);
    }
    Ok(Some((x0 as usize, x1 as usize, y0 as usize, y1 as usize)))
}

fn cell_rect(x: usize, y: usize, cell_size: f32) -> Rect {
    let min = Vec2::new(x as f32 * cell_size, y as f32 * cell_size);
    Rect::new(min, min + Vec2::splat(cell_size))
}

/// Grid of fully solid cells: every non-empty cell blocks from all sides.
/// Cell `(x, y)` spans `[x*cell_size, (x+1)*cell_size)` with y growing
/// upward; the obstacle key is the cell's row-major index.
pub struct UniformTileSource {
    width: usize,
    height: usize,
    cell_size: f32,
    solid: Vec<bool>,
}

impl UniformTileSource {
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            solid: vec![false; width * height],
        }
    }

    /// Build from string rows, top row first; `#` marks a solid cell.
    pub fn from_rows(cell_size: f32, rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut src = Self::new(width, height, cell_size);
        for (i, row) in rows.iter().enumerate() {
            let y = height - 1 - i;
            for (x, c) in row.chars().enumerate() {
                if c == '#' {
                    src.set(x, y, true);
                }
            }
        }
        src
    }

    pub fn set(&mut self, x: usize, y: usize, solid: bool) {
        debug_assert!(x < self.width && y < self.height);
        let idx = y * self.width + x;
        self.solid[idx] = solid;
    }

    pub fn is_solid(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.solid[y * self.width + x]
    }
}

impl ObstacleSource for UniformTileSource {
    fn query(&self, region: Rect) -> Result<Vec<Obstacle>, QueryError> {
        let mut out = Vec::new();
        let Some((x0, x1, y0, y1)) = cell_span(region, self.cell_size, self.width, self.height)?
        else {
            return Ok(out);
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                if self.solid[y * self.width + x] {
                    out.push(Obstacle {
                        key: (y * self.width + x) as ObKey,
                        rect: cell_rect(x, y, self.cell_size),
                    });
                }
            }
        }
        Ok(out)
    }

    fn blocks(&self, _obstacle: Obstacle, _face: Side) -> bool {
        true
    }
}

/// Grid of cells carrying a per-side blocking mask. `SideSet::NONE` cells
/// are empty. Only `TOP` set makes a one-way platform; clearing one face of
/// an otherwise solid cell makes a secret passage.
pub struct PropertyTileSource {
    width: usize,
    height: usize,
    cell_size: f32,
    sides: Vec<SideSet>,
}

impl PropertyTileSource {
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            sides: vec![SideSet::NONE; width * height],
        }
    }

    pub fn set(&mut self, x: usize, y: usize, sides: SideSet) {
        debug_assert!(x < self.width && y < self.height);
        let idx = y * self.width + x;
        self.sides[idx] = sides;
    }

    pub fn get(&self, x: usize, y: usize) -> SideSet {
        if x < self.width && y < self.height {
            self.sides[y * self.width + x]
        } else {
            SideSet::NONE
        }
    }
}

impl ObstacleSource for PropertyTileSource {
    fn query(&self, region: Rect) -> Result<Vec<Obstacle>, QueryError> {
        let mut out = Vec::new();
        let Some((x0, x1, y0, y1)) = cell_span(region, self.cell_size, self.width, self.height)?
        else {
            return Ok(out);
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                if !self.sides[y * self.width + x].is_empty() {
                    out.push(Obstacle {
                        key: (y * self.width + x) as ObKey,
                        rect: cell_rect(x, y, self.cell_size),
                    });
                }
            }
        }
        Ok(out)
    }

    fn blocks(&self, obstacle: Obstacle, face: Side) -> bool {
        self.sides
            .get(obstacle.key as usize)
            .is_some_and(|s| s.contains(face))
    }
}

/// Free-form rectangles not bound to any grid (e.g., moving platforms).
/// The key is the object's slot index; rects may be repositioned between
/// resolve calls via [`FreeObjectSource::set_rect`].
#[derive(Debug, Default)]
pub struct FreeObjectSource {
    objects: Vec<(Rect, SideSet)>,
}

impl FreeObjectSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object solid from every side.
    pub fn push(&mut self, rect: Rect) -> ObKey {
        self.push_with_sides(rect, SideSet::ALL)
    }

    /// Add an object blocking only the given sides (one-way platforms).
    pub fn push_with_sides(&mut self, rect: Rect, sides: SideSet) -> ObKey {
        let key = self.objects.len() as ObKey;
        self.objects.push((rect, sides));
        key
    }

    /// Reposition an object, for platforms that move between ticks.
    pub fn set_rect(&mut self, key: ObKey, rect: Rect) {
        debug_assert!((key as usize) < self.objects.len(), "unknown object key");
        if let Some(o) = self.objects.get_mut(key as usize) {
            o.0 = rect;
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObstacleSource for FreeObjectSource {
    fn query(&self, region: Rect) -> Result<Vec<Obstacle>, QueryError> {
        if !region.is_finite() {
            return Err(QueryError::NonFinite(region));
        }
        let mut out = Vec::new();
        for (i, (rect, _)) in self.objects.iter().enumerate() {
            // Inclusive: flush-adjacent objects are candidates too.
            let touches = rect.min.x <= region.max.x
                && rect.max.x >= region.min.x
                && rect.min.y <= region.max.y
                && rect.max.y >= region.min.y;
            if touches {
                out.push(Obstacle {
                    key: i as ObKey,
                    rect: *rect,
                });
            }
        }
        Ok(out)
    }

    fn blocks(&self, obstacle: Obstacle, face: Side) -> bool {
        self.objects
            .get(obstacle.key as usize)
            .is_some_and(|(_, sides)| sides.contains(face))
    }
}
