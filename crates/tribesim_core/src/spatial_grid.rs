use crate::math::Vec3;

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    slot: u32,
    position: Vec3,
}

/// Uniform 3D grid over the world box, rebuilt from scratch every tick.
///
/// Storage is one flat buffer of `cells × cell_capacity` entries allocated
/// once; `clear()` only zeroes the per-cell counts. A cell that is already
/// full silently drops further inserts, so queries are approximate in very
/// dense spots.
///
/// Entries keep the position they were inserted with, letting
/// [`SpatialGrid::query_radius`] filter by true distance without touching the
/// organism store.
///
/// # Examples
/// ```
/// use tribesim_core::math::Vec3;
/// use tribesim_core::spatial_grid::SpatialGrid;
///
/// let mut grid = SpatialGrid::new(10.0, Vec3::new(100.0, 10.0, 100.0), 8);
/// grid.insert(0, Vec3::new(15.0, 0.0, 15.0));
/// grid.insert(1, Vec3::new(85.0, 0.0, 85.0));
///
/// let mut nearby = Vec::new();
/// grid.query_radius(Vec3::new(12.0, 0.0, 12.0), 5.0, &mut nearby);
/// assert_eq!(nearby, vec![0]);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    pub cell_size: f32,
    pub cols: usize,
    pub layers: usize,
    pub rows: usize,
    cell_capacity: usize,
    counts: Vec<u32>,
    entries: Vec<Entry>,
    dropped: usize,
}

impl SpatialGrid {
    /// `cols`/`rows` run along x/z, `layers` along y.
    #[must_use]
    pub fn new(cell_size: f32, bounds: Vec3, cell_capacity: usize) -> Self {
        let cell_size = cell_size.max(f32::EPSILON);
        let cols = ((bounds.x / cell_size).ceil() as usize).max(1);
        let layers = ((bounds.y / cell_size).ceil() as usize).max(1);
        let rows = ((bounds.z / cell_size).ceil() as usize).max(1);
        let cells = cols * layers * rows;
        Self {
            cell_size,
            cols,
            layers,
            rows,
            cell_capacity,
            counts: vec![0; cells],
            entries: vec![Entry::default(); cells * cell_capacity],
            dropped: 0,
        }
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn cell_capacity(&self) -> usize {
        self.cell_capacity
    }

    /// Entries dropped by full cells since the last [`SpatialGrid::clear`].
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
        self.dropped = 0;
    }

    /// Cell coordinates for a position. Points on or past the far edge land
    /// in the last cell of that axis; non-finite points have no cell.
    #[inline]
    #[must_use]
    pub fn cell_coords(&self, position: Vec3) -> Option<(i32, i32, i32)> {
        if !position.is_finite() {
            return None;
        }
        let limit = i32::MAX as f32 * self.cell_size;
        if position.x.abs() > limit || position.y.abs() > limit || position.z.abs() > limit {
            return None;
        }
        let cx = ((position.x / self.cell_size).floor() as i32).clamp(0, self.cols as i32 - 1);
        let cy = ((position.y / self.cell_size).floor() as i32).clamp(0, self.layers as i32 - 1);
        let cz = ((position.z / self.cell_size).floor() as i32).clamp(0, self.rows as i32 - 1);
        Some((cx, cy, cz))
    }

    #[inline]
    fn flat_index(&self, cx: i32, cy: i32, cz: i32) -> Option<usize> {
        if cx < 0
            || cy < 0
            || cz < 0
            || cx >= self.cols as i32
            || cy >= self.layers as i32
            || cz >= self.rows as i32
        {
            return None;
        }
        Some((cz as usize * self.layers + cy as usize) * self.cols + cx as usize)
    }

    /// Returns false when the entry was dropped (full cell or bad position).
    pub fn insert(&mut self, slot: usize, position: Vec3) -> bool {
        let Some(idx) = self
            .cell_coords(position)
            .and_then(|(cx, cy, cz)| self.flat_index(cx, cy, cz))
        else {
            self.dropped += 1;
            return false;
        };
        let count = self.counts[idx] as usize;
        if count >= self.cell_capacity {
            self.dropped += 1;
            return false;
        }
        self.entries[idx * self.cell_capacity + count] = Entry {
            slot: slot as u32,
            position,
        };
        self.counts[idx] += 1;
        true
    }

    #[inline]
    fn cell_entries(&self, idx: usize) -> &[Entry] {
        let start = idx * self.cell_capacity;
        &self.entries[start..start + self.counts[idx] as usize]
    }

    fn for_each_cell_in_box<F>(&self, min: (i32, i32, i32), max: (i32, i32, i32), mut f: F)
    where
        F: FnMut(&[Entry]),
    {
        for cz in min.2.max(0)..=max.2.min(self.rows as i32 - 1) {
            for cy in min.1.max(0)..=max.1.min(self.layers as i32 - 1) {
                for cx in min.0.max(0)..=max.0.min(self.cols as i32 - 1) {
                    if let Some(idx) = self.flat_index(cx, cy, cz) {
                        f(self.cell_entries(idx));
                    }
                }
            }
        }
    }

    fn radius_box(&self, center: Vec3, radius: f32) -> Option<((i32, i32, i32), (i32, i32, i32))> {
        if !center.is_finite() || !radius.is_finite() || radius < 0.0 {
            return None;
        }
        let cell = |v: f32| (v / self.cell_size).floor() as i32;
        Some((
            (
                cell(center.x - radius),
                cell(center.y - radius),
                cell(center.z - radius),
            ),
            (
                cell(center.x + radius),
                cell(center.y + radius),
                cell(center.z + radius),
            ),
        ))
    }

    /// Calls `callback(slot, position)` for every entry within `radius`.
    pub fn for_each_in_radius<F>(&self, center: Vec3, radius: f32, mut callback: F)
    where
        F: FnMut(usize, Vec3),
    {
        let Some((min, max)) = self.radius_box(center, radius) else {
            return;
        };
        let r2 = radius * radius;
        self.for_each_cell_in_box(min, max, |entries| {
            for e in entries {
                if e.position.distance_sq(center) <= r2 {
                    callback(e.slot as usize, e.position);
                }
            }
        });
    }

    /// Slots within `radius` of `center`, written into `result`.
    #[inline]
    pub fn query_radius(&self, center: Vec3, radius: f32, result: &mut Vec<usize>) {
        result.clear();
        self.for_each_in_radius(center, radius, |slot, _| result.push(slot));
    }

    /// Calls `callback(slot, position)` for every entry in the 27 cells around
    /// the cell containing `position`, with no distance filter.
    pub fn for_each_neighbor<F>(&self, position: Vec3, mut callback: F)
    where
        F: FnMut(usize, Vec3),
    {
        let Some((cx, cy, cz)) = self.cell_coords(position) else {
            return;
        };
        self.for_each_cell_in_box((cx - 1, cy - 1, cz - 1), (cx + 1, cy + 1, cz + 1), |entries| {
            for e in entries {
                callback(e.slot as usize, e.position);
            }
        });
    }

    #[inline]
    pub fn query_neighbors(&self, position: Vec3, result: &mut Vec<usize>) {
        result.clear();
        self.for_each_neighbor(position, |slot, _| result.push(slot));
    }

    #[must_use]
    pub fn count_in_radius(&self, center: Vec3, radius: f32) -> usize {
        let mut count = 0;
        self.for_each_in_radius(center, radius, |_, _| count += 1);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SpatialGrid {
        SpatialGrid::new(5.0, Vec3::new(20.0, 10.0, 20.0), 4)
    }

    #[test]
    fn test_query_radius_filters_by_distance() {
        let mut g = grid();
        g.insert(0, Vec3::new(1.0, 0.0, 1.0));
        g.insert(1, Vec3::new(2.0, 0.0, 2.0));
        g.insert(2, Vec3::new(10.0, 0.0, 10.0));
        let mut out = Vec::new();
        g.query_radius(Vec3::new(1.5, 0.0, 1.5), 2.0, &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn test_neighbors_cover_adjacent_cells_only() {
        let mut g = grid();
        g.insert(0, Vec3::new(4.9, 0.0, 4.9));
        g.insert(1, Vec3::new(6.0, 0.0, 6.0));
        g.insert(2, Vec3::new(19.0, 9.0, 19.0));
        let mut out = Vec::new();
        g.query_neighbors(Vec3::new(1.0, 0.0, 1.0), &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn test_full_cell_drops_silently() {
        let mut g = grid();
        for slot in 0..6 {
            g.insert(slot, Vec3::new(1.0, 1.0, 1.0));
        }
        assert_eq!(g.count_in_radius(Vec3::new(1.0, 1.0, 1.0), 0.5), 4);
        assert_eq!(g.dropped(), 2);
    }

    #[test]
    fn test_clear_empties_every_cell() {
        let mut g = grid();
        g.insert(0, Vec3::new(1.0, 0.0, 1.0));
        g.clear();
        assert_eq!(g.count_in_radius(Vec3::new(1.0, 0.0, 1.0), 50.0), 0);
        assert_eq!(g.dropped(), 0);
    }

    #[test]
    fn test_far_edge_maps_to_last_cell() {
        let mut g = grid();
        assert!(g.insert(0, Vec3::new(20.0, 10.0, 20.0)));
        assert_eq!(g.count_in_radius(Vec3::new(19.0, 9.0, 19.0), 2.0), 1);
    }

    #[test]
    fn test_non_finite_positions_are_ignored() {
        let mut g = grid();
        assert!(!g.insert(0, Vec3::new(f32::NAN, 0.0, 0.0)));
        let mut out = vec![99];
        g.query_radius(Vec3::new(f32::INFINITY, 0.0, 0.0), 3.0, &mut out);
        assert!(out.is_empty());
    }
}
