use crate::state::WorldState;
use rayon::prelude::*;
use serpentine_data::{FoodId, HazardId, SnakeId, Vec2};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

#[derive(Clone, Debug, Default)]
/// Uniform grid over a set of points, stored as offset-indexed cell lists.
///
/// `cell_offsets[i]..cell_offsets[i + 1]` addresses the slots of cell `i`
/// inside `entity_indices`. Slots are the positions of the points in the
/// slice passed to [`SpatialHash::build`], so callers map them back to their
/// own ids. Counting runs on rayon; placement is sequential, which keeps the
/// order inside a cell stable between runs.
///
/// # Examples
/// ```
/// use serpentine_core::spatial_hash::SpatialHash;
/// use serpentine_data::Vec2;
///
/// let mut grid = SpatialHash::new(16.0, 100.0, 100.0);
/// grid.build(&[Vec2::new(15.0, 15.0), Vec2::new(85.0, 85.0)]);
///
/// let mut nearby = Vec::new();
/// grid.query_into(Vec2::new(15.0, 15.0), 20.0, &mut nearby);
/// assert_eq!(nearby, vec![0]);
/// ```
pub struct SpatialHash {
    pub cell_size: f64,
    pub width: f64,
    pub height: f64,
    pub cols: usize,
    pub rows: usize,
    pub cell_offsets: Vec<usize>,
    pub entity_indices: Vec<usize>,
    points: Vec<Vec2>,
}

impl SpatialHash {
    pub fn new(cell_size: f64, width: f64, height: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        let cols = ((width / cell_size).ceil() as usize).max(1);
        let rows = ((height / cell_size).ceil() as usize).max(1);
        Self {
            cell_size,
            width,
            height,
            cols,
            rows,
            cell_offsets: vec![0; cols * rows + 1],
            entity_indices: Vec::new(),
            points: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn point(&self, slot: usize) -> Option<Vec2> {
        self.points.get(slot).copied()
    }

    #[inline]
    fn cell_coords(&self, p: Vec2) -> Option<(usize, usize)> {
        if !p.is_finite() {
            return None;
        }
        // Entities may sit slightly outside the world while wrapping; they
        // are filed into the nearest border cell.
        let cx = (p.x / self.cell_size).floor().clamp(0.0, (self.cols - 1) as f64);
        let cy = (p.y / self.cell_size).floor().clamp(0.0, (self.rows - 1) as f64);
        Some((cx as usize, cy as usize))
    }

    /// Flat cell index of a world position, or `None` for non-finite input.
    #[inline]
    pub fn get_cell_idx(&self, p: Vec2) -> Option<usize> {
        self.cell_coords(p).map(|(cx, cy)| cy * self.cols + cx)
    }

    pub fn build(&mut self, positions: &[Vec2]) {
        let cell_count = self.cols * self.rows;

        let atomic_counts: Vec<AtomicUsize> =
            (0..cell_count).map(|_| AtomicUsize::new(0)).collect();
        positions.par_iter().for_each(|&p| {
            if let Some(idx) = self.get_cell_idx(p) {
                atomic_counts[idx].fetch_add(1, AtomicOrdering::Relaxed);
            }
        });
        let counts: Vec<usize> = atomic_counts.into_iter().map(|a| a.into_inner()).collect();

        self.cell_offsets.resize(cell_count + 1, 0);
        let mut total = 0;
        for (i, &count) in counts.iter().enumerate() {
            self.cell_offsets[i] = total;
            total += count;
        }
        self.cell_offsets[cell_count] = total;

        self.entity_indices.clear();
        self.entity_indices.resize(total, 0);
        let mut current_offsets = self.cell_offsets[..cell_count].to_vec();
        for (slot, &p) in positions.iter().enumerate() {
            if let Some(cell_idx) = self.get_cell_idx(p) {
                self.entity_indices[current_offsets[cell_idx]] = slot;
                current_offsets[cell_idx] += 1;
            }
        }

        self.points.clear();
        self.points.extend_from_slice(positions);
    }

    #[inline]
    fn cell_slots(&self, cx: i64, cy: i64) -> &[usize] {
        if cx < 0 || cy < 0 || cx >= self.cols as i64 || cy >= self.rows as i64 {
            return &[];
        }
        let idx = cy as usize * self.cols + cx as usize;
        &self.entity_indices[self.cell_offsets[idx]..self.cell_offsets[idx + 1]]
    }

    /// Calls `callback` with every slot in the cells overlapping the square
    /// around `center`. Candidates are not distance-filtered.
    pub fn query_callback<F>(&self, center: Vec2, radius: f64, mut callback: F)
    where
        F: FnMut(usize),
    {
        if !center.is_finite() || !radius.is_finite() {
            return;
        }
        let min_cx = ((center.x - radius) / self.cell_size).floor() as i64;
        let max_cx = ((center.x + radius) / self.cell_size).floor() as i64;
        let min_cy = ((center.y - radius) / self.cell_size).floor() as i64;
        let max_cy = ((center.y + radius) / self.cell_size).floor() as i64;
        let min_cx = min_cx.max(0);
        let min_cy = min_cy.max(0);
        let max_cx = max_cx.min(self.cols as i64 - 1);
        let max_cy = max_cy.min(self.rows as i64 - 1);

        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                for &slot in self.cell_slots(cx, cy) {
                    callback(slot);
                }
            }
        }
    }

    /// Slots strictly within `radius` of `center`, in cell order.
    #[inline]
    pub fn query_into(&self, center: Vec2, radius: f64, result: &mut Vec<usize>) {
        result.clear();
        let r2 = radius * radius;
        self.query_callback(center, radius, |slot| {
            if self.points[slot].distance_squared(center) < r2 {
                result.push(slot);
            }
        });
    }

    /// Closest accepted slot within `max_radius`, searched ring by ring
    /// outwards from the cell of `center`. Ties go to the lower slot.
    pub fn nearest<F>(&self, center: Vec2, max_radius: f64, mut accept: F) -> Option<(usize, f64)>
    where
        F: FnMut(usize) -> bool,
    {
        let (ox, oy) = self.cell_coords(center)?;
        let (ox, oy) = (ox as i64, oy as i64);
        let max_ring = self.cols.max(self.rows) as i64;
        let mut best: Option<(usize, f64)> = None;

        for ring in 0..=max_ring {
            let ring_floor = (ring - 1).max(0) as f64 * self.cell_size;
            if ring_floor > max_radius {
                break;
            }
            if let Some((_, d)) = best {
                if d <= ring_floor {
                    break;
                }
            }
            for cy in (oy - ring)..=(oy + ring) {
                for cx in (ox - ring)..=(ox + ring) {
                    if (cx - ox).abs() != ring && (cy - oy).abs() != ring {
                        continue;
                    }
                    for &slot in self.cell_slots(cx, cy) {
                        let d = self.points[slot].distance(center);
                        if d > max_radius {
                            continue;
                        }
                        let better = match best {
                            None => true,
                            Some((b_slot, b_d)) => d < b_d || (d == b_d && slot < b_slot),
                        };
                        if better && accept(slot) {
                            best = Some((slot, d));
                        }
                    }
                }
            }
        }
        best
    }
}

/// Proximity queries over the entity set of the previous tick.
///
/// Holds one grid per entity family plus the slot-to-id maps; entities are
/// always handed out by id and re-resolved against [`WorldState`].
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    snakes: SpatialHash,
    snake_ids: Vec<SnakeId>,
    foods: SpatialHash,
    food_ids: Vec<FoodId>,
    hazards: SpatialHash,
    hazard_ids: Vec<HazardId>,
}

impl SpatialIndex {
    pub fn new(cell_size: f64, width: f64, height: f64) -> Self {
        Self {
            snakes: SpatialHash::new(cell_size, width, height),
            snake_ids: Vec::new(),
            foods: SpatialHash::new(cell_size, width, height),
            food_ids: Vec::new(),
            hazards: SpatialHash::new(cell_size, width, height),
            hazard_ids: Vec::new(),
        }
    }

    /// Re-indexes live snake heads, food and live hazards.
    pub fn rebuild(&mut self, state: &WorldState) {
        let (ids, heads): (Vec<SnakeId>, Vec<Vec2>) = state
            .live_snakes()
            .map(|s| (s.id, s.head()))
            .unzip();
        self.snakes.build(&heads);
        self.snake_ids = ids;

        let (ids, points): (Vec<FoodId>, Vec<Vec2>) =
            state.foods.iter().map(|f| (f.id, f.position)).unzip();
        self.foods.build(&points);
        self.food_ids = ids;

        let (ids, points): (Vec<HazardId>, Vec<Vec2>) = state
            .hazards
            .iter()
            .filter(|h| !h.is_expired())
            .map(|h| (h.id, h.position))
            .unzip();
        self.hazards.build(&points);
        self.hazard_ids = ids;
    }

    #[must_use]
    pub fn snake_count(&self) -> usize {
        self.snake_ids.len()
    }

    #[must_use]
    pub fn food_count(&self) -> usize {
        self.food_ids.len()
    }

    pub fn nearest_food(&self, from: Vec2, max_radius: f64) -> Option<(FoodId, f64)> {
        self.foods
            .nearest(from, max_radius, |_| true)
            .map(|(slot, d)| (self.food_ids[slot], d))
    }

    /// Nearest food accepted by `accept`, which sees the id and position.
    pub fn nearest_food_where<F>(
        &self,
        from: Vec2,
        max_radius: f64,
        mut accept: F,
    ) -> Option<(FoodId, f64)>
    where
        F: FnMut(FoodId, Vec2) -> bool,
    {
        let ids = &self.food_ids;
        let grid = &self.foods;
        grid.nearest(from, max_radius, |slot| {
            grid.point(slot).is_some_and(|p| accept(ids[slot], p))
        })
        .map(|(slot, d)| (ids[slot], d))
    }

    /// Nearest indexed snake head accepted by `accept`.
    pub fn nearest_snake<F>(
        &self,
        from: Vec2,
        max_radius: f64,
        mut accept: F,
    ) -> Option<(SnakeId, f64)>
    where
        F: FnMut(SnakeId) -> bool,
    {
        let ids = &self.snake_ids;
        self.snakes
            .nearest(from, max_radius, |slot| accept(ids[slot]))
            .map(|(slot, d)| (ids[slot], d))
    }

    /// Nearest live hunter other than `exclude`.
    pub fn nearest_hunter(
        &self,
        state: &WorldState,
        from: Vec2,
        max_radius: f64,
        exclude: SnakeId,
    ) -> Option<(SnakeId, f64)> {
        self.nearest_snake(from, max_radius, |id| {
            id != exclude && state.snake(id).is_some_and(|s| s.alive && s.is_hunter())
        })
    }

    pub fn nearest_hazard<F>(
        &self,
        from: Vec2,
        max_radius: f64,
        mut accept: F,
    ) -> Option<(HazardId, f64)>
    where
        F: FnMut(HazardId) -> bool,
    {
        self.hazards
            .nearest(from, max_radius, |slot| accept(self.hazard_ids[slot]))
            .map(|(slot, d)| (self.hazard_ids[slot], d))
    }

    /// Ids of indexed snake heads within `radius`, in grid order.
    pub fn snakes_within(&self, from: Vec2, radius: f64, out: &mut Vec<SnakeId>) {
        let mut slots = Vec::new();
        self.snakes.query_into(from, radius, &mut slots);
        out.clear();
        out.extend(slots.into_iter().map(|slot| self.snake_ids[slot]));
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use serpentine_data::{Food, Role, Snake};
    use uuid::Uuid;

    #[test]
    fn test_spatial_hash_query_finds_nearby() {
        let mut sh = SpatialHash::new(5.0, 20.0, 20.0);
        sh.build(&[Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0), Vec2::new(10.0, 10.0)]);

        let mut found = Vec::new();
        sh.query_into(Vec2::new(1.5, 1.5), 2.0, &mut found);
        assert_eq!(found, vec![0, 1]);
        sh.query_into(Vec2::new(1.5, 1.5), 20.0, &mut found);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_spatial_hash_rebuild_clears() {
        let mut sh = SpatialHash::new(5.0, 20.0, 20.0);
        sh.build(&[Vec2::new(1.0, 1.0)]);
        sh.build(&[]);
        let mut count = 0;
        sh.query_callback(Vec2::new(1.0, 1.0), 10.0, |_| count += 1);
        assert_eq!(count, 0);
        assert!(sh.is_empty());
    }

    #[test]
    fn test_out_of_bounds_points_clamp_into_border_cells() {
        let mut sh = SpatialHash::new(10.0, 50.0, 50.0);
        sh.build(&[Vec2::new(-4.0, 25.0), Vec2::new(f64::NAN, 1.0)]);
        assert_eq!(sh.get_cell_idx(Vec2::new(-4.0, 25.0)), Some(2 * 5));
        let mut found = Vec::new();
        sh.query_into(Vec2::new(0.0, 25.0), 5.0, &mut found);
        assert_eq!(found, vec![0]);
    }

    #[test]
    fn test_nearest_crosses_rings_and_respects_filter() {
        let mut sh = SpatialHash::new(10.0, 200.0, 200.0);
        sh.build(&[
            Vec2::new(100.0, 100.0),
            Vec2::new(104.0, 100.0),
            Vec2::new(160.0, 100.0),
        ]);
        let from = Vec2::new(101.0, 100.0);
        assert_eq!(sh.nearest(from, 500.0, |_| true).map(|r| r.0), Some(0));
        assert_eq!(sh.nearest(from, 500.0, |s| s != 0).map(|r| r.0), Some(1));
        assert_eq!(sh.nearest(from, 500.0, |s| s == 2).map(|r| r.0), Some(2));
        assert_eq!(sh.nearest(from, 30.0, |s| s == 2), None);
    }

    #[test]
    fn test_nearest_matches_brute_force() {
        let points: Vec<Vec2> = (0..40)
            .map(|i| Vec2::new((i * 37 % 97) as f64 * 3.0, (i * 53 % 89) as f64 * 3.0))
            .collect();
        let mut sh = SpatialHash::new(16.0, 300.0, 300.0);
        sh.build(&points);
        for target in [Vec2::new(0.0, 0.0), Vec2::new(150.0, 140.0), Vec2::new(299.0, 10.0)] {
            let expected = points
                .iter()
                .map(|p| p.distance(target))
                .fold(f64::INFINITY, f64::min);
            let (_, got) = sh.nearest(target, f64::INFINITY, |_| true).unwrap();
            assert!((got - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_index_resolves_ids() {
        let mut state = WorldState::new(200.0, 200.0);
        let hunter_id = Uuid::from_u128(1);
        let mut hunter = Snake::new(hunter_id, Vec2::new(50.0, 50.0), Vec2::new(1.0, 0.0), 3, 5.0);
        hunter.role = Role::Hunter;
        let me = Snake::new(Uuid::from_u128(2), Vec2::new(60.0, 50.0), Vec2::new(1.0, 0.0), 3, 5.0);
        state.snakes.push(hunter);
        state.snakes.push(me);
        state.foods.push(Food::plain(Uuid::from_u128(9), Vec2::new(70.0, 50.0)));

        let mut index = SpatialIndex::new(32.0, 200.0, 200.0);
        index.rebuild(&state);
        assert_eq!(index.snake_count(), 2);
        let (id, d) = index.nearest_food(Vec2::new(60.0, 50.0), 100.0).unwrap();
        assert_eq!(id, Uuid::from_u128(9));
        assert!((d - 10.0).abs() < 1e-9);
        let (hid, _) = index
            .nearest_hunter(&state, Vec2::new(60.0, 50.0), 100.0, Uuid::from_u128(2))
            .unwrap();
        assert_eq!(hid, hunter_id);
        assert!(index
            .nearest_hunter(&state, Vec2::new(50.0, 50.0), 100.0, hunter_id)
            .is_none());
    }
}
