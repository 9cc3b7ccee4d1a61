//! Uniform grid broad phase
//!
//! Entities are bucketed into square cells every tick. A query returns every
//! entity sharing at least one cell with the query circle, which is a superset
//! of the true overlaps; callers re-check with the narrow phase.

use std::collections::{BTreeSet, HashMap};

use glam::DVec2;

use super::entity::{Collidable, EntityRef};
use crate::consts::GRID_CELL_SIZE;

/// Cell coordinate
pub type Cell = (i32, i32);

/// Spatial hash rebuilt from scratch every tick
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<Cell, Vec<EntityRef>>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(GRID_CELL_SIZE)
    }
}

impl SpatialGrid {
    /// Non-positive or non-finite cell sizes fall back to the default
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            GRID_CELL_SIZE
        };
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    fn cell_of(&self, x: f64, y: f64) -> Cell {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Inclusive cell range covered by a circle's bounding square
    fn cell_span(&self, pos: DVec2, radius: f64) -> (Cell, Cell) {
        let r = radius.max(0.0);
        (
            self.cell_of(pos.x - r, pos.y - r),
            self.cell_of(pos.x + r, pos.y + r),
        )
    }

    /// Empty every bucket, keeping allocations for the next rebuild
    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
    }

    /// Add an entity to every cell its bounding circle touches
    pub fn insert(&mut self, entity: EntityRef, pos: DVec2, radius: f64) {
        let ((x0, y0), (x1, y1)) = self.cell_span(pos, radius);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                let bucket = self.cells.entry((cx, cy)).or_default();
                if !bucket.contains(&entity) {
                    bucket.push(entity);
                }
            }
        }
    }

    /// Insert an entity through its collision capability; inactive ones are skipped
    pub fn insert_collidable<C: Collidable + ?Sized>(&mut self, item: &C) {
        if item.is_active() {
            let body = item.body();
            self.insert(item.entity_ref(), body.pos, body.radius);
        }
    }

    /// Deduplicated candidates sharing a cell with the query circle, excluding `entity`.
    ///
    /// Sorted by `EntityRef` so iteration order is deterministic.
    pub fn query(&self, entity: EntityRef, pos: DVec2, radius: f64) -> Vec<EntityRef> {
        let ((x0, y0), (x1, y1)) = self.cell_span(pos, radius);
        let mut found = BTreeSet::new();
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    found.extend(bucket.iter().copied().filter(|e| *e != entity));
                }
            }
        }
        found.into_iter().collect()
    }

    /// Query on behalf of a collidable
    pub fn query_collidable<C: Collidable + ?Sized>(&self, item: &C) -> Vec<EntityRef> {
        let body = item.body();
        self.query(item.entity_ref(), body.pos, body.radius)
    }

    /// Number of non-empty cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.values().filter(|b| !b.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;
    use proptest::prelude::*;

    fn rock(id: u32) -> EntityRef {
        EntityRef::new(EntityKind::Rock, id)
    }

    #[test]
    fn test_entity_spanning_four_cells() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(rock(1), DVec2::new(100.0, 100.0), 10.0);
        assert_eq!(grid.occupied_cells(), 4);

        // Visible from each of the four cells
        for probe in [
            DVec2::new(50.0, 50.0),
            DVec2::new(150.0, 50.0),
            DVec2::new(50.0, 150.0),
            DVec2::new(150.0, 150.0),
        ] {
            assert_eq!(grid.query(rock(99), probe, 1.0), vec![rock(1)]);
        }
    }

    #[test]
    fn test_query_excludes_self_and_dedups() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(rock(1), DVec2::new(100.0, 100.0), 30.0);
        grid.insert(rock(2), DVec2::new(110.0, 110.0), 30.0);
        let hits = grid.query(rock(1), DVec2::new(100.0, 100.0), 30.0);
        assert_eq!(hits, vec![rock(2)]);
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(rock(1), DVec2::new(10.0, 10.0), 5.0);
        grid.clear();
        assert!(grid.query(rock(2), DVec2::new(10.0, 10.0), 5.0).is_empty());
        assert_eq!(grid.occupied_cells(), 0);
    }

    #[test]
    fn test_negative_coordinates_use_floor() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(rock(1), DVec2::new(-5.0, -5.0), 1.0);
        assert!(grid.query(rock(2), DVec2::new(5.0, 5.0), 1.0).is_empty());
        assert_eq!(grid.query(rock(2), DVec2::new(-50.0, -50.0), 1.0), vec![rock(1)]);
    }

    #[test]
    fn test_invalid_cell_size_falls_back() {
        assert_eq!(SpatialGrid::new(0.0).cell_size(), GRID_CELL_SIZE);
        assert_eq!(SpatialGrid::new(f64::NAN).cell_size(), GRID_CELL_SIZE);
    }

    proptest! {
        #[test]
        fn prop_query_is_superset_of_exact_overlaps(
            circles in prop::collection::vec((-200.0f64..1400.0, -200.0f64..900.0, 1.0f64..80.0), 1..60),
            cell in 20.0f64..250.0,
        ) {
            let mut grid = SpatialGrid::new(cell);
            for (i, &(x, y, r)) in circles.iter().enumerate() {
                grid.insert(rock(i as u32), DVec2::new(x, y), r);
            }
            for (i, &(x, y, r)) in circles.iter().enumerate() {
                let candidates = grid.query(rock(i as u32), DVec2::new(x, y), r);
                for (j, &(ox, oy, or)) in circles.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let overlaps = DVec2::new(x, y).distance(DVec2::new(ox, oy)) < r + or;
                    if overlaps {
                        prop_assert!(candidates.contains(&rock(j as u32)));
                    }
                }
                prop_assert!(!candidates.contains(&rock(i as u32)));
            }
        }
    }
}
