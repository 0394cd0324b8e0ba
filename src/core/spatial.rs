use std::collections::{HashMap, HashSet};

use crate::core::distance::{calculate_bounding_box, within_radius};
use crate::models::Position;

/// Grid cell edge length in degrees (~55km of latitude per cell)
///
/// Correctness never depends on this: the grid only narrows the candidate
/// set, every candidate still passes the exact inclusive haversine check.
const CELL_SIZE_DEG: f64 = 0.5;

/// Number of longitude cell columns around the globe
const LON_CELLS: i64 = (360.0 / CELL_SIZE_DEG) as i64;

type CellKey = (i32, i32);

/// In-memory spatial index over developer positions
///
/// Positions are bucketed into fixed lat/lon grid cells; a radius query
/// expands to the cells covered by the query's bounding box and then applies
/// the exact distance check. Upsert and remove are O(1); query cost is
/// proportional to the population of the touched cells.
///
/// The structure is not internally synchronized; MatchEngine owns it behind
/// a lock.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    cells: HashMap<CellKey, HashSet<String>>,
    positions: HashMap<String, Position>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell_of(position: &Position) -> CellKey {
        // Canonicalize longitude into [-180, 180) so +180 and -180 land in
        // the same column and wrapped queries can address every cell.
        let lon = (position.longitude + 180.0).rem_euclid(360.0) - 180.0;
        (
            (position.latitude / CELL_SIZE_DEG).floor() as i32,
            (lon / CELL_SIZE_DEG).floor() as i32,
        )
    }

    /// Map an unbounded cell column onto the canonical [-360, 360) range
    fn wrap_lon_cell(cell: i64) -> i32 {
        ((cell + LON_CELLS / 2).rem_euclid(LON_CELLS) - LON_CELLS / 2) as i32
    }

    /// Insert or move a developer's position
    pub fn upsert(&mut self, id: &str, position: Position) {
        if let Some(previous) = self.positions.get(id) {
            let old_cell = Self::cell_of(previous);
            let new_cell = Self::cell_of(&position);
            if old_cell != new_cell {
                if let Some(bucket) = self.cells.get_mut(&old_cell) {
                    bucket.remove(id);
                    if bucket.is_empty() {
                        self.cells.remove(&old_cell);
                    }
                }
            }
        }

        self.cells
            .entry(Self::cell_of(&position))
            .or_default()
            .insert(id.to_string());
        self.positions.insert(id.to_string(), position);
    }

    /// Remove a developer; no-op if unknown
    pub fn remove(&mut self, id: &str) {
        if let Some(position) = self.positions.remove(id) {
            let cell = Self::cell_of(&position);
            if let Some(bucket) = self.cells.get_mut(&cell) {
                bucket.remove(id);
                if bucket.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    /// All ids whose position lies within `radius_km` of `center`, inclusive
    ///
    /// Set semantics, no ordering guarantee.
    pub fn query(&self, center: &Position, radius_km: f64) -> Vec<String> {
        let bbox = calculate_bounding_box(center, radius_km);

        let min_cell_lat = (bbox.min_lat / CELL_SIZE_DEG).floor() as i32;
        let max_cell_lat = (bbox.max_lat / CELL_SIZE_DEG).floor() as i32;

        // The longitude window is unclamped and wraps modulo 360: walk the
        // covered columns and fold each back onto a canonical cell, visiting
        // at most one full circumference so no column is scanned twice.
        let min_cell_lon = (bbox.min_lon / CELL_SIZE_DEG).floor() as i64;
        let max_cell_lon = (bbox.max_lon / CELL_SIZE_DEG).floor() as i64;
        let lon_span = (max_cell_lon - min_cell_lon).min(LON_CELLS - 1);

        let mut result = Vec::new();
        for cell_lat in min_cell_lat..=max_cell_lat {
            for offset in 0..=lon_span {
                let cell_lon = Self::wrap_lon_cell(min_cell_lon + offset);
                if let Some(bucket) = self.cells.get(&(cell_lat, cell_lon)) {
                    for id in bucket {
                        if let Some(position) = self.positions.get(id) {
                            if within_radius(center, position, radius_km) {
                                result.push(id.clone());
                            }
                        }
                    }
                }
            }
        }

        result
    }

    /// Stored position for a developer, if indexed
    pub fn position_of(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
