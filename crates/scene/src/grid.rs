use std::collections::HashMap;

use foundation::time::{FIRST_YEAR, Year};
use tracing::warn;

/// Southernmost grid row, in degrees.
pub const GRID_LAT_MIN: i32 = -88;
/// Northernmost grid row, in degrees.
pub const GRID_LAT_MAX: i32 = 88;
/// Westernmost grid column, in degrees.
pub const GRID_LON_MIN: i32 = -180;
/// Easternmost grid column, in degrees.
pub const GRID_LON_MAX: i32 = 176;
/// Grid spacing on both axes, in degrees.
pub const GRID_STEP: i32 = 4;
pub const GRID_ROWS: usize = 45;
pub const GRID_COLS: usize = 90;
pub const GRID_CELL_COUNT: usize = GRID_ROWS * GRID_COLS;

/// One yearly sample. `Missing` marks an unavailable observation; it is only
/// ever filled spatially (by interpolation within the same year), never
/// across years.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Observation {
    Value(f64),
    Missing,
}

impl Observation {
    pub fn value(self) -> Option<f64> {
        match self {
            Observation::Value(v) => Some(v),
            Observation::Missing => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct YearValue {
    pub year: Year,
    pub observation: Observation,
}

impl YearValue {
    pub fn new(year: Year, observation: Observation) -> Self {
        Self { year, observation }
    }

    pub fn value(year: Year, value: f64) -> Self {
        Self::new(year, Observation::Value(value))
    }

    pub fn missing(year: Year) -> Self {
        Self::new(year, Observation::Missing)
    }
}

/// Exact integer lookup key of a grid node. No tolerance matching.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridKey {
    pub lat: i32,
    pub lon: i32,
}

impl GridKey {
    pub fn new(lat: i32, lon: i32) -> Self {
        Self { lat, lon }
    }

    /// Whether the key lies on the 4° lattice inside the dataset extent.
    pub fn is_on_grid(&self) -> bool {
        (GRID_LAT_MIN..=GRID_LAT_MAX).contains(&self.lat)
            && (GRID_LON_MIN..=GRID_LON_MAX).contains(&self.lon)
            && (self.lat - GRID_LAT_MIN) % GRID_STEP == 0
            && (self.lon - GRID_LON_MIN) % GRID_STEP == 0
    }
}

/// A grid node and its yearly series, ordered by year.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub lat: i32,
    pub lon: i32,
    pub series: Vec<YearValue>,
}

impl GridCell {
    pub fn new(lat: i32, lon: i32, mut series: Vec<YearValue>) -> Self {
        series.sort_by_key(|yv| yv.year);
        Self { lat, lon, series }
    }

    pub fn key(&self) -> GridKey {
        GridKey::new(self.lat, self.lon)
    }

    pub fn observation(&self, year: Year) -> Option<Observation> {
        // Series normally hold one entry per year starting at FIRST_YEAR, so
        // try the direct slot before falling back to a search.
        let slot = usize::try_from(year - FIRST_YEAR).ok();
        if let Some(yv) = slot.and_then(|i| self.series.get(i))
            && yv.year == year
        {
            return Some(yv.observation);
        }
        self.series
            .binary_search_by_key(&year, |yv| yv.year)
            .ok()
            .map(|i| self.series[i].observation)
    }

    pub fn value(&self, year: Year) -> Option<f64> {
        self.observation(year).and_then(Observation::value)
    }
}

/// Immutable in-memory anomaly dataset.
///
/// Lookups by `(lat, lon)` are O(1) through an index built once at
/// construction. Nothing mutates the dataset afterwards; share it behind an
/// `Arc` to hand read-only access to several consumers.
#[derive(Debug, Default, Clone)]
pub struct GridDataset {
    cells: Vec<GridCell>,
    index: HashMap<GridKey, usize>,
}

impl GridDataset {
    /// Builds the dataset. When two cells share a key the first one wins.
    pub fn new(cells: Vec<GridCell>) -> Self {
        let mut kept = Vec::with_capacity(cells.len());
        let mut index = HashMap::with_capacity(cells.len());
        for cell in cells {
            let key = cell.key();
            if index.contains_key(&key) {
                warn!(lat = key.lat, lon = key.lon, "duplicate grid cell ignored");
                continue;
            }
            index.insert(key, kept.len());
            kept.push(cell);
        }
        Self {
            cells: kept,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell_at(&self, lat: i32, lon: i32) -> Option<&GridCell> {
        self.index
            .get(&GridKey::new(lat, lon))
            .map(|&i| &self.cells[i])
    }

    /// Value at a node for a year; `None` if the cell, the year or the
    /// observation is missing.
    pub fn value_at(&self, lat: i32, lon: i32, year: Year) -> Option<f64> {
        self.cell_at(lat, lon)?.value(year)
    }

    /// Cells on the given grid row, in load order.
    pub fn cells_on_latitude(&self, lat: i32) -> impl Iterator<Item = &GridCell> + '_ {
        self.cells.iter().filter(move |c| c.lat == lat)
    }
}
