use foundation::bounds::PixelRect;
use foundation::geo::SurfaceSize;
use foundation::math::{Snap, snap_to_grid, x_to_lon_with, y_to_lat_with};
use foundation::time::Year;
use scene::grid::{GridCell, GridDataset};

use crate::analysis::Statistics;

/// Inclusive lat/lon box on the dataset grid, in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GridBox {
    pub lat_min: i32,
    pub lat_max: i32,
    pub lon_min: i32,
    pub lon_max: i32,
}

impl GridBox {
    /// Grid box covered by a pixel rectangle. Corners go through the snapped
    /// inverse projection so the box lands on grid nodes.
    pub fn from_pixel_rect(rect: PixelRect, size: SurfaceSize) -> Option<Self> {
        if !size.is_ready() {
            return None;
        }
        let (w, h) = (size.width_f64(), size.height_f64());
        let top = y_to_lat_with(rect.min.y, h, Snap::Grid) as i32;
        let bottom = y_to_lat_with(rect.max.y, h, Snap::Grid) as i32;
        let left = x_to_lon_with(rect.min.x, w, Snap::Grid) as i32;
        let right = x_to_lon_with(rect.max.x, w, Snap::Grid) as i32;
        Some(Self {
            lat_min: top.min(bottom),
            lat_max: top.max(bottom),
            lon_min: left.min(right),
            lon_max: left.max(right),
        })
    }

    pub fn contains(&self, cell: &GridCell) -> bool {
        (self.lat_min..=self.lat_max).contains(&cell.lat)
            && (self.lon_min..=self.lon_max).contains(&cell.lon)
    }
}

/// Aggregates over user selections: a latitude row or a drawn area.
pub struct RegionalAnalysis;

impl RegionalAnalysis {
    /// Cells on the grid row nearest to `lat`.
    pub fn latitude_cells(dataset: &GridDataset, lat: f64) -> Vec<&GridCell> {
        let row = snap_to_grid(lat) as i32;
        dataset.cells_on_latitude(row).collect()
    }

    pub fn area_cells<'a>(
        dataset: &'a GridDataset,
        rect: PixelRect,
        size: SurfaceSize,
    ) -> Vec<&'a GridCell> {
        let Some(bbox) = GridBox::from_pixel_rect(rect, size) else {
            return Vec::new();
        };
        dataset.cells().iter().filter(|c| bbox.contains(c)).collect()
    }

    /// Mean of the available values of `cells` for `year`.
    pub fn mean_for_year<'a, I>(cells: I, year: Year) -> Option<f64>
    where
        I: IntoIterator<Item = &'a GridCell>,
    {
        Statistics::mean_present(cells.into_iter().map(|c| c.value(year)))
    }

    pub fn latitude_mean(dataset: &GridDataset, lat: f64, year: Year) -> Option<f64> {
        Self::mean_for_year(Self::latitude_cells(dataset, lat), year)
    }

    pub fn area_mean(
        dataset: &GridDataset,
        rect: PixelRect,
        size: SurfaceSize,
        year: Year,
    ) -> Option<f64> {
        Self::mean_for_year(Self::area_cells(dataset, rect, size), year)
    }
}
