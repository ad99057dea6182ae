use foundation::geo::{PixelPoint, SurfaceSize};
use foundation::math::{Snap, pixel_to_geo};
use foundation::time::Year;

use crate::grid::{GridCell, GridDataset, GridKey};

/// Grid node under a surface pixel, resolved with the snapped inverse
/// projection. Returns `None` if the surface is not ready.
pub fn grid_key_at(p: PixelPoint, size: SurfaceSize) -> Option<GridKey> {
    let geo = pixel_to_geo(p, size, Snap::Grid)?;
    Some(GridKey::new(geo.lat as i32, geo.lon as i32))
}

/// Dataset cell under a surface pixel, if the dataset has one there.
pub fn pick_cell<'a>(
    dataset: &'a GridDataset,
    p: PixelPoint,
    size: SurfaceSize,
) -> Option<&'a GridCell> {
    let key = grid_key_at(p, size)?;
    dataset.cell_at(key.lat, key.lon)
}

/// Observed value of the cell under a pixel for `year`.
pub fn pick_value(
    dataset: &GridDataset,
    p: PixelPoint,
    size: SurfaceSize,
    year: Year,
) -> Option<f64> {
    pick_cell(dataset, p, size)?.value(year)
}
