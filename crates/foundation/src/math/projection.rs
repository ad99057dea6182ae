//! Equirectangular projection between geographic degrees and surface pixels.
//!
//! The map surface spans longitudes `[-180, 180]` left to right and latitudes
//! `[90, -90]` top to bottom. All functions are pure; the surface size is
//! passed in on every call so a resize only requires re-invoking them.
//!
//! The inverse direction comes in two flavours:
//! - raw: exact degrees, used when placing selection graphics;
//! - snapped: rounded to the nearest multiple of [`GRID_STEP_DEG`], used when a
//!   click has to be resolved to a dataset cell. Snapping is lossy on purpose.

use crate::geo::{GeoPoint, PixelPoint, SurfaceSize};

/// Spacing of the dataset grid, in degrees.
pub const GRID_STEP_DEG: f64 = 4.0;

/// Whether an inverse projection should be aligned to the dataset grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Snap {
    #[default]
    Raw,
    Grid,
}

impl Snap {
    #[inline]
    fn apply(self, deg: f64) -> f64 {
        match self {
            Snap::Raw => deg,
            Snap::Grid => snap_to_grid(deg),
        }
    }
}

#[inline]
pub fn lat_to_y(lat: f64, height: f64) -> f64 {
    ((90.0 - lat) / 180.0) * height
}

#[inline]
pub fn y_to_lat(y: f64, height: f64) -> f64 {
    90.0 - (y / height) * 180.0
}

#[inline]
pub fn lon_to_x(lon: f64, width: f64) -> f64 {
    ((lon + 180.0) / 360.0) * width
}

#[inline]
pub fn x_to_lon(x: f64, width: f64) -> f64 {
    (x / width) * 360.0 - 180.0
}

/// Rounds a degree value to the nearest grid multiple. Ties round upwards,
/// so `-2.0` snaps to `0.0` and `2.0` snaps to `4.0`.
#[inline]
pub fn snap_to_grid(deg: f64) -> f64 {
    let snapped = (deg / GRID_STEP_DEG + 0.5).floor() * GRID_STEP_DEG;
    // Avoid handing out -0.0 as a lookup key.
    if snapped == 0.0 { 0.0 } else { snapped }
}

pub fn y_to_lat_with(y: f64, height: f64, snap: Snap) -> f64 {
    snap.apply(y_to_lat(y, height))
}

pub fn x_to_lon_with(x: f64, width: f64, snap: Snap) -> f64 {
    snap.apply(x_to_lon(x, width))
}

pub fn geo_to_pixel(geo: GeoPoint, size: SurfaceSize) -> PixelPoint {
    PixelPoint::new(
        lon_to_x(geo.lon, size.width_f64()),
        lat_to_y(geo.lat, size.height_f64()),
    )
}

/// Inverse projection of a pixel. Returns `None` for a surface that is not
/// ready, since every pixel would map to a non-finite coordinate.
pub fn pixel_to_geo(p: PixelPoint, size: SurfaceSize, snap: Snap) -> Option<GeoPoint> {
    if !size.is_ready() {
        return None;
    }
    Some(GeoPoint::new(
        y_to_lat_with(p.y, size.height_f64(), snap),
        x_to_lon_with(p.x, size.width_f64(), snap),
    ))
}
