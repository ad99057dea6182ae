//! Continuous anomaly estimate from the sparse 4° grid.
//!
//! For a position inside a grid cell the four corner nodes are looked up for
//! the requested year and combined with a degrading policy:
//!
//! | corners present | value                     | confidence |
//! |-----------------|---------------------------|------------|
//! | 0               | none (`has_data = false`) | 0          |
//! | 1               | that corner               | 0.3        |
//! | 2 or 3          | mean of present corners   | n / 4      |
//! | 4               | bilinear                  | 1          |
//!
//! A position exactly on a node whose own value is present returns that value
//! with confidence 1 whatever its neighbours hold. `corners` counts the nodes
//! that contributed to the value, so an exact node hit reports 1 node at full
//! confidence where the single-corner rule reports 1 node at 0.3.

use foundation::geo::GeoPoint;
use foundation::time::Year;
use scene::grid::{GRID_STEP, GridDataset};

use crate::analysis::Statistics;

/// Confidence assigned to a single-corner point estimate.
pub const SINGLE_CORNER_CONFIDENCE: f64 = 0.3;

const STEP: f64 = GRID_STEP as f64;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Estimate {
    pub has_data: bool,
    pub value: f64,
    pub confidence: f64,
    /// Grid nodes that contributed to `value`, not the number of corners
    /// holding data: an exact node hit reports 1.
    pub corners: u8,
}

impl Estimate {
    pub const NO_DATA: Estimate = Estimate {
        has_data: false,
        value: 0.0,
        confidence: 0.0,
        corners: 0,
    };

    pub fn value(&self) -> Option<f64> {
        self.has_data.then_some(self.value)
    }
}

/// A year-indexed scalar field that can be sampled anywhere on the globe.
pub trait AnomalyField {
    fn sample(&self, year: Year, at: GeoPoint) -> Estimate;
}

/// South-west corner (`lat1`, `lon1`) of the grid cell enclosing a position.
pub fn enclosing_cell(at: GeoPoint) -> (i32, i32) {
    let lat1 = (at.lat / STEP).floor() * STEP;
    let lon1 = (at.lon / STEP).floor() * STEP;
    (lat1 as i32, lon1 as i32)
}

/// Bilinear / mean / point estimator over a [`GridDataset`].
#[derive(Debug, Copy, Clone)]
pub struct GridInterpolator<'a> {
    dataset: &'a GridDataset,
}

impl<'a> GridInterpolator<'a> {
    pub fn new(dataset: &'a GridDataset) -> Self {
        Self { dataset }
    }

    pub fn interpolate(&self, year: Year, at: GeoPoint) -> Estimate {
        if !at.lat.is_finite() || !at.lon.is_finite() {
            return Estimate::NO_DATA;
        }

        let (lat1, lon1) = enclosing_cell(at);
        let (lat2, lon2) = (lat1 + GRID_STEP, lon1 + GRID_STEP);

        let v11 = self.dataset.value_at(lat1, lon1, year);
        if at.lat == f64::from(lat1)
            && at.lon == f64::from(lon1)
            && let Some(v) = v11
        {
            return Estimate {
                has_data: true,
                value: v,
                confidence: 1.0,
                corners: 1,
            };
        }

        let v12 = self.dataset.value_at(lat1, lon2, year);
        let v21 = self.dataset.value_at(lat2, lon1, year);
        let v22 = self.dataset.value_at(lat2, lon2, year);

        match (v11, v12, v21, v22) {
            (Some(v11), Some(v12), Some(v21), Some(v22)) => {
                let fx = (at.lon - f64::from(lon1)) / STEP;
                let fy = (at.lat - f64::from(lat1)) / STEP;
                let top = v11 * (1.0 - fx) + v12 * fx;
                let bottom = v21 * (1.0 - fx) + v22 * fx;
                Estimate {
                    has_data: true,
                    value: top * (1.0 - fy) + bottom * fy,
                    confidence: 1.0,
                    corners: 4,
                }
            }
            corners => {
                let present: Vec<f64> = [corners.0, corners.1, corners.2, corners.3]
                    .into_iter()
                    .flatten()
                    .collect();
                let Some(mean) = Statistics::mean(&present) else {
                    return Estimate::NO_DATA;
                };
                let count = present.len() as u8;
                let confidence = if count == 1 {
                    SINGLE_CORNER_CONFIDENCE
                } else {
                    f64::from(count) / 4.0
                };
                Estimate {
                    has_data: true,
                    value: mean,
                    confidence,
                    corners: count,
                }
            }
        }
    }
}

impl AnomalyField for GridInterpolator<'_> {
    fn sample(&self, year: Year, at: GeoPoint) -> Estimate {
        self.interpolate(year, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::grid::{GridCell, YearValue};

    const YEAR: Year = 1990;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn node(lat: i32, lon: i32, v: Option<f64>) -> GridCell {
        let yv = match v {
            Some(v) => YearValue::value(YEAR, v),
            None => YearValue::missing(YEAR),
        };
        GridCell::new(lat, lon, vec![yv])
    }

    /// Cell with south-west corner (0, 0): v11=(0,0) v12=(0,4) v21=(4,0) v22=(4,4).
    fn cell(v11: Option<f64>, v12: Option<f64>, v21: Option<f64>, v22: Option<f64>) -> GridDataset {
        GridDataset::new(vec![
            node(0, 0, v11),
            node(0, 4, v12),
            node(4, 0, v21),
            node(4, 4, v22),
        ])
    }

    #[test]
    fn enclosing_cell_floors_toward_south_west() {
        assert_eq!(enclosing_cell(GeoPoint::new(1.0, 1.0)), (0, 0));
        assert_eq!(enclosing_cell(GeoPoint::new(-1.0, -0.5)), (-4, -4));
        assert_eq!(enclosing_cell(GeoPoint::new(-4.0, 178.0)), (-4, 176));
        assert_eq!(enclosing_cell(GeoPoint::new(88.5, -180.0)), (88, -180));
    }

    #[test]
    fn grid_node_returns_exact_value() {
        let ds = cell(Some(1.5), Some(-2.0), Some(0.25), Some(3.0));
        let interp = GridInterpolator::new(&ds);
        for (lat, lon, v) in [(0, 0, 1.5), (0, 4, -2.0), (4, 0, 0.25), (4, 4, 3.0)] {
            let e = interp.interpolate(YEAR, GeoPoint::new(f64::from(lat), f64::from(lon)));
            assert!(e.has_data);
            assert_eq!(e.value, v);
            assert_eq!(e.confidence, 1.0);
        }
    }

    #[test]
    fn grid_node_is_exact_even_with_missing_neighbours() {
        let ds = cell(Some(0.75), None, None, None);
        let e = GridInterpolator::new(&ds).interpolate(YEAR, GeoPoint::new(0.0, 0.0));
        assert_eq!(e.value(), Some(0.75));
        assert_eq!(e.confidence, 1.0);
        assert_eq!(e.corners, 1);

        // Same lone node seen from inside the cell falls back to the point rule.
        let inside = GridInterpolator::new(&ds).interpolate(YEAR, GeoPoint::new(1.0, 1.0));
        assert_eq!(inside.value(), Some(0.75));
        assert_eq!(inside.corners, 1);
        assert_eq!(inside.confidence, SINGLE_CORNER_CONFIDENCE);
    }

    #[test]
    fn cell_centre_is_mean_of_corners() {
        let ds = cell(Some(1.0), Some(2.0), Some(3.0), Some(6.0));
        let e = GridInterpolator::new(&ds).interpolate(YEAR, GeoPoint::new(2.0, 2.0));
        assert_close(e.value, 3.0, 1e-12);
        assert_eq!(e.confidence, 1.0);
        assert_eq!(e.corners, 4);
    }

    #[test]
    fn bilinear_weights_follow_position() {
        let ds = cell(Some(0.0), Some(4.0), Some(0.0), Some(4.0));
        let interp = GridInterpolator::new(&ds);
        // fx = 0.25 along longitude, no variation along latitude.
        assert_close(interp.interpolate(YEAR, GeoPoint::new(3.0, 1.0)).value, 1.0, 1e-12);

        let ds = cell(Some(0.0), Some(0.0), Some(8.0), Some(8.0));
        let interp = GridInterpolator::new(&ds);
        // fy = 0.75 along latitude.
        assert_close(interp.interpolate(YEAR, GeoPoint::new(3.0, 2.0)).value, 6.0, 1e-12);
    }

    #[test]
    fn no_corners_means_no_data() {
        let ds = cell(None, None, None, None);
        let e = GridInterpolator::new(&ds).interpolate(YEAR, GeoPoint::new(1.0, 1.0));
        assert_eq!(e, Estimate::NO_DATA);
        assert_eq!(e.value(), None);

        let empty = GridDataset::default();
        assert!(!GridInterpolator::new(&empty).interpolate(YEAR, GeoPoint::new(1.0, 1.0)).has_data);
    }

    #[test]
    fn single_corner_is_low_confidence_point_estimate() {
        let ds = cell(None, None, None, Some(-1.25));
        let e = GridInterpolator::new(&ds).interpolate(YEAR, GeoPoint::new(0.5, 0.5));
        assert_eq!(e.value, -1.25);
        assert_eq!(e.confidence, 0.3);
        assert_eq!(e.corners, 1);
    }

    #[test]
    fn partial_corners_average_with_proportional_confidence() {
        let ds = cell(Some(1.0), None, Some(2.0), None);
        let e = GridInterpolator::new(&ds).interpolate(YEAR, GeoPoint::new(1.0, 3.0));
        assert_close(e.value, 1.5, 1e-12);
        assert_eq!(e.confidence, 0.5);

        let ds = cell(Some(1.0), Some(2.0), Some(6.0), None);
        let e = GridInterpolator::new(&ds).interpolate(YEAR, GeoPoint::new(1.0, 3.0));
        assert_close(e.value, 3.0, 1e-12);
        assert_eq!(e.confidence, 0.75);
    }

    #[test]
    fn other_years_and_non_finite_positions_have_no_data() {
        let ds = cell(Some(1.0), Some(1.0), Some(1.0), Some(1.0));
        let interp = GridInterpolator::new(&ds);
        assert!(!interp.interpolate(YEAR + 1, GeoPoint::new(1.0, 1.0)).has_data);
        assert!(!interp.interpolate(YEAR, GeoPoint::new(f64::NAN, 1.0)).has_data);
    }

    #[test]
    fn longitude_does_not_wrap_at_antimeridian() {
        let ds = GridDataset::new(vec![node(0, 176, Some(1.0)), node(0, -180, Some(5.0))]);
        let e = GridInterpolator::new(&ds).interpolate(YEAR, GeoPoint::new(1.0, 178.0));
        assert_eq!(e.corners, 1);
        assert_eq!(e.value, 1.0);
    }
}
