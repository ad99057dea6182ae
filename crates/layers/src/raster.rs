use compute::AnomalyField;
use foundation::bounds::PixelRect;
use foundation::geo::{PixelPoint, SurfaceSize};
use foundation::math::{Snap, pixel_to_geo};
use foundation::time::Year;

use crate::layer::{Layer, LayerId};
use crate::symbology::{AnomalyPalette, LayerStyle, Rgba};

/// Sub-cells per grid column at factor 1 (one per 4° of longitude).
pub const BASE_COLUMNS: u32 = 90;
/// Sub-cells per grid row at factor 1 (one per 4° of latitude).
pub const BASE_ROWS: u32 = 45;

pub const MAX_RESOLUTION_FACTOR: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyRasterConfig {
    /// Density multiplier R: the surface is split into `90·R × 45·R` sub-cells.
    pub resolution_factor: u32,
    /// Per-edge growth of every fill, hides seams between neighbours.
    pub seam_padding_px: f64,
}

impl Default for AnomalyRasterConfig {
    fn default() -> Self {
        Self {
            resolution_factor: 4,
            seam_padding_px: 1.0,
        }
    }
}

/// One rectangle to paint.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RasterFill {
    pub rect: PixelRect,
    pub color: Rgba,
    /// Interpolated anomaly behind the colour.
    pub value: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AnomalyRasterSnapshot {
    pub year: Year,
    pub size: SurfaceSize,
    pub fills: Vec<RasterFill>,
    /// Sub-cells sampled.
    pub sampled: usize,
    /// Sub-cells with data whose value fell under the visibility threshold.
    pub hidden: usize,
}

/// Continuous anomaly overlay. Produces the fill plan for one
/// (year, surface size) pair; painting is left to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyRasterLayer {
    id: LayerId,
    pub style: LayerStyle,
    pub palette: AnomalyPalette,
    pub config: AnomalyRasterConfig,
}

impl AnomalyRasterLayer {
    pub fn new(id: u64, config: AnomalyRasterConfig) -> Self {
        Self {
            id: LayerId(id),
            style: LayerStyle::default(),
            palette: AnomalyPalette::default(),
            config,
        }
    }

    /// (columns, rows) of the sub-cell lattice.
    pub fn lattice(&self) -> (u32, u32) {
        let r = self.config.resolution_factor.clamp(1, MAX_RESOLUTION_FACTOR);
        (BASE_COLUMNS * r, BASE_ROWS * r)
    }

    /// Ordering contract: fills are emitted row-major, top row first, west to
    /// east within a row.
    pub fn extract<F: AnomalyField + ?Sized>(
        &self,
        field: &F,
        year: Year,
        size: SurfaceSize,
    ) -> AnomalyRasterSnapshot {
        let mut snapshot = AnomalyRasterSnapshot {
            year,
            size,
            ..AnomalyRasterSnapshot::default()
        };
        if !size.is_ready() {
            return snapshot;
        }

        let (cols, rows) = self.lattice();
        let cell_w = size.width_f64() / f64::from(cols);
        let cell_h = size.height_f64() / f64::from(rows);
        let pad = self.config.seam_padding_px.max(0.0);

        for row in 0..rows {
            let y0 = f64::from(row) * cell_h;
            for col in 0..cols {
                let x0 = f64::from(col) * cell_w;
                let centre = PixelPoint::new(x0 + cell_w * 0.5, y0 + cell_h * 0.5);
                let Some(geo) = pixel_to_geo(centre, size, Snap::Raw) else {
                    continue;
                };
                snapshot.sampled += 1;

                let estimate = field.sample(year, geo);
                if !estimate.has_data {
                    continue;
                }
                if !self.palette.is_visible(estimate.value) {
                    snapshot.hidden += 1;
                    continue;
                }

                let rect = PixelRect::from_corners(
                    PixelPoint::new(x0, y0),
                    PixelPoint::new(x0 + cell_w, y0 + cell_h),
                )
                .expand(pad);
                snapshot.fills.push(RasterFill {
                    rect,
                    color: self.palette.color_for(estimate.value, estimate.confidence),
                    value: estimate.value,
                });
            }
        }
        snapshot
    }
}

impl Layer for AnomalyRasterLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn style(&self) -> LayerStyle {
        self.style
    }
}
