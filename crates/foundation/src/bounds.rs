use crate::geo::PixelPoint;

/// Axis-aligned pixel rectangle with `min <= max` on both axes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PixelRect {
    pub min: PixelPoint,
    pub max: PixelPoint,
}

impl PixelRect {
    /// Builds the rectangle spanned by two arbitrary corners, whatever the
    /// drag direction was.
    pub fn from_corners(a: PixelPoint, b: PixelPoint) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: PixelPoint) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Grows the rectangle by `pad` on every edge.
    pub fn expand(self, pad: f64) -> Self {
        Self {
            min: PixelPoint::new(self.min.x - pad, self.min.y - pad),
            max: PixelPoint::new(self.max.x + pad, self.max.y + pad),
        }
    }
}
