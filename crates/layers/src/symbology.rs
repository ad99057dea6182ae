/// Anomaly values are clamped into this domain before bucketing.
pub const VALUE_DOMAIN: (f64, f64) = (-4.0, 6.5);

/// Values with a smaller magnitude are not painted.
pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.1;

const BASE_ALPHA: f32 = 0.45;
const CONFIDENCE_ALPHA: f32 = 0.2;
const NEUTRAL_ALPHA: f32 = 0.08;

/// Index of the neutral band in [`ANOMALY_BANDS`].
pub const NEUTRAL_BAND: usize = 6;

/// 8-bit colour with a fractional alpha.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let a = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        [self.r, self.g, self.b, a]
    }
}

/// One palette band. A value belongs to the first band whose `upper` edge it
/// does not exceed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorBand {
    pub upper: f64,
    pub rgb: [u8; 3],
    /// Extra opacity; grows with distance from the neutral band.
    pub alpha_bump: f32,
}

const fn band(upper: f64, rgb: [u8; 3], alpha_bump: f32) -> ColorBand {
    ColorBand {
        upper,
        rgb,
        alpha_bump,
    }
}

/// Cold blue through neutral white to warm red.
pub const ANOMALY_BANDS: [ColorBand; 13] = [
    band(-3.0, [5, 48, 97], 0.22),
    band(-2.5, [33, 102, 172], 0.17),
    band(-2.0, [67, 147, 195], 0.13),
    band(-1.5, [115, 178, 214], 0.09),
    band(-1.0, [146, 197, 222], 0.05),
    band(-0.5, [209, 229, 240], 0.02),
    band(0.5, [247, 247, 247], 0.0),
    band(1.0, [253, 219, 199], 0.02),
    band(1.5, [244, 165, 130], 0.05),
    band(2.0, [230, 120, 90], 0.09),
    band(2.5, [214, 96, 77], 0.13),
    band(3.0, [178, 24, 43], 0.17),
    band(f64::INFINITY, [103, 0, 13], 0.22),
];

/// Value → colour mapping for the anomaly overlay.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnomalyPalette {
    pub visibility_threshold: f64,
}

impl Default for AnomalyPalette {
    fn default() -> Self {
        Self {
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
        }
    }
}

impl AnomalyPalette {
    pub fn new(visibility_threshold: f64) -> Self {
        Self {
            visibility_threshold,
        }
    }

    pub fn band_index(&self, value: f64) -> usize {
        let v = value.clamp(VALUE_DOMAIN.0, VALUE_DOMAIN.1);
        ANOMALY_BANDS
            .iter()
            .position(|b| v <= b.upper)
            .unwrap_or(ANOMALY_BANDS.len() - 1)
    }

    pub fn band(&self, value: f64) -> &'static ColorBand {
        &ANOMALY_BANDS[self.band_index(value)]
    }

    /// Colour of `value` at the given interpolation confidence (0..=1).
    pub fn color_for(&self, value: f64, confidence: f64) -> Rgba {
        let index = self.band_index(value);
        let band = &ANOMALY_BANDS[index];
        let [r, g, b] = band.rgb;
        let alpha = if index == NEUTRAL_BAND {
            NEUTRAL_ALPHA
        } else {
            let confidence = confidence.clamp(0.0, 1.0) as f32;
            (BASE_ALPHA + confidence * CONFIDENCE_ALPHA + band.alpha_bump).min(1.0)
        };
        Rgba::new(r, g, b, alpha)
    }

    /// Whether `value` is worth painting at all.
    pub fn is_visible(&self, value: f64) -> bool {
        value.is_finite() && value.abs() >= self.visibility_threshold
    }
}

/// Surface-level presentation of a layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStyle {
    pub visible: bool,
    pub opacity: f32,
    /// Gaussian blur applied to the whole surface, in pixels. 0 disables it.
    pub blur_sigma: f32,
}

impl LayerStyle {
    pub const fn new(visible: bool, opacity: f32, blur_sigma: f32) -> Self {
        Self {
            visible,
            opacity,
            blur_sigma,
        }
    }

    pub const fn opaque() -> Self {
        Self::new(true, 1.0, 0.0)
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self::opaque()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "expected {a} ~= {b}");
    }

    #[test]
    fn zero_is_neutral_and_near_transparent() {
        let p = AnomalyPalette::default();
        assert_eq!(p.band_index(0.0), NEUTRAL_BAND);
        let c = p.color_for(0.0, 1.0);
        assert_eq!([c.r, c.g, c.b], [247, 247, 247]);
        assert!(c.a < 0.1);
        assert!(!p.is_visible(0.0));
    }

    #[test]
    fn extremes_hit_outer_bands() {
        let p = AnomalyPalette::default();
        let last = ANOMALY_BANDS.len() - 1;
        for v in [4.0, 5.2, 6.5, 40.0] {
            assert_eq!(p.band_index(v), last, "value {v}");
        }
        for v in [-3.0, -3.7, -4.0, -12.0] {
            assert_eq!(p.band_index(v), 0, "value {v}");
        }
        assert_eq!(p.color_for(4.0, 1.0).to_rgba8()[..3], [103, 0, 13]);
        assert_eq!(p.color_for(-3.0, 1.0).to_rgba8()[..3], [5, 48, 97]);
    }

    #[test]
    fn band_edges_are_inclusive_upper_bounds() {
        let p = AnomalyPalette::default();
        assert_eq!(p.band_index(-2.5), 1);
        assert_eq!(p.band_index(-2.49), 2);
        assert_eq!(p.band_index(0.5), NEUTRAL_BAND);
        assert_eq!(p.band_index(0.51), NEUTRAL_BAND + 1);
        assert_eq!(p.band_index(3.0), 11);
        assert_eq!(p.band_index(3.01), 12);
    }

    #[test]
    fn alpha_grows_with_confidence_and_distance() {
        let p = AnomalyPalette::default();
        assert_close(p.color_for(0.8, 0.0).a, 0.47);
        assert_close(p.color_for(0.8, 1.0).a, 0.67);
        assert_close(p.color_for(5.0, 1.0).a, 0.87);
        assert_close(p.color_for(-5.0, 0.3).a, 0.45 + 0.06 + 0.22);
        assert!(p.color_for(2.2, 1.0).a > p.color_for(1.2, 1.0).a);
    }

    #[test]
    fn visibility_threshold() {
        let p = AnomalyPalette::new(0.1);
        assert!(!p.is_visible(0.05));
        assert!(!p.is_visible(-0.09));
        assert!(p.is_visible(0.1));
        assert!(p.is_visible(-0.4));
        assert!(!p.is_visible(f64::NAN));
    }

    #[test]
    fn rgba8_scales_alpha() {
        assert_eq!(Rgba::new(1, 2, 3, 1.0).to_rgba8(), [1, 2, 3, 255]);
        assert_eq!(Rgba::new(1, 2, 3, 0.5).to_rgba8(), [1, 2, 3, 128]);
        assert_eq!(Rgba::TRANSPARENT.to_rgba8(), [0, 0, 0, 0]);
    }
}
