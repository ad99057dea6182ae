use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use foundation::time::{Clamped, FIRST_YEAR, Year, YearRange, clamp_year};
use layers::raster::{AnomalyRasterConfig, MAX_RESOLUTION_FACTOR};
use layers::symbology::{AnomalyPalette, DEFAULT_VISIBILITY_THRESHOLD, LayerStyle};
use runtime::animation::{DEFAULT_BASE_INTERVAL_MS, PlaybackSpeed};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub start_year: Year,
    pub base_interval_ms: f64,
    /// Speed multiplier, one of 1, 2, 5, 10.
    pub speed: u32,
    pub resolution_factor: u32,
    pub seam_padding_px: f64,
    pub visibility_threshold: f64,
    pub overlay_blur_sigma: f32,
    pub overlay_opacity: f32,
    pub base_opacity: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            start_year: FIRST_YEAR,
            base_interval_ms: DEFAULT_BASE_INTERVAL_MS,
            speed: 1,
            resolution_factor: 4,
            seam_padding_px: 1.0,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            overlay_blur_sigma: 1.5,
            overlay_opacity: 0.85,
            base_opacity: 1.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            ConfigError::Json(err) => write!(f, "config parse error: {err}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Json(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(payload).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&payload)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !YearRange::FULL.contains(self.start_year) {
            return Err(ConfigError::Invalid(format!(
                "start_year {} outside {}..={}",
                self.start_year,
                YearRange::FULL.start,
                YearRange::FULL.end
            )));
        }
        if !(self.base_interval_ms.is_finite() && self.base_interval_ms > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "base_interval_ms must be positive, got {}",
                self.base_interval_ms
            )));
        }
        if PlaybackSpeed::from_multiplier(self.speed).is_none() {
            return Err(ConfigError::Invalid(format!(
                "speed must be one of 1, 2, 5, 10, got {}",
                self.speed
            )));
        }
        if !(1..=MAX_RESOLUTION_FACTOR).contains(&self.resolution_factor) {
            return Err(ConfigError::Invalid(format!(
                "resolution_factor must be in 1..={MAX_RESOLUTION_FACTOR}, got {}",
                self.resolution_factor
            )));
        }
        if !(self.seam_padding_px.is_finite() && self.seam_padding_px >= 0.0) {
            return Err(ConfigError::Invalid("seam_padding_px must be >= 0".to_string()));
        }
        if !(self.visibility_threshold.is_finite() && self.visibility_threshold >= 0.0) {
            return Err(ConfigError::Invalid(
                "visibility_threshold must be >= 0".to_string(),
            ));
        }
        if !(self.overlay_blur_sigma.is_finite() && self.overlay_blur_sigma >= 0.0) {
            return Err(ConfigError::Invalid("overlay_blur_sigma must be >= 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(ConfigError::Invalid(format!(
                "overlay_opacity must be in 0..=1, got {}",
                self.overlay_opacity
            )));
        }
        if !(0.0..=1.0).contains(&self.base_opacity) {
            return Err(ConfigError::Invalid(format!(
                "base_opacity must be in 0..=1, got {}",
                self.base_opacity
            )));
        }
        Ok(())
    }

    /// Sets the first displayed year, clamped to the dataset range.
    pub fn set_start_year(&mut self, year: Year) -> Clamped<Year> {
        let clamped = clamp_year(year);
        self.start_year = clamped.value;
        clamped
    }

    pub fn playback_speed(&self) -> PlaybackSpeed {
        PlaybackSpeed::from_multiplier(self.speed).unwrap_or_default()
    }

    pub fn raster(&self) -> AnomalyRasterConfig {
        AnomalyRasterConfig {
            resolution_factor: self.resolution_factor,
            seam_padding_px: self.seam_padding_px,
        }
    }

    pub fn palette(&self) -> AnomalyPalette {
        AnomalyPalette::new(self.visibility_threshold)
    }

    pub fn overlay_style(&self) -> LayerStyle {
        LayerStyle::new(true, self.overlay_opacity, self.overlay_blur_sigma)
    }

    pub fn base_style(&self) -> LayerStyle {
        LayerStyle::new(true, self.base_opacity, 0.0)
    }
}
