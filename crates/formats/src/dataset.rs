//! JSON anomaly dataset document.
//!
//! Shape:
//! `{ "tempanomalies": [ { "lat": 88, "lon": -180, "data": [ { "year": 1880, "value": -0.42 } ] } ] }`
//!
//! `value` is a number, the marker string `"NA"`, or a numeric string. Both the
//! marker and strings that do not parse as a float decode to
//! `Observation::Missing`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use foundation::time::Year;
use scene::grid::{GridCell, GridDataset, GridKey, Observation, YearValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Marker used by the dataset for unavailable observations.
pub const MISSING_MARKER: &str = "NA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyDocument {
    pub tempanomalies: Vec<CellRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub lat: f64,
    pub lon: f64,
    pub data: Vec<YearRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: Year,
    #[serde(default)]
    pub value: Option<RecordValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Number(f64),
    Text(String),
}

impl RecordValue {
    pub fn to_observation(&self) -> Observation {
        match self {
            RecordValue::Number(v) if v.is_finite() => Observation::Value(*v),
            RecordValue::Number(_) => Observation::Missing,
            RecordValue::Text(s) if s == MISSING_MARKER => Observation::Missing,
            RecordValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Observation::Value(v),
                _ => {
                    warn!(value = %s, "unparsable observation treated as missing");
                    Observation::Missing
                }
            },
        }
    }
}

#[derive(Debug)]
pub enum DatasetError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    OffGrid { lat: f64, lon: f64 },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Io { path, source } => {
                write!(f, "failed to read dataset {}: {source}", path.display())
            }
            DatasetError::Json(err) => write!(f, "dataset parse error: {err}"),
            DatasetError::OffGrid { lat, lon } => {
                write!(f, "cell ({lat}, {lon}) is not on the 4° dataset grid")
            }
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io { source, .. } => Some(source),
            DatasetError::Json(err) => Some(err),
            DatasetError::OffGrid { .. } => None,
        }
    }
}

impl AnomalyDocument {
    pub fn from_json_str(payload: &str) -> Result<Self, DatasetError> {
        serde_json::from_str(payload).map_err(DatasetError::Json)
    }

    /// Converts the document into the immutable grid model.
    pub fn into_dataset(self) -> Result<GridDataset, DatasetError> {
        let mut cells = Vec::with_capacity(self.tempanomalies.len());
        for record in self.tempanomalies {
            let key = grid_key(record.lat, record.lon)?;
            let series = record
                .data
                .iter()
                .map(|yr| {
                    let observation = yr
                        .value
                        .as_ref()
                        .map_or(Observation::Missing, RecordValue::to_observation);
                    YearValue::new(yr.year, observation)
                })
                .collect();
            cells.push(GridCell::new(key.lat, key.lon, series));
        }
        let dataset = GridDataset::new(cells);
        debug!(cells = dataset.len(), "anomaly dataset decoded");
        Ok(dataset)
    }
}

fn grid_key(lat: f64, lon: f64) -> Result<GridKey, DatasetError> {
    if lat.fract() != 0.0 || lon.fract() != 0.0 {
        return Err(DatasetError::OffGrid { lat, lon });
    }
    let key = GridKey::new(lat as i32, lon as i32);
    if !key.is_on_grid() {
        return Err(DatasetError::OffGrid { lat, lon });
    }
    Ok(key)
}

pub fn parse_dataset_str(payload: &str) -> Result<GridDataset, DatasetError> {
    AnomalyDocument::from_json_str(payload)?.into_dataset()
}

pub fn load_dataset(path: impl AsRef<Path>) -> Result<GridDataset, DatasetError> {
    let path = path.as_ref();
    let payload = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dataset_str(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "tempanomalies": [
            { "lat": 40, "lon": -72, "data": [
                { "year": 1880, "value": -0.5 },
                { "year": 1881, "value": "NA" },
                { "year": 1882, "value": "1.25" },
                { "year": 1883, "value": "n/a" },
                { "year": 1884 }
            ] },
            { "lat": -88.0, "lon": 176.0, "data": [] }
        ]
    }"#;

    #[test]
    fn decodes_numbers_markers_and_numeric_strings() {
        let ds = parse_dataset_str(SAMPLE).expect("dataset");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.value_at(40, -72, 1880), Some(-0.5));
        assert_eq!(ds.value_at(40, -72, 1881), None);
        assert_eq!(ds.value_at(40, -72, 1882), Some(1.25));
        assert_eq!(ds.value_at(40, -72, 1883), None);
        assert_eq!(ds.value_at(40, -72, 1884), None);
        assert!(ds.cell_at(-88, 176).is_some());

        let cell = ds.cell_at(40, -72).unwrap();
        assert_eq!(cell.observation(1881), Some(Observation::Missing));
    }

    #[test]
    fn rejects_off_grid_cells() {
        let err = parse_dataset_str(r#"{ "tempanomalies": [ { "lat": 41, "lon": 0, "data": [] } ] }"#)
            .unwrap_err();
        assert!(matches!(err, DatasetError::OffGrid { .. }));

        let err = parse_dataset_str(r#"{ "tempanomalies": [ { "lat": 40.5, "lon": 0, "data": [] } ] }"#)
            .unwrap_err();
        assert!(err.to_string().contains("40.5"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_dataset_str("{ \"cells\": [] }").unwrap_err();
        assert!(matches!(err, DatasetError::Json(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_dataset("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
