//! Rendering and export of fetched data
//!
//! Formats series and catalogue entries for the terminal and writes fetched
//! sets to JSON files.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;

use crate::data::{SeriesData, SeriesInfo};

/// Errors that can occur when exporting data
#[derive(Debug, Error)]
pub enum OutputError {
    /// The output path is absolute or escapes the working directory
    #[error("invalid output path '{0}': absolute paths and '..' are not allowed")]
    InvalidPath(String),

    /// Writing the file failed
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the payload failed
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A fetched set as written to disk
#[derive(Debug, Serialize)]
pub struct SetExport<'a> {
    pub description: &'a str,
    #[serde(rename = "seriesData")]
    pub series_data: BTreeMap<&'a str, &'a SeriesData>,
}

impl<'a> SetExport<'a> {
    /// Builds an export with series sorted by ID
    pub fn new(description: &'a str, series: &'a HashMap<String, SeriesData>) -> Self {
        Self {
            description,
            series_data: series.iter().map(|(id, data)| (id.as_str(), data)).collect(),
        }
    }
}

/// Rejects absolute paths and any path containing `..`
pub fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    let escapes = path
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if path.as_os_str().is_empty() || escapes {
        return Err(OutputError::InvalidPath(path.display().to_string()));
    }
    Ok(())
}

/// Writes `payload` as pretty JSON to a relative `path`
pub fn save_json<T: Serialize>(payload: &T, path: &Path) -> Result<(), OutputError> {
    validate_output_path(path)?;
    write_json(payload, path)
}

fn write_json<T: Serialize>(payload: &T, path: &Path) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(payload)?;
    fs::write(path, json)?;
    Ok(())
}

/// Formats a series as a description line followed by `date - value` lines
pub fn render_series(data: &SeriesData) -> String {
    if !data.is_ok() {
        return data.descripcion.clone();
    }

    let mut lines = vec![data.series.descrip_esp.clone().unwrap_or_default(), String::new()];
    lines.extend(
        data.observations()
            .iter()
            .map(|obs| format!("{} - {}", obs.index_date_string, obs.value)),
    );
    lines.join("\n")
}

/// Formats catalogue entries whose Spanish title contains `keyword`
pub fn render_catalogue(infos: &[SeriesInfo], keyword: Option<&str>) -> String {
    infos
        .iter()
        .filter(|info| keyword.map_or(true, |keyword| info.spanish_title.contains(keyword)))
        .map(|info| format!("- {}: {}", info.series_id, info.spanish_title))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary of a fetched series for batch output
pub fn summarize_series(series_id: &str, data: &SeriesData) -> String {
    if !data.is_ok() {
        return format!("{}: {}", series_id, data.descripcion);
    }

    let observations = data.observations();
    match observations.last() {
        Some(last) => format!(
            "{}: {} observations, latest {} = {}",
            series_id,
            observations.len(),
            last.index_date_string,
            last.value
        ),
        None => format!("{}: no observations", series_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Observation, Series};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_series() -> SeriesData {
        SeriesData {
            codigo: 0,
            descripcion: "Success".to_string(),
            series: Series {
                descrip_esp: Some("Dólar observado".to_string()),
                descrip_ing: None,
                series_id: Some("F073.TCO.PRE.Z.D".to_string()),
                obs: Some(vec![
                    Observation {
                        index_date_string: "02-01-2024".to_string(),
                        value: "877.12".to_string(),
                        status_code: "OK".to_string(),
                    },
                    Observation {
                        index_date_string: "03-01-2024".to_string(),
                        value: "884.56".to_string(),
                        status_code: "OK".to_string(),
                    },
                ]),
            },
        }
    }

    #[test]
    fn test_render_series_lists_observations() {
        let rendered = render_series(&sample_series());

        assert_eq!(
            rendered,
            "Dólar observado\n\n02-01-2024 - 877.12\n03-01-2024 - 884.56"
        );
    }

    #[test]
    fn test_render_series_shows_service_error() {
        let data = SeriesData {
            codigo: -50,
            descripcion: "Invalid username or password".to_string(),
            ..Default::default()
        };

        assert_eq!(render_series(&data), "Invalid username or password");
    }

    #[test]
    fn test_render_catalogue_filters_by_keyword() {
        let infos = vec![
            SeriesInfo {
                series_id: "A".to_string(),
                spanish_title: "Tasa de desocupación".to_string(),
                ..Default::default()
            },
            SeriesInfo {
                series_id: "B".to_string(),
                spanish_title: "IPC General".to_string(),
                ..Default::default()
            },
        ];

        assert_eq!(
            render_catalogue(&infos, None),
            "- A: Tasa de desocupación\n- B: IPC General"
        );
        assert_eq!(render_catalogue(&infos, Some("IPC")), "- B: IPC General");
        assert_eq!(render_catalogue(&infos, Some("nothing")), "");
    }

    #[test]
    fn test_summarize_series_reports_latest_observation() {
        let summary = summarize_series("F073.TCO.PRE.Z.D", &sample_series());

        assert_eq!(
            summary,
            "F073.TCO.PRE.Z.D: 2 observations, latest 03-01-2024 = 884.56"
        );
    }

    #[test]
    fn test_validate_output_path() {
        assert!(validate_output_path(Path::new("out.json")).is_ok());
        assert!(validate_output_path(Path::new("./data/out.json")).is_ok());
        assert!(validate_output_path(Path::new("../out.json")).is_err());
        assert!(validate_output_path(Path::new("data/../../out.json")).is_err());
        assert!(validate_output_path(Path::new("/tmp/out.json")).is_err());
        assert!(validate_output_path(Path::new("")).is_err());
    }

    #[test]
    fn test_set_export_serializes_expected_shape() {
        let mut fetched = HashMap::new();
        fetched.insert("F073.TCO.PRE.Z.D".to_string(), sample_series());
        let export = SetExport::new("exchange rates", &fetched);

        let mut payload = BTreeMap::new();
        payload.insert("EXCHANGE", export);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["EXCHANGE"]["description"], "exchange rates");
        assert_eq!(
            json["EXCHANGE"]["seriesData"]["F073.TCO.PRE.Z.D"]["Series"]["seriesId"],
            "F073.TCO.PRE.Z.D"
        );
    }

    #[test]
    fn test_save_json_rejects_escaping_path() {
        let result = save_json(&"payload", &PathBuf::from("../escape.json"));

        assert!(matches!(result, Err(OutputError::InvalidPath(_))));
    }

    #[test]
    fn test_write_json_writes_pretty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("numbers.json");

        write_json(&vec![1, 2, 3], &path).expect("Write should succeed");

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[\n  1,\n  2,\n  3\n]");
    }
}
