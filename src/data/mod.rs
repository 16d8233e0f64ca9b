//! Core data models for the BCCh CLI
//!
//! This module contains the payload types returned by the Banco Central de
//! Chile statistics API, the client that fetches them, and the static list of
//! predefined series sets.

pub mod client;
pub mod sets;

pub use client::{ApiError, BcchClient, BCCH_BASE_URL};
pub use sets::{all_sets, get_set_by_name, SeriesSet};

use serde::{Deserialize, Serialize};

/// Response of the `GetSeries` function for a single series
///
/// A `codigo` other than zero means the service rejected the request (bad
/// credentials, unknown series) even though the HTTP status was successful.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    /// Service status code, 0 on success
    #[serde(rename = "Codigo", default)]
    pub codigo: i64,
    /// Service status message
    #[serde(rename = "Descripcion", default)]
    pub descripcion: String,
    /// Series metadata and observations
    #[serde(rename = "Series", default)]
    pub series: Series,
}

impl SeriesData {
    /// Whether the service reported success
    pub fn is_ok(&self) -> bool {
        self.codigo == 0
    }

    /// Observations of the series, empty when the service returned none
    pub fn observations(&self) -> &[Observation] {
        self.series.obs.as_deref().unwrap_or_default()
    }
}

/// Series metadata and observations; every field may be null upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Spanish description
    #[serde(rename = "descripEsp", default)]
    pub descrip_esp: Option<String>,
    /// English description
    #[serde(rename = "descripIng", default)]
    pub descrip_ing: Option<String>,
    /// Series identifier
    #[serde(rename = "seriesId", default)]
    pub series_id: Option<String>,
    /// Observations, oldest first
    #[serde(rename = "Obs", default)]
    pub obs: Option<Vec<Observation>>,
}

/// A single dated observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date as `DD-MM-YYYY`
    #[serde(rename = "indexDateString", default)]
    pub index_date_string: String,
    /// Value as a decimal string, `NaN` when missing
    #[serde(default)]
    pub value: String,
    /// Per-observation status, `OK` or `ND`
    #[serde(rename = "statusCode", default)]
    pub status_code: String,
}

/// Response of the `SearchSeries` function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableSeries {
    /// Service status code, 0 on success
    #[serde(rename = "Codigo", default)]
    pub codigo: i64,
    /// Service status message
    #[serde(rename = "Descripcion", default)]
    pub descripcion: String,
    /// Catalogue entries for the requested frequency
    #[serde(rename = "SeriesInfos", default)]
    pub series_infos: Option<Vec<SeriesInfo>>,
}

impl AvailableSeries {
    /// Catalogue entries, empty when the service returned none
    pub fn infos(&self) -> &[SeriesInfo] {
        self.series_infos.as_deref().unwrap_or_default()
    }
}

/// Catalogue entry describing one available series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesInfo {
    pub series_id: String,
    pub frequency_code: String,
    pub spanish_title: String,
    pub english_title: String,
    pub first_observation: String,
    pub last_observation: String,
    pub updated_at: String,
    pub created_at: String,
}

/// Observation frequencies accepted by `SearchSeries`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    /// All frequencies in the order the CLI lists them
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Annual,
    ];

    /// Upstream query value
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Quarterly => "QUARTERLY",
            Frequency::Annual => "ANNUAL",
        }
    }

    /// Parses an upstream frequency name, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|frequency| frequency.as_str().eq_ignore_ascii_case(s.trim()))
    }
}
