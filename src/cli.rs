//! Command-line interface parsing for the BCCh CLI
//!
//! This module defines the clap subcommands and turns their raw arguments into
//! validated requests before any network access happens.

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::data::{get_set_by_name, Frequency};

/// Date format accepted by `--firstdate` and `--lastdate`
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Set name used when exporting an ad-hoc list of series
pub const CUSTOM_SET_NAME: &str = "CUSTOM";

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The frequency is not one the API accepts
    #[error("Invalid frequency: '{0}'. Valid frequencies: DAILY, MONTHLY, QUARTERLY, ANNUAL")]
    InvalidFrequency(String),

    /// A date flag is not `YYYY-MM-DD`
    #[error("Invalid {flag} '{value}': must be YYYY-MM-DD")]
    InvalidDate { flag: &'static str, value: String },

    /// No predefined set has this name
    #[error("Unknown set: '{0}'. Use 'bcch sets' to list available sets")]
    UnknownSet(String),

    /// Neither a set nor any series was given
    #[error("Nothing to fetch: pass --set or --series")]
    EmptyBatch,
}

/// BCCh CLI - Retrieve Banco Central de Chile time series
#[derive(Parser, Debug)]
#[command(name = "bcch")]
#[command(about = "CLI tool for retrieving time series from the Banco Central de Chile (BCCh) API")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Retrieve data for a single series ID
    ///
    /// Example:
    ///   bcch get --series F073.UFF.PRE.Z.D --firstdate 2020-01-01 --lastdate 2021-01-01
    Get {
        /// Series ID
        #[arg(short, long)]
        series: String,
        /// First date in YYYY-MM-DD format
        #[arg(long)]
        firstdate: Option<String>,
        /// Last date in YYYY-MM-DD format
        #[arg(long)]
        lastdate: Option<String>,
    },

    /// Search the catalogue of available series
    Search {
        /// Frequency of the data: DAILY, MONTHLY, QUARTERLY, or ANNUAL
        #[arg(short, long)]
        frequency: String,
        /// Keyword used to filter series by Spanish title
        #[arg(short, long)]
        keyword: Option<String>,
    },

    /// List predefined series sets
    Sets,

    /// Fetch many series concurrently
    Fetch {
        /// Predefined set to fetch (see 'bcch sets')
        #[arg(long, conflicts_with = "series")]
        set: Option<String>,
        /// Comma-separated series IDs
        #[arg(long, value_delimiter = ',')]
        series: Vec<String>,
        /// First date in YYYY-MM-DD format
        #[arg(long)]
        firstdate: Option<String>,
        /// Last date in YYYY-MM-DD format
        #[arg(long)]
        lastdate: Option<String>,
        /// Maximum requests in flight; non-positive values use the default of 3
        #[arg(short, long, allow_negative_numbers = true)]
        concurrency: Option<i64>,
        /// Cancel requests still running after this many seconds
        #[arg(long, value_name = "SECONDS")]
        deadline_secs: Option<u64>,
        /// Write the fetched set as JSON to this relative path
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Save the credentials used for every API request
    SetCredentials {
        /// BCCh user (usually an email address)
        #[arg(short, long)]
        user: String,
        /// BCCh password
        #[arg(short, long)]
        password: String,
    },
}

/// A validated batch of series to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Name the batch is exported under
    pub name: String,
    /// Description exported with the batch
    pub description: String,
    /// Series IDs to fetch
    pub series_ids: Vec<String>,
}

impl BatchRequest {
    /// Resolves `--set` or `--series` into a batch
    ///
    /// # Returns
    /// * `Ok(BatchRequest)` for a known set or a non-empty series list
    /// * `Err(CliError)` if the set is unknown or nothing was requested
    pub fn from_args(set: Option<&str>, series: &[String]) -> Result<Self, CliError> {
        if let Some(name) = set {
            let set = get_set_by_name(name).ok_or_else(|| CliError::UnknownSet(name.to_string()))?;
            return Ok(Self {
                name: set.name.to_string(),
                description: set.description.to_string(),
                series_ids: set.keys(),
            });
        }

        let mut seen = HashSet::new();
        let series_ids: Vec<String> = series
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .map(str::to_string)
            .collect();
        if series_ids.is_empty() {
            return Err(CliError::EmptyBatch);
        }

        Ok(Self {
            name: CUSTOM_SET_NAME.to_string(),
            description: "user-selected series".to_string(),
            series_ids,
        })
    }
}

/// Parses a frequency argument into a `Frequency`
pub fn parse_frequency_arg(s: &str) -> Result<Frequency, CliError> {
    Frequency::parse(s).ok_or_else(|| CliError::InvalidFrequency(s.to_string()))
}

/// Checks that an optional date flag is `YYYY-MM-DD`
pub fn validate_date_arg(flag: &'static str, value: Option<&str>) -> Result<(), CliError> {
    match value {
        Some(value) if NaiveDate::parse_from_str(value, DATE_FORMAT).is_err() => {
            Err(CliError::InvalidDate {
                flag,
                value: value.to_string(),
            })
        }
        _ => Ok(()),
    }
}
