//! Engine configuration.
//!
//! Settings load from a JSON document and can then be overridden through
//! `GEOFLOW_*` environment variables. Every field has a default, so an empty
//! object is a valid configuration.

use crate::jobs::{
    DEFAULT_NOTIFICATION_DELAY, DEFAULT_REPORT_SUMMARY_TEMPLATE, RegionCatalog,
    geometry::GeometryError,
};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding [`EngineConfig::job_timeout_ms`].
pub const ENV_JOB_TIMEOUT_MS: &str = "GEOFLOW_JOB_TIMEOUT_MS";
/// Environment variable overriding [`EngineConfig::notification_delay_ms`].
pub const ENV_NOTIFICATION_DELAY_MS: &str = "GEOFLOW_NOTIFICATION_DELAY_MS";
/// Environment variable overriding [`EngineConfig::poll_interval_ms`].
pub const ENV_POLL_INTERVAL_MS: &str = "GEOFLOW_POLL_INTERVAL_MS";
/// Environment variable overriding [`EngineConfig::region_catalog_path`].
pub const ENV_REGION_CATALOG_PATH: &str = "GEOFLOW_REGION_CATALOG_PATH";

const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Errors returned while loading configuration or the files it names.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed to load.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The configuration document is not valid.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// An override variable holds an unusable value.
    #[error("invalid value {value:?} for {name}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// The region catalog is not a usable GeoJSON feature collection.
    #[error("invalid region catalog {path}: {source}")]
    RegionCatalog {
        /// Catalog path.
        path: Utf8PathBuf,
        /// Decoding failure.
        source: GeometryError,
    },
}

/// Tunables for the runner, worker, and jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Upper bound on a single job execution; unbounded when absent.
    pub job_timeout_ms: Option<u64>,
    /// Simulated notification latency.
    pub notification_delay_ms: u64,
    /// Idle delay between worker polls.
    pub poll_interval_ms: u64,
    /// `minijinja` template for the report summary line.
    pub report_summary_template: String,
    /// GeoJSON feature collection used by the region lookup job.
    ///
    /// No catalog ships with the crate. While this is unset the catalog is
    /// empty and every `analysis` task completes with
    /// [`NO_REGION_MATCH`](crate::jobs::NO_REGION_MATCH).
    pub region_catalog_path: Option<Utf8PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            job_timeout_ms: None,
            notification_delay_ms: u64::try_from(DEFAULT_NOTIFICATION_DELAY.as_millis())
                .unwrap_or(u64::MAX),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            report_summary_template: DEFAULT_REPORT_SUMMARY_TEMPLATE.to_owned(),
            region_catalog_path: None,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown keys.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Loads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is invalid.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        Self::from_json_str(&read_file(path)?)
    }

    /// Builds the default configuration overridden from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] for unparsable overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Applies `GEOFLOW_*` overrides obtained through `lookup`.
    ///
    /// An empty `GEOFLOW_JOB_TIMEOUT_MS` or `GEOFLOW_REGION_CATALOG_PATH`
    /// clears the corresponding setting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] for values that are not
    /// non-negative integers where one is required.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_JOB_TIMEOUT_MS) {
            self.job_timeout_ms = if value.trim().is_empty() {
                None
            } else {
                Some(parse_millis(ENV_JOB_TIMEOUT_MS, &value)?)
            };
        }
        if let Some(value) = lookup(ENV_NOTIFICATION_DELAY_MS) {
            self.notification_delay_ms = parse_millis(ENV_NOTIFICATION_DELAY_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = parse_millis(ENV_POLL_INTERVAL_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_REGION_CATALOG_PATH) {
            let trimmed = value.trim();
            self.region_catalog_path = (!trimmed.is_empty()).then(|| Utf8PathBuf::from(trimmed));
        }
        Ok(())
    }

    /// Returns the job timeout, if any.
    #[must_use]
    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_ms.map(Duration::from_millis)
    }

    /// Returns the simulated notification latency.
    #[must_use]
    pub const fn notification_delay(&self) -> Duration {
        Duration::from_millis(self.notification_delay_ms)
    }

    /// Returns the idle delay between worker polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Loads the configured region catalog, or an empty one when no path is
    /// set. An empty catalog matches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::RegionCatalog`] when
    /// the configured file cannot be used.
    pub fn load_region_catalog(&self) -> Result<RegionCatalog, ConfigError> {
        let Some(path) = self.region_catalog_path.as_deref() else {
            return Ok(RegionCatalog::default());
        };
        RegionCatalog::from_geojson(&read_file(path)?).map_err(|source| {
            ConfigError::RegionCatalog {
                path: path.to_owned(),
                source,
            }
        })
    }
}

fn parse_millis(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv {
            name,
            value: value.to_owned(),
        })
}

fn read_file(path: &Utf8Path) -> Result<String, ConfigError> {
    let read_error = |source: std::io::Error| ConfigError::Read {
        path: path.to_owned(),
        source,
    };
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no file name",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read_to_string(file_name).map_err(read_error)
}
