//! TOML configuration for `pktax`.
//!
//! Every section is optional; a missing file or section falls back to the
//! FY 2025-26 defaults.
//!
//! ```toml
//! [salary_tax]
//! block_tax_rate = "0.025"
//!
//! [slabs]
//! file = "slabs.csv"
//! fiscal_year = "2025-26"
//!
//! [analyst]
//! low_margin_percent = "5"
//!
//! [terminal]
//! name = "Ayesha"
//! skills = ["Payroll", "Audit"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tax_core::calculations::{RatioThresholds, SalaryTaxConfig, SalaryTaxConfigError};
use tax_data::{SlabScheduleLoader, SlabScheduleLoaderError};
use thiserror::Error;
use tracing::{debug, info};

use crate::terminal::TerminalProfile;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot load slabs: {0}")]
    Slabs(#[from] SlabScheduleLoaderError),

    #[error("invalid salary tax settings: {0}")]
    SalaryTax(#[from] SalaryTaxConfigError),
}

/// Where to read a slab schedule from, instead of the built-in table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabSource {
    /// CSV file; relative paths are resolved against the config file.
    pub file: PathBuf,
    pub fiscal_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub salary_tax: SalaryTaxConfig,
    pub slabs: Option<SlabSource>,
    pub analyst: RatioThresholds,
    pub terminal: TerminalProfile,
}

impl AppConfig {
    /// Parses a TOML document. Relative slab paths resolve against `base_dir`.
    pub fn from_toml_str(
        text: &str,
        base_dir: &Path,
        origin: &Path,
    ) -> Result<Self, ConfigLoadError> {
        let mut config: AppConfig =
            toml::from_str(text).map_err(|source| ConfigLoadError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        config.resolve_slabs(base_dir)?;
        config.salary_tax.validate()?;
        Ok(config)
    }

    /// Loads `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let Some(path) = path else {
            debug!("no config file given, using defaults");
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::from_toml_str(&text, base_dir, path)?;

        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    fn resolve_slabs(
        &mut self,
        base_dir: &Path,
    ) -> Result<(), ConfigLoadError> {
        let Some(source) = &self.slabs else {
            return Ok(());
        };

        let file = if source.file.is_relative() {
            base_dir.join(&source.file)
        } else {
            source.file.clone()
        };
        self.salary_tax.slabs = SlabScheduleLoader::load_from_file(&file, &source.fiscal_year)?;
        Ok(())
    }
}
