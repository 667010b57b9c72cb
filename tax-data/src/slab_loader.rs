use std::io::Read;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{SlabSchedule, SlabScheduleError, TaxSlab};
use thiserror::Error;
use tracing::{debug, info};

use crate::cells;

/// Errors that can occur when loading slab schedules.
#[derive(Debug, Error)]
pub enum SlabScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("fiscal year '{0}' not found in slab file")]
    FiscalYearNotFound(String),

    #[error("invalid slab schedule: {0}")]
    Schedule(#[from] SlabScheduleError),

    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<csv::Error> for SlabScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        SlabScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from a slab CSV file.
///
/// - `fiscal_year`: label of the year, e.g. `2025-26`
/// - `min_income`: exclusive lower bound of the slab
/// - `max_income`: inclusive upper bound (empty for the top slab)
/// - `base_tax`: tax owed on income up to `min_income`
/// - `rate`: marginal rate as a fraction (e.g. `0.15` for 15%)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SlabRecord {
    pub fiscal_year: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "cells::optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

impl From<&SlabRecord> for TaxSlab {
    fn from(record: &SlabRecord) -> Self {
        TaxSlab {
            min_income: record.min_income,
            max_income: record.max_income,
            base_tax: record.base_tax,
            rate: record.rate,
        }
    }
}

/// Loader for slab schedules kept in CSV files.
///
/// A single file may hold several fiscal years; [`SlabScheduleLoader::schedule_for`]
/// picks one out and validates it.
pub struct SlabScheduleLoader;

impl SlabScheduleLoader {
    /// Parse slab records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<SlabRecord>, SlabScheduleLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: SlabRecord = result?;
            records.push(record);
        }

        debug!(count = records.len(), "slab records parsed");
        Ok(records)
    }

    /// Builds the schedule for `fiscal_year` from parsed records.
    ///
    /// Records of that year are ordered by `min_income` before validation, so
    /// the file does not need to list them in order.
    ///
    /// # Errors
    ///
    /// * [`SlabScheduleLoaderError::FiscalYearNotFound`] if no record matches.
    /// * [`SlabScheduleLoaderError::Schedule`] if the slabs do not form a
    ///   contiguous schedule.
    pub fn schedule_for(
        records: &[SlabRecord],
        fiscal_year: &str,
    ) -> Result<SlabSchedule, SlabScheduleLoaderError> {
        let mut slabs: Vec<TaxSlab> = records
            .iter()
            .filter(|r| r.fiscal_year == fiscal_year)
            .map(TaxSlab::from)
            .collect();

        if slabs.is_empty() {
            return Err(SlabScheduleLoaderError::FiscalYearNotFound(
                fiscal_year.to_string(),
            ));
        }

        slabs.sort_by(|a, b| a.min_income.cmp(&b.min_income));
        let schedule = SlabSchedule::new(slabs)?;

        info!(fiscal_year, slabs = schedule.slabs().len(), "slab schedule loaded");
        Ok(schedule)
    }

    /// Reads `path` and builds the schedule for `fiscal_year`.
    pub fn load_from_file(
        path: &Path,
        fiscal_year: &str,
    ) -> Result<SlabSchedule, SlabScheduleLoaderError> {
        let file = std::fs::File::open(path).map_err(|source| SlabScheduleLoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records = Self::parse(file)?;
        Self::schedule_for(&records, fiscal_year)
    }
}
