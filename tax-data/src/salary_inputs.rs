//! CSV loader for batches of salary tax inputs.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter and every
//! column is optional. Empty cells default to zero (amounts and counts) or
//! `false` (flags). Amounts may use commas as thousands separators.
//!
//! | Column                             | Type    | Notes                          |
//! |------------------------------------|---------|--------------------------------|
//! | `name`                             | string  | Label for reports              |
//! | `basic_salary_annual`              | decimal |                                |
//! | `bonus_annual`                     | decimal |                                |
//! | `other_allowance_annual`           | decimal |                                |
//! | `medical_allowance_annual`         | decimal |                                |
//! | `medical_facility_provided`        | flag    | `yes`/`no`, `true`/`false`, `1`/`0` |
//! | `company_car_cost`                 | decimal |                                |
//! | `company_car_usage`                | string  | `partial` (default) or `full`  |
//! | `share_fair_market_value`          | decimal |                                |
//! | `share_cost_to_employee`           | decimal |                                |
//! | `housing_provided`                 | flag    |                                |
//! | `employer_loan_principal`          | decimal |                                |
//! | `employer_loan_rate_percent`       | decimal | e.g. `4` for 4%                |
//! | `flying_allowance_or_block_income` | decimal |                                |
//! | `zakat_paid`                       | decimal |                                |
//! | `edu_fees_annual`                  | decimal |                                |
//! | `edu_child_count`                  | integer |                                |
//! | `donations_amount`                 | decimal |                                |
//! | `pension_fund_contribution`        | decimal |                                |
//! | `housing_loan_interest_paid`       | decimal |                                |
//! | `is_teacher_or_researcher`         | flag    |                                |
//! | `is_senior_citizen`                | flag    |                                |
//!
//! ### Example
//!
//! ```csv
//! name,basic_salary_annual,medical_allowance_annual,housing_provided,zakat_paid
//! Officer,"1,200,000",120000,no,
//! Manager,2400000,300000,yes,90000
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::CarUsage;
use tax_core::calculations::SalaryTaxInput;
use thiserror::Error;
use tracing::debug;

use crate::cells;

/// Errors that can occur while loading salary inputs.
#[derive(Debug, Error)]
pub enum SalaryInputLoaderError {
    /// Bad structure, type mismatch or unparseable cell.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `company_car_usage` was not a recognised code. `row` is 1-based,
    /// not counting the header.
    #[error("unrecognised car usage '{value}' on row {row}")]
    InvalidCarUsage { value: String, row: usize },

    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One labelled set of inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryRecord {
    pub name: String,
    pub input: SalaryTaxInput,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "cells::amount")]
    basic_salary_annual: Decimal,
    #[serde(default, deserialize_with = "cells::amount")]
    bonus_annual: Decimal,
    #[serde(default, deserialize_with = "cells::amount")]
    other_allowance_annual: Decimal,
    #[serde(default, deserialize_with = "cells::amount")]
    medical_allowance_annual: Decimal,
    #[serde(default, deserialize_with = "cells::flag")]
    medical_facility_provided: bool,
    #[serde(default, deserialize_with = "cells::amount")]
    company_car_cost: Decimal,
    #[serde(default)]
    company_car_usage: Option<String>,
    #[serde(default, deserialize_with = "cells::amount")]
    share_fair_market_value: Decimal,
    #[serde(default, deserialize_with = "cells::amount")]
    share_cost_to_employee: Decimal,
    #[serde(default, deserialize_with = "cells::flag")]
    housing_provided: bool,
    #[serde(default, deserialize_with = "cells::amount")]
    employer_loan_principal: Decimal,
    #[serde(default, deserialize_with = "cells::amount")]
    employer_loan_rate_percent: Decimal,
    #[serde(default, deserialize_with = "cells::amount")]
    flying_allowance_or_block_income: Decimal,
    #[serde(default, deserialize_with = "cells::amount")]
    zakat_paid: Decimal,
    #[serde(default, deserialize_with = "cells::amount")]
    edu_fees_annual: Decimal,
    #[serde(default, deserialize_with = "cells::count")]
    edu_child_count: u32,
    #[serde(default, deserialize_with = "cells::amount")]
    donations_amount: Decimal,
    #[serde(default, deserialize_with = "cells::amount")]
    pension_fund_contribution: Decimal,
    #[serde(default, deserialize_with = "cells::amount")]
    housing_loan_interest_paid: Decimal,
    #[serde(default, deserialize_with = "cells::flag")]
    is_teacher_or_researcher: bool,
    #[serde(default, deserialize_with = "cells::flag")]
    is_senior_citizen: bool,
}

impl CsvRow {
    fn into_record(
        self,
        row_number: usize,
    ) -> Result<SalaryRecord, SalaryInputLoaderError> {
        let company_car_usage = match self.company_car_usage.as_deref().map(str::trim) {
            None | Some("") => CarUsage::default(),
            Some(code) => {
                CarUsage::parse(code).ok_or_else(|| SalaryInputLoaderError::InvalidCarUsage {
                    value: code.to_string(),
                    row: row_number,
                })?
            }
        };

        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("row {row_number}"));

        Ok(SalaryRecord {
            name,
            input: SalaryTaxInput {
                basic_salary_annual: self.basic_salary_annual,
                bonus_annual: self.bonus_annual,
                other_allowance_annual: self.other_allowance_annual,
                medical_allowance_annual: self.medical_allowance_annual,
                medical_facility_provided: self.medical_facility_provided,
                company_car_cost: self.company_car_cost,
                company_car_usage,
                share_fair_market_value: self.share_fair_market_value,
                share_cost_to_employee: self.share_cost_to_employee,
                housing_provided: self.housing_provided,
                employer_loan_principal: self.employer_loan_principal,
                employer_loan_rate_percent: self.employer_loan_rate_percent,
                flying_allowance_or_block_income: self.flying_allowance_or_block_income,
                zakat_paid: self.zakat_paid,
                edu_fees_annual: self.edu_fees_annual,
                edu_child_count: self.edu_child_count,
                donations_amount: self.donations_amount,
                pension_fund_contribution: self.pension_fund_contribution,
                housing_loan_interest_paid: self.housing_loan_interest_paid,
                is_teacher_or_researcher: self.is_teacher_or_researcher,
                is_senior_citizen: self.is_senior_citizen,
            },
        })
    }
}

/// Loader for salary input batches.
pub struct SalaryInputLoader;

impl SalaryInputLoader {
    /// Parses records from any CSV reader. Rows are returned in file order.
    ///
    /// # Errors
    ///
    /// * [`SalaryInputLoaderError::Parse`] if the CSV is structurally invalid
    ///   or a cell cannot be read.
    /// * [`SalaryInputLoaderError::InvalidCarUsage`] for an unknown car usage.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<SalaryRecord>, SalaryInputLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(reader);

        let records = csv_reader
            .deserialize::<CsvRow>()
            .enumerate()
            .map(|(idx, result)| result?.into_record(idx + 1))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = records.len(), "salary inputs parsed");
        Ok(records)
    }

    /// Parses records from CSV text.
    pub fn load_from_str(input: &str) -> Result<Vec<SalaryRecord>, SalaryInputLoaderError> {
        Self::parse(input.as_bytes())
    }

    /// Reads a CSV file from disk and parses it.
    ///
    /// # Errors
    ///
    /// Returns [`SalaryInputLoaderError::Io`] when the file cannot be opened,
    /// otherwise the same errors as [`SalaryInputLoader::parse`].
    pub fn load_from_file(path: &Path) -> Result<Vec<SalaryRecord>, SalaryInputLoaderError> {
        let file = std::fs::File::open(path).map_err(|source| SalaryInputLoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(file)
    }
}
