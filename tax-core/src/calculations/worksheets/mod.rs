//! Tax worksheet implementations.
//!
//! Each worksheet takes its rates from a validated configuration and turns
//! one set of user inputs into a line-by-line result.

pub mod salary_tax;

pub use salary_tax::{
    MAX_AMOUNT, Rebate, SalaryTaxConfig, SalaryTaxConfigError, SalaryTaxInput, SalaryTaxResult,
    SalaryTaxWorksheet, compute,
};
