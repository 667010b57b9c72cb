//! Calculation modules.
//!
//! The salary tax worksheet is the core; the investment simulator and the
//! ratio analyst are smaller stand-alone calculators built on the same
//! decimal helpers.

pub mod analyst;
pub mod common;
pub mod simulator;
pub mod worksheets;

pub use analyst::{
    ANALYSIS_STAGES, AnalystError, Liquidity, Profitability, RatioAnalysis, RatioAnalyst,
    RatioInput, RatioThresholds, RiskLevel,
};
pub use simulator::{InvestmentSimulator, SimulationInput, SimulationResult, SimulatorError};
pub use worksheets::{
    MAX_AMOUNT, Rebate, SalaryTaxConfig, SalaryTaxConfigError, SalaryTaxInput, SalaryTaxResult,
    SalaryTaxWorksheet, compute,
};
