//! Compound-interest investment simulator.
//!
//! Projects an initial deposit plus a fixed monthly contribution, compounded
//! monthly:
//!
//! ```text
//! factor           = (1 + r/12)^(12·years)
//! fv_deposit       = P × factor
//! fv_contributions = PMT × (factor − 1) / (r/12)      (PMT × 12·years when r = 0)
//! ```
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{InvestmentSimulator, SimulationInput};
//!
//! let input = SimulationInput {
//!     initial_deposit: dec!(100000),
//!     monthly_contribution: dec!(0),
//!     annual_rate_percent: dec!(12),
//!     years: 1,
//! };
//!
//! let result = InvestmentSimulator::simulate(&input).unwrap();
//!
//! assert_eq!(result.future_value, dec!(112682.50));
//! assert_eq!(result.total_growth, dec!(12682.50));
//! ```

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::{percent_of, round_half_up};

/// Compounding periods per year.
pub const PERIODS_PER_YEAR: u32 = 12;

/// Errors that can occur while projecting an investment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulatorError {
    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("annual rate must be non-negative, got {0}%")]
    NegativeRate(Decimal),

    /// The projected value does not fit in a decimal.
    #[error("projection over {years} years at {rate_percent}% overflows")]
    Overflow { years: u32, rate_percent: Decimal },
}

/// Inputs for one projection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimulationInput {
    pub initial_deposit: Decimal,
    pub monthly_contribution: Decimal,
    /// Nominal annual rate in percent, e.g. `12` for 12%.
    pub annual_rate_percent: Decimal,
    pub years: u32,
}

/// Result of a projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Future value of the initial deposit alone.
    pub deposit_future_value: Decimal,
    /// Future value of the stream of monthly contributions.
    pub contributions_future_value: Decimal,
    pub future_value: Decimal,
    /// Deposit plus every contribution, without growth.
    pub total_invested: Decimal,
    pub total_growth: Decimal,
    /// Principal as a share of the future value, for charting.
    pub invested_share_percent: Decimal,
    /// Growth as a share of the future value, for charting.
    pub growth_share_percent: Decimal,
}

/// Projects investments with monthly compounding.
pub struct InvestmentSimulator;

impl InvestmentSimulator {
    /// Projects `input` forward.
    ///
    /// # Errors
    ///
    /// Returns [`SimulatorError`] for negative inputs or when the compound
    /// factor or any projected total exceeds the decimal range.
    pub fn simulate(input: &SimulationInput) -> Result<SimulationResult, SimulatorError> {
        Self::validate(input)?;

        let overflow = || SimulatorError::Overflow {
            years: input.years,
            rate_percent: input.annual_rate_percent,
        };

        let periods = u64::from(input.years) * u64::from(PERIODS_PER_YEAR);
        let periodic_rate =
            input.annual_rate_percent / Decimal::ONE_HUNDRED / Decimal::from(PERIODS_PER_YEAR);
        let factor = (Decimal::ONE + periodic_rate)
            .checked_powu(periods)
            .ok_or_else(overflow)?;

        let deposit_future_value = input
            .initial_deposit
            .checked_mul(factor)
            .ok_or_else(overflow)?;
        let contributed = input
            .monthly_contribution
            .checked_mul(Decimal::from(periods))
            .ok_or_else(overflow)?;
        let contributions_future_value = if periodic_rate.is_zero() {
            contributed
        } else {
            input
                .monthly_contribution
                .checked_mul(factor - Decimal::ONE)
                .and_then(|growth| growth.checked_div(periodic_rate))
                .ok_or_else(overflow)?
        };

        let deposit_future_value = round_half_up(deposit_future_value);
        let contributions_future_value = round_half_up(contributions_future_value);
        let future_value = deposit_future_value
            .checked_add(contributions_future_value)
            .ok_or_else(overflow)?;
        let total_invested = input
            .initial_deposit
            .checked_add(contributed)
            .map(round_half_up)
            .ok_or_else(overflow)?;
        let total_growth = future_value - total_invested;

        let chart_base = if future_value.is_zero() {
            Decimal::ONE
        } else {
            future_value
        };

        debug!(%future_value, %total_invested, periods, "investment simulated");

        Ok(SimulationResult {
            deposit_future_value,
            contributions_future_value,
            future_value,
            total_invested,
            total_growth,
            invested_share_percent: round_half_up(percent_of(total_invested, chart_base)),
            growth_share_percent: round_half_up(percent_of(total_growth, chart_base)),
        })
    }

    fn validate(input: &SimulationInput) -> Result<(), SimulatorError> {
        if input.initial_deposit < Decimal::ZERO {
            return Err(SimulatorError::NegativeAmount {
                field: "initial_deposit",
                value: input.initial_deposit,
            });
        }
        if input.monthly_contribution < Decimal::ZERO {
            return Err(SimulatorError::NegativeAmount {
                field: "monthly_contribution",
                value: input.monthly_contribution,
            });
        }
        if input.annual_rate_percent < Decimal::ZERO {
            return Err(SimulatorError::NegativeRate(input.annual_rate_percent));
        }
        Ok(())
    }
}
