//! Rule-based financial ratio commentary.
//!
//! Computes net margin and current ratio from four headline figures and
//! classifies each against fixed thresholds, producing a risk level and a
//! short insight text.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::round_half_up;

/// Status lines a front end can show while an analysis "runs".
pub const ANALYSIS_STAGES: [&str; 5] = [
    "INITIALIZING NEURAL LINK...",
    "PARSING FINANCIAL VECTORS...",
    "CALCULATING SOLVENCY RATIOS...",
    "GENERATING STRATEGIC INFERENCE...",
    "ANALYSIS COMPLETE.",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalystError {
    #[error("input at least revenue or assets to analyze")]
    NothingToAnalyze,
}

/// Headline figures for one period.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RatioInput {
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub current_assets: Decimal,
    pub current_liabilities: Decimal,
}

/// Classification thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioThresholds {
    /// Margins below this percentage are a warning.
    pub low_margin_percent: Decimal,
    /// Margins above this percentage are strong.
    pub high_margin_percent: Decimal,
    /// Current ratios below this are a liquidity alert.
    pub low_current_ratio: Decimal,
    /// Current ratios above this suggest idle capital.
    pub high_current_ratio: Decimal,
}

impl Default for RatioThresholds {
    fn default() -> Self {
        Self {
            low_margin_percent: dec!(5),
            high_margin_percent: dec!(20),
            low_current_ratio: dec!(1.0),
            high_current_ratio: dec!(2.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profitability {
    Warning,
    Stable,
    StrongEfficiency,
}

impl Profitability {
    pub fn insight(&self) -> &'static str {
        match self {
            Self::Warning => {
                "PROFITABILITY WARNING: Net margin is critically low. Immediate OPEX audit recommended. "
            }
            Self::Stable => "STABLE OPERATIONS: Margins are healthy. ",
            Self::StrongEfficiency => {
                "STRONG EFFICIENCY: Margins exceed industry averages. Logic suggests reinvestment in growth. "
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Liquidity {
    Alert,
    Optimal,
    CapitalInefficiency,
}

impl Liquidity {
    pub fn insight(&self) -> &'static str {
        match self {
            Self::Alert => {
                "LIQUIDITY ALERT: Current assets insufficient to cover short-term debt. Cash flow injection required."
            }
            Self::Optimal => "SOLVENCY OPTIMAL: Balance sheet structure is sound.",
            Self::CapitalInefficiency => {
                "CAPITAL INEFFICIENCY DETECTED: Excess liquidity found. Suggest deploying capital into higher-yield vehicles."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioAnalysis {
    /// Net margin in percent, rounded to two places.
    pub net_margin_percent: Decimal,
    /// Current assets over current liabilities, rounded to two places.
    pub current_ratio: Decimal,
    pub profitability: Profitability,
    pub liquidity: Liquidity,
    pub risk: RiskLevel,
    pub insight: String,
}

/// Classifies ratios against a set of [`RatioThresholds`].
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::{RatioAnalyst, RatioInput, RiskLevel};
///
/// let analysis = RatioAnalyst::default()
///     .analyze(&RatioInput {
///         revenue: dec!(1000000),
///         expenses: dec!(700000),
///         current_assets: dec!(500000),
///         current_liabilities: dec!(300000),
///     })
///     .unwrap();
///
/// assert_eq!(analysis.net_margin_percent, dec!(30));
/// assert_eq!(analysis.risk, RiskLevel::Low);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RatioAnalyst {
    thresholds: RatioThresholds,
}

impl RatioAnalyst {
    pub fn new(thresholds: RatioThresholds) -> Self {
        Self { thresholds }
    }

    /// Analyzes one set of figures.
    ///
    /// Net margin is zero without revenue and the current ratio is zero
    /// without liabilities; the latter therefore reads as a liquidity alert.
    /// Ratios too large for a decimal saturate at `Decimal::MAX` (or `MIN`).
    ///
    /// # Errors
    ///
    /// Returns [`AnalystError::NothingToAnalyze`] when both revenue and
    /// current assets are zero.
    pub fn analyze(
        &self,
        input: &RatioInput,
    ) -> Result<RatioAnalysis, AnalystError> {
        if input.revenue.is_zero() && input.current_assets.is_zero() {
            return Err(AnalystError::NothingToAnalyze);
        }

        let margin = if input.revenue > Decimal::ZERO {
            saturating_ratio(input.revenue.saturating_sub(input.expenses), input.revenue)
                .saturating_mul(Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        };
        let current_ratio = if input.current_liabilities > Decimal::ZERO {
            saturating_ratio(input.current_assets, input.current_liabilities)
        } else {
            Decimal::ZERO
        };

        let profitability = self.classify_margin(margin);
        let liquidity = self.classify_current_ratio(current_ratio);
        let risk = if profitability == Profitability::Warning || liquidity == Liquidity::Alert {
            RiskLevel::High
        } else {
            RiskLevel::Low
        };
        let insight = format!(
            "[RISK LEVEL: {risk}] // {}{}",
            profitability.insight(),
            liquidity.insight()
        );

        debug!(%margin, %current_ratio, %risk, "ratios analyzed");

        Ok(RatioAnalysis {
            net_margin_percent: round_half_up(margin),
            current_ratio: round_half_up(current_ratio),
            profitability,
            liquidity,
            risk,
            insight,
        })
    }

    fn classify_margin(
        &self,
        margin: Decimal,
    ) -> Profitability {
        if margin < self.thresholds.low_margin_percent {
            Profitability::Warning
        } else if margin > self.thresholds.high_margin_percent {
            Profitability::StrongEfficiency
        } else {
            Profitability::Stable
        }
    }

    fn classify_current_ratio(
        &self,
        ratio: Decimal,
    ) -> Liquidity {
        if ratio < self.thresholds.low_current_ratio {
            Liquidity::Alert
        } else if ratio > self.thresholds.high_current_ratio {
            Liquidity::CapitalInefficiency
        } else {
            Liquidity::Optimal
        }
    }
}

/// `numerator / denominator` for a positive denominator, pinned to the
/// decimal range instead of overflowing.
fn saturating_ratio(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(if numerator.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}
