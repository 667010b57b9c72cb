//! Plain-text rendering of calculator results.

use std::fmt;

use rust_decimal::Decimal;
use tax_core::BracketBadge;
use tax_core::calculations::{RatioAnalysis, SalaryTaxResult, SimulationResult};

use crate::utils::{format_percent, format_pkr};

/// Emoji shown next to a bracket badge.
pub fn badge_emoji(badge: BracketBadge) -> &'static str {
    match badge {
        BracketBadge::TaxFree => "🟢",
        BracketBadge::Light => "🌱",
        BracketBadge::Steady => "💼",
        BracketBadge::Elite => "⚡",
        BracketBadge::Power => "🔥",
        BracketBadge::TopBracket => "👑",
    }
}

fn row(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    sign: &str,
    amount: Decimal,
) -> fmt::Result {
    writeln!(f, "{label:<32}{sign:>2} {:>14}", format_pkr(amount))
}

/// The audit trail for one salary tax calculation.
///
/// Deduction, credit, rebate and block tax lines only appear when non-zero.
pub struct SalaryReport<'a>(pub &'a SalaryTaxResult);

impl fmt::Display for SalaryReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = self.0;

        writeln!(f, "Tax Calculation Summary")?;
        writeln!(
            f,
            "{}  Total Annual Tax Liability",
            format_pkr(r.final_liability)
        )?;
        writeln!(
            f,
            "Tax ({}) | Take Home ({})",
            format_percent(r.tax_percent_of_cash_income),
            format_percent(r.net_percent_of_cash_income)
        )?;
        writeln!(f)?;

        row(f, "Total Income (Salary + Perks)", "", r.total_salary_income)?;
        if r.total_deductions > Decimal::ZERO {
            row(f, "Less: Zakat / Edu. Deductions", "-", r.total_deductions)?;
        }
        row(f, "Taxable Income", "", r.taxable_income)?;
        row(f, "Gross Tax (Per Slabs)", "", r.gross_slab_tax)?;
        if r.total_credits > Decimal::ZERO {
            row(f, "Less: Investment Credits", "-", r.total_credits)?;
        }
        if r.total_rebates > Decimal::ZERO {
            row(f, "Less: Special Rebates", "-", r.total_rebates)?;
        }
        if r.block_tax > Decimal::ZERO {
            row(f, "Add: Separate Block Tax", "+", r.block_tax)?;
        }
        writeln!(f)?;

        row(f, "Avg. Monthly Deduction", "", r.monthly_liability)?;
        row(f, "Est. Monthly Take Home", "", r.monthly_net_income)?;
        writeln!(f)?;

        write!(
            f,
            "{} {}: {}",
            badge_emoji(r.bracket),
            r.bracket.title(),
            r.bracket.subtitle()
        )
    }
}

/// One summary line of a batch run.
pub struct BatchLine<'a> {
    pub name: &'a str,
    pub result: &'a SalaryTaxResult,
}

impl fmt::Display for BatchLine<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{:<24} taxable {:>14}  tax {:>12}  monthly {:>10}  {} {}",
            self.name,
            format_pkr(self.result.taxable_income),
            format_pkr(self.result.final_liability),
            format_pkr(self.result.monthly_liability),
            badge_emoji(self.result.bracket),
            self.result.bracket.title()
        )
    }
}

pub struct SimulationReport<'a>(pub &'a SimulationResult);

impl fmt::Display for SimulationReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = self.0;
        writeln!(f, "Future Value:   {}", format_pkr(r.future_value))?;
        writeln!(f, "Total Invested: {}", format_pkr(r.total_invested))?;
        writeln!(f, "Total Growth:   {}", format_pkr(r.total_growth))?;
        write!(
            f,
            "Invested {} | Growth {}",
            format_percent(r.invested_share_percent),
            format_percent(r.growth_share_percent)
        )
    }
}

pub struct AnalysisReport<'a>(pub &'a RatioAnalysis);

impl fmt::Display for AnalysisReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = self.0;
        writeln!(f, "Net Margin:    {}%", r.net_margin_percent)?;
        writeln!(f, "Current Ratio: {}", r.current_ratio)?;
        write!(f, "{}", r.insight)
    }
}
