//! Salary tax liability worksheet for Pakistani salaried individuals.
//!
//! Implements the FY 2025-26 estimate under the Income Tax Ordinance 2001:
//! the user enters raw compensation data and the worksheet derives the
//! perquisites, deductions, credits and rebates.
//!
//! # Worksheet Structure
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Gross salary income: cash pay, taxable medical allowance, perquisites |
//! | 2    | Deductible allowances: zakat and education expenses |
//! | 3    | Slab tax on taxable income; separate block tax |
//! | 4    | Investment credits at the average tax rate |
//! | 5    | Teacher and senior citizen rebates |
//! | 6    | Monthly figures, share of cash income and bracket badge |
//!
//! Every reported line is rounded half-up to two decimal places and later
//! steps consume the rounded figure, so the reported lines always reconcile:
//!
//! ```text
//! taxable_income  = max(0, total_salary_income - total_deductions)
//! final_liability = max(0, gross_slab_tax - total_credits - total_rebates) + block_tax
//! ```
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{SalaryTaxInput, compute};
//!
//! let input = SalaryTaxInput {
//!     basic_salary_annual: dec!(1200000),
//!     ..Default::default()
//! };
//!
//! let result = compute(&input);
//!
//! assert_eq!(result.taxable_income, dec!(1200000));
//! assert_eq!(result.gross_slab_tax, dec!(30000));
//! assert_eq!(result.final_liability, dec!(30000));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::{min_of, non_negative, percent_of, round_half_up};
use crate::models::{BracketBadge, CarUsage, SlabSchedule};

/// Errors raised by [`SalaryTaxConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SalaryTaxConfigError {
    /// A rate expressed as a fraction fell outside [0, 1].
    #[error("{field} must be between 0 and 1, got {value}")]
    InvalidRate { field: &'static str, value: Decimal },

    /// A monetary threshold or cap was negative.
    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    /// The employer loan benchmark is a percentage and must lie in [0, 100].
    #[error("loan benchmark rate must be between 0 and 100 percent, got {0}")]
    InvalidLoanBenchmark(Decimal),
}

/// Rates, caps and thresholds used by the salary tax worksheet.
///
/// [`Default`] yields the FY 2025-26 values. Every field may be overridden
/// from a configuration file; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryTaxConfig {
    /// Share of basic salary up to which medical allowance is exempt
    /// when no medical facility is provided.
    pub medical_exemption_rate: Decimal,

    /// Perquisite rate on the cost of a partly personal company car.
    pub car_partial_rate: Decimal,

    /// Perquisite rate on the cost of a fully personal company car.
    pub car_full_rate: Decimal,

    /// Share of basic salary added when employer housing is provided.
    pub housing_rate: Decimal,

    /// Employer loans at or below this principal carry no benefit.
    pub loan_threshold: Decimal,

    /// Benchmark markup rate, in percent, for employer loans.
    pub loan_benchmark_rate_percent: Decimal,

    /// Education deduction applies only below this income (after zakat).
    pub edu_income_ceiling: Decimal,

    /// Education deduction cap as a share of fees paid.
    pub edu_fee_rate: Decimal,

    /// Education deduction cap as a share of income after zakat.
    pub edu_income_rate: Decimal,

    /// Education deduction cap per child.
    pub edu_per_child_cap: Decimal,

    /// Eligible donations cap as a share of taxable income.
    pub donation_cap_rate: Decimal,

    /// Eligible pension contribution cap as a share of taxable income.
    pub pension_cap_rate: Decimal,

    /// Eligible housing loan interest cap as a share of taxable income.
    pub housing_loan_cap_rate: Decimal,

    /// Rebate for full-time teachers and researchers.
    pub teacher_rebate_rate: Decimal,

    /// Rebate for senior citizens below the income ceiling.
    pub senior_rebate_rate: Decimal,

    /// Senior citizen rebate applies only at or below this taxable income.
    pub senior_income_ceiling: Decimal,

    /// Flat rate on separately taxed block income.
    pub block_tax_rate: Decimal,

    /// Progressive slab schedule.
    pub slabs: SlabSchedule,
}

impl Default for SalaryTaxConfig {
    fn default() -> Self {
        Self {
            medical_exemption_rate: dec!(0.10),
            car_partial_rate: dec!(0.05),
            car_full_rate: dec!(0.10),
            housing_rate: dec!(0.45),
            loan_threshold: dec!(1000000),
            loan_benchmark_rate_percent: dec!(10),
            edu_income_ceiling: dec!(1500000),
            edu_fee_rate: dec!(0.05),
            edu_income_rate: dec!(0.25),
            edu_per_child_cap: dec!(60000),
            donation_cap_rate: dec!(0.30),
            pension_cap_rate: dec!(0.20),
            housing_loan_cap_rate: dec!(0.50),
            teacher_rebate_rate: dec!(0.25),
            senior_rebate_rate: dec!(0.50),
            senior_income_ceiling: dec!(1000000),
            block_tax_rate: dec!(0.025),
            slabs: SlabSchedule::default(),
        }
    }
}

impl SalaryTaxConfig {
    /// Validates the configuration values.
    ///
    /// The slab schedule is validated when it is built, so only the scalar
    /// fields are checked here.
    ///
    /// # Errors
    ///
    /// Returns [`SalaryTaxConfigError`] for the first field found outside its
    /// valid range.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::calculations::{SalaryTaxConfig, SalaryTaxConfigError};
    ///
    /// let config = SalaryTaxConfig {
    ///     housing_rate: dec!(1.45),
    ///     ..Default::default()
    /// };
    ///
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(SalaryTaxConfigError::InvalidRate {
    ///         field: "housing_rate",
    ///         value: dec!(1.45),
    ///     })
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), SalaryTaxConfigError> {
        let rates = [
            ("medical_exemption_rate", self.medical_exemption_rate),
            ("car_partial_rate", self.car_partial_rate),
            ("car_full_rate", self.car_full_rate),
            ("housing_rate", self.housing_rate),
            ("edu_fee_rate", self.edu_fee_rate),
            ("edu_income_rate", self.edu_income_rate),
            ("donation_cap_rate", self.donation_cap_rate),
            ("pension_cap_rate", self.pension_cap_rate),
            ("housing_loan_cap_rate", self.housing_loan_cap_rate),
            ("teacher_rebate_rate", self.teacher_rebate_rate),
            ("senior_rebate_rate", self.senior_rebate_rate),
            ("block_tax_rate", self.block_tax_rate),
        ];
        for (field, value) in rates {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(SalaryTaxConfigError::InvalidRate { field, value });
            }
        }

        let amounts = [
            ("loan_threshold", self.loan_threshold),
            ("edu_income_ceiling", self.edu_income_ceiling),
            ("edu_per_child_cap", self.edu_per_child_cap),
            ("senior_income_ceiling", self.senior_income_ceiling),
        ];
        for (field, value) in amounts {
            if value < Decimal::ZERO {
                return Err(SalaryTaxConfigError::NegativeAmount { field, value });
            }
        }

        if self.loan_benchmark_rate_percent < Decimal::ZERO
            || self.loan_benchmark_rate_percent > Decimal::ONE_HUNDRED
        {
            return Err(SalaryTaxConfigError::InvalidLoanBenchmark(
                self.loan_benchmark_rate_percent,
            ));
        }

        Ok(())
    }
}

/// Largest amount, in PKR, the worksheet accepts for any single input.
///
/// Every step stays far inside `Decimal` range at this ceiling; larger
/// entries are clamped down to it.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000000);

fn bounded(amount: Decimal) -> Decimal {
    non_negative(amount).min(MAX_AMOUNT)
}

/// Raw inputs for one fiscal year, as entered by the user.
///
/// Amounts are annual PKR. The form layer defaults empty or invalid entries
/// to zero; [`SalaryTaxInput::sanitized`] additionally clamps negatives and
/// amounts above [`MAX_AMOUNT`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryTaxInput {
    // Cash compensation
    pub basic_salary_annual: Decimal,
    pub bonus_annual: Decimal,
    pub other_allowance_annual: Decimal,
    pub medical_allowance_annual: Decimal,
    pub medical_facility_provided: bool,

    // Perquisites
    pub company_car_cost: Decimal,
    pub company_car_usage: CarUsage,
    pub share_fair_market_value: Decimal,
    pub share_cost_to_employee: Decimal,
    pub housing_provided: bool,
    pub employer_loan_principal: Decimal,
    pub employer_loan_rate_percent: Decimal,

    /// Flying allowance or other income taxed as a separate block.
    pub flying_allowance_or_block_income: Decimal,

    // Deductible allowances
    pub zakat_paid: Decimal,
    pub edu_fees_annual: Decimal,
    pub edu_child_count: u32,

    // Credit-eligible investments
    pub donations_amount: Decimal,
    pub pension_fund_contribution: Decimal,
    pub housing_loan_interest_paid: Decimal,

    // Rebate eligibility
    pub is_teacher_or_researcher: bool,
    pub is_senior_citizen: bool,
}

impl SalaryTaxInput {
    /// Returns a copy with every amount clamped into `0..=MAX_AMOUNT`.
    pub fn sanitized(&self) -> Self {
        Self {
            basic_salary_annual: bounded(self.basic_salary_annual),
            bonus_annual: bounded(self.bonus_annual),
            other_allowance_annual: bounded(self.other_allowance_annual),
            medical_allowance_annual: bounded(self.medical_allowance_annual),
            company_car_cost: bounded(self.company_car_cost),
            share_fair_market_value: bounded(self.share_fair_market_value),
            share_cost_to_employee: bounded(self.share_cost_to_employee),
            employer_loan_principal: bounded(self.employer_loan_principal),
            employer_loan_rate_percent: bounded(self.employer_loan_rate_percent),
            flying_allowance_or_block_income: bounded(self.flying_allowance_or_block_income),
            zakat_paid: bounded(self.zakat_paid),
            edu_fees_annual: bounded(self.edu_fees_annual),
            donations_amount: bounded(self.donations_amount),
            pension_fund_contribution: bounded(self.pension_fund_contribution),
            housing_loan_interest_paid: bounded(self.housing_loan_interest_paid),
            ..self.clone()
        }
    }
}

/// Which rebate was applied in Step 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rebate {
    TeacherOrResearcher,
    /// Applied when the senior citizen qualifies, whether or not the
    /// teacher rebate also applies. The two never stack.
    SeniorCitizen,
}

/// Result of the salary tax worksheet.
///
/// Carries the headline figures along with every intermediate line so a
/// front end can render the full audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryTaxResult {
    // Step 1
    pub taxable_medical_allowance: Decimal,
    pub exempt_medical_allowance: Decimal,
    pub car_benefit: Decimal,
    pub share_benefit: Decimal,
    pub housing_benefit: Decimal,
    pub loan_benefit: Decimal,
    pub total_salary_income: Decimal,

    // Step 2
    pub edu_deduction: Decimal,
    pub total_deductions: Decimal,
    pub taxable_income: Decimal,

    // Step 3
    pub gross_slab_tax: Decimal,
    pub block_tax: Decimal,

    // Step 4
    pub eligible_donation: Decimal,
    pub eligible_pension: Decimal,
    pub eligible_housing_loan_interest: Decimal,
    pub donation_credit: Decimal,
    pub pension_credit: Decimal,
    pub housing_loan_credit: Decimal,
    pub total_credits: Decimal,
    pub tax_after_credits: Decimal,

    // Step 5
    pub applied_rebate: Option<Rebate>,
    pub total_rebates: Decimal,
    pub net_normal_tax: Decimal,
    pub final_liability: Decimal,

    // Step 6
    pub monthly_liability: Decimal,
    /// Basic, bonus, other and medical allowance; floored at 1.
    pub cash_income: Decimal,
    pub monthly_net_income: Decimal,
    pub tax_percent_of_cash_income: Decimal,
    /// Never negative, even when the liability exceeds cash income.
    pub net_percent_of_cash_income: Decimal,
    pub bracket: BracketBadge,
}

/// Calculator for the salary tax worksheet.
///
/// Holds a validated [`SalaryTaxConfig`]; [`SalaryTaxWorksheet::calculate`]
/// cannot fail.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::{SalaryTaxConfig, SalaryTaxInput, SalaryTaxWorksheet};
///
/// let worksheet = SalaryTaxWorksheet::new(SalaryTaxConfig::default()).unwrap();
///
/// let input = SalaryTaxInput {
///     basic_salary_annual: dec!(1200000),
///     is_senior_citizen: true,
///     ..Default::default()
/// };
/// let result = worksheet.calculate(&input);
///
/// // Taxable income is above the 1,000,000 senior citizen ceiling.
/// assert_eq!(result.total_rebates, dec!(0));
/// assert_eq!(result.final_liability, dec!(30000));
/// ```
#[derive(Debug, Clone)]
pub struct SalaryTaxWorksheet {
    config: SalaryTaxConfig,
}

impl Default for SalaryTaxWorksheet {
    fn default() -> Self {
        Self {
            config: SalaryTaxConfig::default(),
        }
    }
}

/// Computes the salary tax for `input` under the FY 2025-26 defaults.
pub fn compute(input: &SalaryTaxInput) -> SalaryTaxResult {
    SalaryTaxWorksheet::default().calculate(input)
}

impl SalaryTaxWorksheet {
    /// Creates a worksheet after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SalaryTaxConfigError`] if the configuration is invalid.
    pub fn new(config: SalaryTaxConfig) -> Result<Self, SalaryTaxConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SalaryTaxConfig {
        &self.config
    }

    /// Runs every step of the worksheet.
    ///
    /// Amounts are clamped into `0..=MAX_AMOUNT` before Step 1.
    pub fn calculate(
        &self,
        input: &SalaryTaxInput,
    ) -> SalaryTaxResult {
        let sanitized = input.sanitized();
        if &sanitized != input {
            warn!("salary tax inputs were clamped to the supported range");
        }
        let input = &sanitized;

        // Step 1: Gross salary income
        let (taxable_medical_allowance, exempt_medical_allowance) = self.medical_allowance(
            input.medical_allowance_annual,
            input.basic_salary_annual,
            input.medical_facility_provided,
        );
        let car_benefit = self.car_benefit(input.company_car_cost, input.company_car_usage);
        let share_benefit =
            self.share_benefit(input.share_fair_market_value, input.share_cost_to_employee);
        let housing_benefit = self.housing_benefit(input.basic_salary_annual, input.housing_provided);
        let loan_benefit = self.loan_benefit(
            input.employer_loan_principal,
            input.employer_loan_rate_percent,
        );
        let total_salary_income = round_half_up(
            input.basic_salary_annual
                + input.bonus_annual
                + input.other_allowance_annual
                + taxable_medical_allowance
                + car_benefit
                + share_benefit
                + housing_benefit
                + loan_benefit,
        );

        // Step 2: Deductible allowances
        let edu_deduction = self.edu_deduction(
            total_salary_income,
            input.zakat_paid,
            input.edu_fees_annual,
            input.edu_child_count,
        );
        let total_deductions = round_half_up(input.zakat_paid + edu_deduction);
        let taxable_income = non_negative(total_salary_income - total_deductions);

        // Step 3: Slab tax and block tax
        let gross_slab_tax = self.config.slabs.tax_on(taxable_income);
        let block_tax = self.block_tax(input.flying_allowance_or_block_income);

        // Step 4: Investment credits
        let avg_rate = self.average_rate(gross_slab_tax, taxable_income);
        let eligible_donation = self.eligible_amount(
            input.donations_amount,
            taxable_income,
            self.config.donation_cap_rate,
        );
        let eligible_pension = self.eligible_amount(
            input.pension_fund_contribution,
            taxable_income,
            self.config.pension_cap_rate,
        );
        let eligible_housing_loan_interest = self.eligible_amount(
            input.housing_loan_interest_paid,
            taxable_income,
            self.config.housing_loan_cap_rate,
        );
        let donation_credit = round_half_up(eligible_donation * avg_rate);
        let pension_credit = round_half_up(eligible_pension * avg_rate);
        let housing_loan_credit = round_half_up(eligible_housing_loan_interest * avg_rate);
        let total_credits = donation_credit + pension_credit + housing_loan_credit;
        let tax_after_credits = non_negative(gross_slab_tax - total_credits);

        // Step 5: Rebates
        let applied_rebate = self.applicable_rebate(
            taxable_income,
            input.is_teacher_or_researcher,
            input.is_senior_citizen,
        );
        let total_rebates = self.rebate_amount(tax_after_credits, applied_rebate);
        let net_normal_tax = non_negative(tax_after_credits - total_rebates);
        let final_liability = net_normal_tax + block_tax;

        // Step 6: Presentation figures
        let cash_income = self.cash_income(input);
        let monthly_liability = round_half_up(final_liability / dec!(12));
        let monthly_net_income = round_half_up((cash_income - final_liability) / dec!(12));
        let tax_percent_of_cash_income = round_half_up(percent_of(final_liability, cash_income));
        let net_percent_of_cash_income =
            non_negative(Decimal::ONE_HUNDRED - tax_percent_of_cash_income);
        let bracket = BracketBadge::for_slab_index(self.config.slabs.slab_index(taxable_income));

        debug!(
            %total_salary_income,
            %taxable_income,
            %gross_slab_tax,
            %total_credits,
            %total_rebates,
            %block_tax,
            %final_liability,
            "salary tax calculated"
        );

        SalaryTaxResult {
            taxable_medical_allowance,
            exempt_medical_allowance,
            car_benefit,
            share_benefit,
            housing_benefit,
            loan_benefit,
            total_salary_income,
            edu_deduction,
            total_deductions,
            taxable_income,
            gross_slab_tax,
            block_tax,
            eligible_donation,
            eligible_pension,
            eligible_housing_loan_interest,
            donation_credit,
            pension_credit,
            housing_loan_credit,
            total_credits,
            tax_after_credits,
            applied_rebate,
            total_rebates,
            net_normal_tax,
            final_liability,
            monthly_liability,
            cash_income,
            monthly_net_income,
            tax_percent_of_cash_income,
            net_percent_of_cash_income,
            bracket,
        }
    }

    /// Splits the medical allowance into its (taxable, exempt) parts.
    ///
    /// With a medical facility provided the whole allowance is taxable;
    /// otherwise up to the exemption share of basic salary is exempt.
    fn medical_allowance(
        &self,
        allowance: Decimal,
        basic_salary: Decimal,
        facility_provided: bool,
    ) -> (Decimal, Decimal) {
        if facility_provided {
            return (round_half_up(allowance), Decimal::ZERO);
        }
        let limit = round_half_up(basic_salary * self.config.medical_exemption_rate);
        let exempt = round_half_up(allowance.min(limit));
        (round_half_up(allowance) - exempt, exempt)
    }

    /// Company car perquisite.
    fn car_benefit(
        &self,
        cost: Decimal,
        usage: CarUsage,
    ) -> Decimal {
        let rate = match usage {
            CarUsage::Partial => self.config.car_partial_rate,
            CarUsage::Full => self.config.car_full_rate,
        };
        round_half_up(cost * rate)
    }

    /// Employee share perquisite: the discount to fair market value.
    fn share_benefit(
        &self,
        fair_market_value: Decimal,
        cost_to_employee: Decimal,
    ) -> Decimal {
        round_half_up(non_negative(fair_market_value - cost_to_employee))
    }

    /// Employer housing perquisite.
    fn housing_benefit(
        &self,
        basic_salary: Decimal,
        provided: bool,
    ) -> Decimal {
        if !provided {
            return Decimal::ZERO;
        }
        round_half_up(basic_salary * self.config.housing_rate)
    }

    /// Employer loan perquisite at the benchmark rate.
    ///
    /// Only loans above the threshold count, and only the markup charged
    /// below the benchmark is a benefit.
    fn loan_benefit(
        &self,
        principal: Decimal,
        charged_rate_percent: Decimal,
    ) -> Decimal {
        if principal <= self.config.loan_threshold {
            return Decimal::ZERO;
        }
        let rate_gap = non_negative(self.config.loan_benchmark_rate_percent - charged_rate_percent);
        round_half_up(principal * rate_gap / Decimal::ONE_HUNDRED)
    }

    /// Education expense deduction.
    ///
    /// Only available while income after zakat is below the ceiling; then the
    /// smallest of the fee share, the income share and the per-child cap.
    fn edu_deduction(
        &self,
        total_salary_income: Decimal,
        zakat: Decimal,
        fees: Decimal,
        child_count: u32,
    ) -> Decimal {
        let income_after_zakat = total_salary_income - zakat;
        if income_after_zakat >= self.config.edu_income_ceiling || fees <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let deduction = min_of(&[
            fees * self.config.edu_fee_rate,
            income_after_zakat * self.config.edu_income_rate,
            self.config.edu_per_child_cap * Decimal::from(child_count),
        ]);
        round_half_up(non_negative(deduction))
    }

    /// Flat tax on separately taxed block income.
    fn block_tax(
        &self,
        block_income: Decimal,
    ) -> Decimal {
        round_half_up(block_income * self.config.block_tax_rate)
    }

    /// Gross slab tax over taxable income; zero when there is no income.
    fn average_rate(
        &self,
        gross_slab_tax: Decimal,
        taxable_income: Decimal,
    ) -> Decimal {
        if taxable_income <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        gross_slab_tax / taxable_income
    }

    /// The smaller of the amount paid and its cap on taxable income.
    fn eligible_amount(
        &self,
        amount: Decimal,
        taxable_income: Decimal,
        cap_rate: Decimal,
    ) -> Decimal {
        let cap = round_half_up(taxable_income * cap_rate);
        amount.min(cap)
    }

    /// Picks the rebate that applies, if any.
    ///
    /// A qualifying senior citizen always gets the senior rebate, even when
    /// the teacher rebate also applies; the larger rebate wins, they never
    /// add up.
    fn applicable_rebate(
        &self,
        taxable_income: Decimal,
        is_teacher: bool,
        is_senior: bool,
    ) -> Option<Rebate> {
        if is_senior && taxable_income <= self.config.senior_income_ceiling {
            Some(Rebate::SeniorCitizen)
        } else if is_teacher {
            Some(Rebate::TeacherOrResearcher)
        } else {
            None
        }
    }

    fn rebate_amount(
        &self,
        tax_after_credits: Decimal,
        rebate: Option<Rebate>,
    ) -> Decimal {
        let rate = match rebate {
            Some(Rebate::TeacherOrResearcher) => self.config.teacher_rebate_rate,
            Some(Rebate::SeniorCitizen) => self.config.senior_rebate_rate,
            None => return Decimal::ZERO,
        };
        round_half_up(tax_after_credits * rate)
    }

    /// Cash inflow used for the take-home figures, floored at 1.
    fn cash_income(
        &self,
        input: &SalaryTaxInput,
    ) -> Decimal {
        let cash = input.basic_salary_annual
            + input.bonus_annual
            + input.other_allowance_annual
            + input.medical_allowance_annual;
        if cash <= Decimal::ZERO { Decimal::ONE } else { cash }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;

    fn worksheet() -> SalaryTaxWorksheet {
        SalaryTaxWorksheet::new(SalaryTaxConfig::default()).unwrap()
    }

    fn basic(amount: Decimal) -> SalaryTaxInput {
        SalaryTaxInput {
            basic_salary_annual: amount,
            ..Default::default()
        }
    }

    /// A high earner with perquisites, zakat, a donation, flying allowance
    /// and the teacher rebate.
    fn senior_manager_input() -> SalaryTaxInput {
        SalaryTaxInput {
            basic_salary_annual: dec!(2400000),
            bonus_annual: dec!(200000),
            medical_allowance_annual: dec!(300000),
            company_car_cost: dec!(3000000),
            company_car_usage: CarUsage::Partial,
            housing_provided: true,
            flying_allowance_or_block_income: dec!(400000),
            zakat_paid: dec!(90000),
            donations_amount: dec!(100000),
            is_teacher_or_researcher: true,
            ..Default::default()
        }
    }

    /// Below the education ceiling, with two children in school.
    fn school_parent_input() -> SalaryTaxInput {
        SalaryTaxInput {
            basic_salary_annual: dec!(1000000),
            zakat_paid: dec!(20000),
            edu_fees_annual: dec!(400000),
            edu_child_count: 2,
            ..Default::default()
        }
    }

    /// Initializes tracing subscriber for tests that verify log output.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    // =========================================================================
    // SalaryTaxConfig::validate tests
    // =========================================================================

    #[test]
    fn validate_accepts_default_config() {
        assert_eq!(SalaryTaxConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_negative_rate() {
        let config = SalaryTaxConfig {
            block_tax_rate: dec!(-0.025),
            ..Default::default()
        };

        assert_eq!(
            config.validate(),
            Err(SalaryTaxConfigError::InvalidRate {
                field: "block_tax_rate",
                value: dec!(-0.025),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_threshold() {
        let config = SalaryTaxConfig {
            senior_income_ceiling: dec!(-1),
            ..Default::default()
        };

        assert_eq!(
            config.validate(),
            Err(SalaryTaxConfigError::NegativeAmount {
                field: "senior_income_ceiling",
                value: dec!(-1),
            })
        );
    }

    #[test]
    fn validate_rejects_loan_benchmark_above_hundred_percent() {
        let config = SalaryTaxConfig {
            loan_benchmark_rate_percent: dec!(120),
            ..Default::default()
        };

        assert_eq!(
            config.validate(),
            Err(SalaryTaxConfigError::InvalidLoanBenchmark(dec!(120)))
        );
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = SalaryTaxConfig {
            pension_cap_rate: dec!(2),
            ..Default::default()
        };

        assert!(SalaryTaxWorksheet::new(config).is_err());
    }

    // =========================================================================
    // Step 1: gross salary income
    // =========================================================================

    #[test]
    fn medical_allowance_exempt_up_to_ten_percent_of_basic() {
        let (taxable, exempt) = worksheet().medical_allowance(dec!(300000), dec!(2400000), false);

        assert_eq!(exempt, dec!(240000));
        assert_eq!(taxable, dec!(60000));
    }

    #[test]
    fn medical_allowance_below_limit_is_fully_exempt() {
        let (taxable, exempt) = worksheet().medical_allowance(dec!(50000), dec!(1000000), false);

        assert_eq!(exempt, dec!(50000));
        assert_eq!(taxable, dec!(0));
    }

    #[test]
    fn medical_allowance_fully_taxable_when_facility_provided() {
        let (taxable, exempt) = worksheet().medical_allowance(dec!(50000), dec!(1000000), true);

        assert_eq!(exempt, dec!(0));
        assert_eq!(taxable, dec!(50000));
    }

    #[test]
    fn car_benefit_uses_usage_rate() {
        let worksheet = worksheet();

        assert_eq!(worksheet.car_benefit(dec!(3000000), CarUsage::Partial), dec!(150000));
        assert_eq!(worksheet.car_benefit(dec!(3000000), CarUsage::Full), dec!(300000));
    }

    #[test]
    fn share_benefit_is_discount_to_market_value() {
        let worksheet = worksheet();

        assert_eq!(worksheet.share_benefit(dec!(500000), dec!(200000)), dec!(300000));
        assert_eq!(worksheet.share_benefit(dec!(200000), dec!(500000)), dec!(0));
    }

    #[test]
    fn housing_benefit_is_share_of_basic_when_provided() {
        let worksheet = worksheet();

        assert_eq!(worksheet.housing_benefit(dec!(2400000), true), dec!(1080000));
        assert_eq!(worksheet.housing_benefit(dec!(2400000), false), dec!(0));
    }

    #[test]
    fn loan_benefit_applies_rate_gap_above_threshold() {
        let result = worksheet().loan_benefit(dec!(2000000), dec!(4));

        assert_eq!(result, dec!(120000)); // 2,000,000 × 6%
    }

    #[test]
    fn loan_benefit_zero_at_or_below_threshold() {
        let worksheet = worksheet();

        assert_eq!(worksheet.loan_benefit(dec!(1000000), dec!(0)), dec!(0));
        assert_eq!(worksheet.loan_benefit(dec!(500000), dec!(0)), dec!(0));
    }

    #[test]
    fn loan_benefit_zero_when_charged_at_or_above_benchmark() {
        let worksheet = worksheet();

        assert_eq!(worksheet.loan_benefit(dec!(5000000), dec!(10)), dec!(0));
        assert_eq!(worksheet.loan_benefit(dec!(5000000), dec!(12.5)), dec!(0));
    }

    // =========================================================================
    // Step 2: deductible allowances
    // =========================================================================

    #[test]
    fn edu_deduction_takes_smallest_cap() {
        let result = worksheet().edu_deduction(dec!(1000000), dec!(20000), dec!(400000), 2);

        // min(20,000 fees share, 245,000 income share, 120,000 per-child)
        assert_eq!(result, dec!(20000));
    }

    #[test]
    fn edu_deduction_capped_per_child() {
        let result = worksheet().edu_deduction(dec!(1400000), dec!(0), dec!(2000000), 1);

        assert_eq!(result, dec!(60000));
    }

    #[test]
    fn edu_deduction_zero_at_income_ceiling() {
        let result = worksheet().edu_deduction(dec!(1500000), dec!(0), dec!(400000), 2);

        assert_eq!(result, dec!(0));
    }

    #[test]
    fn edu_deduction_zakat_can_bring_income_under_ceiling() {
        let result = worksheet().edu_deduction(dec!(1550000), dec!(100000), dec!(400000), 2);

        assert_eq!(result, dec!(20000));
    }

    #[test]
    fn edu_deduction_zero_without_children() {
        let result = worksheet().edu_deduction(dec!(1000000), dec!(0), dec!(400000), 0);

        assert_eq!(result, dec!(0));
    }

    #[test]
    fn edu_deduction_never_negative_when_zakat_exceeds_income() {
        let result = worksheet().edu_deduction(dec!(100000), dec!(300000), dec!(400000), 2);

        assert_eq!(result, dec!(0));
    }

    #[test]
    fn calculate_applies_zakat_and_edu_deduction() {
        let result = worksheet().calculate(&school_parent_input());

        assert_eq!(result.total_salary_income, dec!(1000000));
        assert_eq!(result.edu_deduction, dec!(20000));
        assert_eq!(result.total_deductions, dec!(40000));
        assert_eq!(result.taxable_income, dec!(960000));
        assert_eq!(result.gross_slab_tax, dec!(18000));
        assert_eq!(result.final_liability, dec!(18000));
    }

    #[test]
    fn calculate_taxable_income_never_negative() {
        let input = SalaryTaxInput {
            basic_salary_annual: dec!(100000),
            zakat_paid: dec!(500000),
            ..Default::default()
        };

        let result = worksheet().calculate(&input);

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.final_liability, dec!(0));
    }

    // =========================================================================
    // Step 3: slab and block tax
    // =========================================================================

    #[test]
    fn calculate_basic_salary_example() {
        let result = worksheet().calculate(&basic(dec!(1200000)));

        assert_eq!(result.total_salary_income, dec!(1200000));
        assert_eq!(result.taxable_income, dec!(1200000));
        assert_eq!(result.gross_slab_tax, dec!(30000));
        assert_eq!(result.final_liability, dec!(30000));
    }

    #[test]
    fn calculate_slab_tax_exact_at_boundaries() {
        let worksheet = worksheet();
        let cases = [
            (dec!(600000), dec!(0)),
            (dec!(1200000), dec!(30000)),
            (dec!(2200000), dec!(180000)),
            (dec!(3200000), dec!(430000)),
            (dec!(4100000), dec!(700000)),
        ];

        for (income, expected) in cases {
            let result = worksheet.calculate(&basic(income));
            assert_eq!(result.gross_slab_tax, expected, "income {income}");
        }
    }

    #[test]
    fn block_tax_kept_out_of_slabs() {
        let input = SalaryTaxInput {
            flying_allowance_or_block_income: dec!(1000000),
            ..Default::default()
        };

        let result = worksheet().calculate(&input);

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.gross_slab_tax, dec!(0));
        assert_eq!(result.block_tax, dec!(25000));
        assert_eq!(result.final_liability, dec!(25000));
    }

    // =========================================================================
    // Step 4: credits
    // =========================================================================

    #[test]
    fn credits_capped_at_share_of_taxable_income() {
        let input = SalaryTaxInput {
            donations_amount: dec!(12000000), // 10× taxable income
            ..basic(dec!(1200000))
        };

        let result = worksheet().calculate(&input);

        assert_eq!(result.eligible_donation, dec!(360000));
        assert_eq!(result.donation_credit, dec!(9000)); // 360,000 × 2.5%
        assert_eq!(result.tax_after_credits, dec!(21000));
    }

    #[test]
    fn every_credit_respects_its_cap() {
        let input = SalaryTaxInput {
            donations_amount: dec!(99000000),
            pension_fund_contribution: dec!(99000000),
            housing_loan_interest_paid: dec!(99000000),
            ..basic(dec!(3000000))
        };

        let result = worksheet().calculate(&input);

        assert_eq!(result.eligible_donation, dec!(900000));
        assert_eq!(result.eligible_pension, dec!(600000));
        assert_eq!(result.eligible_housing_loan_interest, dec!(1500000));
        assert!(result.total_credits <= result.gross_slab_tax);
    }

    #[test]
    fn credits_below_cap_use_amount_paid() {
        let input = SalaryTaxInput {
            pension_fund_contribution: dec!(100000),
            ..basic(dec!(1200000))
        };

        let result = worksheet().calculate(&input);

        assert_eq!(result.eligible_pension, dec!(100000));
        assert_eq!(result.pension_credit, dec!(2500));
    }

    #[test]
    fn credits_zero_without_taxable_income() {
        let input = SalaryTaxInput {
            donations_amount: dec!(50000),
            ..Default::default()
        };

        let result = worksheet().calculate(&input);

        assert_eq!(result.total_credits, dec!(0));
    }

    // =========================================================================
    // Step 5: rebates
    // =========================================================================

    #[test]
    fn teacher_rebate_is_quarter_of_tax_after_credits() {
        let input = SalaryTaxInput {
            is_teacher_or_researcher: true,
            ..school_parent_input()
        };

        let result = worksheet().calculate(&input);

        assert_eq!(result.applied_rebate, Some(Rebate::TeacherOrResearcher));
        assert_eq!(result.total_rebates, dec!(4500));
        assert_eq!(result.final_liability, dec!(13500));
    }

    #[test]
    fn senior_rebate_is_half_below_ceiling() {
        let input = SalaryTaxInput {
            is_senior_citizen: true,
            ..school_parent_input()
        };

        let result = worksheet().calculate(&input);

        assert_eq!(result.applied_rebate, Some(Rebate::SeniorCitizen));
        assert_eq!(result.total_rebates, dec!(9000));
    }

    #[test]
    fn teacher_and_senior_rebates_do_not_stack() {
        let input = SalaryTaxInput {
            is_teacher_or_researcher: true,
            is_senior_citizen: true,
            ..school_parent_input()
        };

        let result = worksheet().calculate(&input);

        assert_eq!(result.total_rebates, result.tax_after_credits * dec!(0.50));
        assert_eq!(result.final_liability, dec!(9000));
    }

    #[test]
    fn senior_rebate_not_available_above_ceiling() {
        let input = SalaryTaxInput {
            is_senior_citizen: true,
            ..basic(dec!(1000001))
        };

        let result = worksheet().calculate(&input);

        assert_eq!(result.applied_rebate, None);
        assert_eq!(result.total_rebates, dec!(0));
    }

    #[test]
    fn teacher_rebate_applies_above_senior_ceiling() {
        let input = SalaryTaxInput {
            is_teacher_or_researcher: true,
            is_senior_citizen: true,
            ..basic(dec!(2200000))
        };

        let result = worksheet().calculate(&input);

        assert_eq!(result.applied_rebate, Some(Rebate::TeacherOrResearcher));
        assert_eq!(result.total_rebates, dec!(45000));
        assert_eq!(result.final_liability, dec!(135000));
    }

    // =========================================================================
    // Full worksheet
    // =========================================================================

    #[test]
    fn calculate_all_zero_input_owes_nothing() {
        let result = worksheet().calculate(&SalaryTaxInput::default());

        assert_eq!(result.final_liability, dec!(0));
        assert_eq!(result.cash_income, dec!(1));
        assert_eq!(result.tax_percent_of_cash_income, dec!(0));
        assert_eq!(result.net_percent_of_cash_income, dec!(100));
        assert_eq!(result.bracket, BracketBadge::TaxFree);
    }

    #[test]
    fn calculate_senior_manager_audit_trail() {
        let result = worksheet().calculate(&senior_manager_input());

        assert_eq!(result.taxable_medical_allowance, dec!(60000));
        assert_eq!(result.car_benefit, dec!(150000));
        assert_eq!(result.housing_benefit, dec!(1080000));
        assert_eq!(result.total_salary_income, dec!(3890000));
        assert_eq!(result.edu_deduction, dec!(0));
        assert_eq!(result.total_deductions, dec!(90000));
        assert_eq!(result.taxable_income, dec!(3800000));
        assert_eq!(result.gross_slab_tax, dec!(610000));
        assert_eq!(result.donation_credit, dec!(16052.63));
        assert_eq!(result.tax_after_credits, dec!(593947.37));
        assert_eq!(result.total_rebates, dec!(148486.84));
        assert_eq!(result.net_normal_tax, dec!(445460.53));
        assert_eq!(result.block_tax, dec!(10000));
        assert_eq!(result.final_liability, dec!(455460.53));
    }

    #[test]
    fn calculate_senior_manager_presentation_figures() {
        let result = worksheet().calculate(&senior_manager_input());

        assert_eq!(result.monthly_liability, dec!(37955.04));
        assert_eq!(result.cash_income, dec!(2900000));
        assert_eq!(result.monthly_net_income, dec!(203711.62));
        assert_eq!(result.tax_percent_of_cash_income, dec!(15.71));
        assert_eq!(result.net_percent_of_cash_income, dec!(84.29));
        assert_eq!(result.bracket, BracketBadge::Power);
    }

    #[test]
    fn net_percent_never_negative_when_tax_exceeds_cash() {
        // Perquisites alone push tax above the cash actually received.
        let input = SalaryTaxInput {
            basic_salary_annual: dec!(100000),
            share_fair_market_value: dec!(50000000),
            ..Default::default()
        };

        let result = worksheet().calculate(&input);

        assert!(result.tax_percent_of_cash_income > dec!(100));
        assert_eq!(result.net_percent_of_cash_income, dec!(0));
    }

    #[test]
    fn taxable_income_monotonic_in_basic_salary() {
        let worksheet = worksheet();
        let base = senior_manager_input();
        let mut previous = Decimal::ZERO;

        for step in 0..=24u32 {
            let input = SalaryTaxInput {
                basic_salary_annual: Decimal::from(step) * dec!(250000),
                ..base.clone()
            };
            let result = worksheet.calculate(&input);

            assert!(result.taxable_income >= previous);
            assert!(result.taxable_income >= Decimal::ZERO);
            previous = result.taxable_income;
        }
    }

    #[test]
    fn final_liability_reconciles_with_reported_lines() {
        let worksheet = worksheet();
        let inputs = [
            SalaryTaxInput::default(),
            basic(dec!(1200000)),
            senior_manager_input(),
            school_parent_input(),
            SalaryTaxInput {
                is_senior_citizen: true,
                pension_fund_contribution: dec!(5000000),
                flying_allowance_or_block_income: dec!(250000),
                ..basic(dec!(900000))
            },
        ];

        for input in &inputs {
            let result = worksheet.calculate(input);
            let expected = non_negative(
                result.gross_slab_tax - result.total_credits - result.total_rebates,
            ) + result.block_tax;

            assert_eq!(result.final_liability, expected);
            assert!(result.final_liability >= result.block_tax);
            assert_eq!(
                result.taxable_income,
                non_negative(result.total_salary_income - result.total_deductions)
            );
        }
    }

    #[test]
    fn calculate_clamps_negative_inputs() {
        let _guard = init_test_tracing();
        let input = SalaryTaxInput {
            bonus_annual: dec!(-500000),
            ..basic(dec!(1200000))
        };

        let result = worksheet().calculate(&input);

        assert_eq!(result.total_salary_income, dec!(1200000));
        assert_eq!(result.final_liability, dec!(30000));
    }

    #[test]
    fn calculate_caps_huge_block_income() {
        let _guard = init_test_tracing();
        let input = SalaryTaxInput {
            flying_allowance_or_block_income: Decimal::MAX,
            ..Default::default()
        };

        let result = worksheet().calculate(&input);

        // 2.5% of the ceiling; cash income is floored at 1
        assert_eq!(result.block_tax, dec!(25000000000000000));
        assert_eq!(result.final_liability, dec!(25000000000000000));
        assert_eq!(result.tax_percent_of_cash_income, dec!(2500000000000000000));
        assert_eq!(result.net_percent_of_cash_income, Decimal::ZERO);
    }

    #[test]
    fn calculate_caps_huge_salary_amounts() {
        let half = Decimal::MAX / dec!(2);
        let input = SalaryTaxInput {
            bonus_annual: half,
            ..basic(half)
        };

        let sanitized = input.sanitized();
        let result = worksheet().calculate(&input);

        assert_eq!(sanitized.basic_salary_annual, MAX_AMOUNT);
        assert_eq!(sanitized.bonus_annual, MAX_AMOUNT);
        assert_eq!(result.total_salary_income, dec!(2000000000000000000));
        assert!(result.final_liability > Decimal::ZERO);
        assert_eq!(result.bracket, BracketBadge::TopBracket);
    }

    #[test]
    fn compute_matches_default_worksheet() {
        let input = senior_manager_input();

        assert_eq!(compute(&input), worksheet().calculate(&input));
    }

    #[test]
    fn calculate_uses_configured_slabs() {
        let config = SalaryTaxConfig {
            block_tax_rate: dec!(0.05),
            ..Default::default()
        };
        let worksheet = SalaryTaxWorksheet::new(config).unwrap();
        let input = SalaryTaxInput {
            flying_allowance_or_block_income: dec!(100000),
            ..Default::default()
        };

        let result = worksheet.calculate(&input);

        assert_eq!(result.block_tax, dec!(5000));
    }
}
