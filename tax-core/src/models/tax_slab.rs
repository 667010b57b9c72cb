//! Progressive slab schedule for salaried income.
//!
//! A schedule is an ordered list of cumulative marginal brackets. Each slab
//! carries the tax already owed on everything below it (`base_tax`) and the
//! marginal rate applied to the excess over `min_income`.
//!
//! | Slab | Income range (PKR)        | Tax                                   |
//! |------|---------------------------|---------------------------------------|
//! | 1    | 0 – 600,000               | 0                                     |
//! | 2    | 600,000 – 1,200,000       | 5% of excess over 600,000             |
//! | 3    | 1,200,000 – 2,200,000     | 30,000 + 15% of excess over 1,200,000 |
//! | 4    | 2,200,000 – 3,200,000     | 180,000 + 25% of excess over 2,200,000|
//! | 5    | 3,200,000 – 4,100,000     | 430,000 + 30% of excess over 3,200,000|
//! | 6    | above 4,100,000           | 700,000 + 35% of excess over 4,100,000|

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::round_half_up;

/// A single bracket of a [`SlabSchedule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSlab {
    /// Exclusive lower bound of the slab.
    pub min_income: Decimal,
    /// Inclusive upper bound, or `None` for the top slab.
    pub max_income: Option<Decimal>,
    /// Tax owed on income up to `min_income`.
    pub base_tax: Decimal,
    /// Marginal rate on the excess over `min_income`, as a fraction.
    pub rate: Decimal,
}

impl TaxSlab {
    fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income > self.min_income && self.max_income.is_none_or(|max| income <= max)
    }
}

/// Errors raised when a slab list does not form a usable schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlabScheduleError {
    #[error("slab schedule is empty")]
    Empty,

    #[error("first slab must start at 0, got {0}")]
    FirstSlabNotAtZero(Decimal),

    #[error("slab {index} starts at {found}, expected {expected}")]
    Gap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("slab {index} has an empty income range")]
    EmptyRange { index: usize },

    #[error("slab {index} is unbounded but is not the last slab")]
    UnboundedBeforeEnd { index: usize },

    #[error("last slab must be unbounded")]
    LastSlabBounded,

    #[error("slab {index} rate must be between 0 and 1, got {rate}")]
    InvalidRate { index: usize, rate: Decimal },

    #[error("slab {index} base tax must be non-negative, got {base_tax}")]
    NegativeBaseTax { index: usize, base_tax: Decimal },

    /// `base_tax` is not the tax owed at the slab's lower bound.
    #[error("slab {index} base tax must be {expected}, got {found}")]
    BaseTaxMismatch {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },
}

/// A validated, contiguous list of [`TaxSlab`]s covering every income.
///
/// Construction goes through [`SlabSchedule::new`] (or serde, which calls it),
/// so a schedule in hand always has a slab for any positive income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxSlab>", into = "Vec<TaxSlab>")]
pub struct SlabSchedule {
    slabs: Vec<TaxSlab>,
}

impl SlabSchedule {
    /// Validates `slabs` and wraps them into a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`SlabScheduleError`] if the list is empty, does not start at
    /// zero, has gaps or overlaps, has an unbounded slab anywhere but last,
    /// or contains a rate outside [0, 1]. Base taxes must chain: the first
    /// is zero and each later one equals the previous slab's tax at its
    /// upper bound, rounded half-up to two places.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::{SlabSchedule, SlabScheduleError, TaxSlab};
    ///
    /// let result = SlabSchedule::new(vec![TaxSlab {
    ///     min_income: dec!(0),
    ///     max_income: Some(dec!(600000)),
    ///     base_tax: dec!(0),
    ///     rate: dec!(0),
    /// }]);
    ///
    /// assert_eq!(result, Err(SlabScheduleError::LastSlabBounded));
    /// ```
    pub fn new(slabs: Vec<TaxSlab>) -> Result<Self, SlabScheduleError> {
        let first = slabs.first().ok_or(SlabScheduleError::Empty)?;
        if first.min_income != Decimal::ZERO {
            return Err(SlabScheduleError::FirstSlabNotAtZero(first.min_income));
        }

        let last_index = slabs.len() - 1;
        for (index, slab) in slabs.iter().enumerate() {
            if slab.rate < Decimal::ZERO || slab.rate > Decimal::ONE {
                return Err(SlabScheduleError::InvalidRate {
                    index,
                    rate: slab.rate,
                });
            }
            if slab.base_tax < Decimal::ZERO {
                return Err(SlabScheduleError::NegativeBaseTax {
                    index,
                    base_tax: slab.base_tax,
                });
            }
            if index == 0 && !slab.base_tax.is_zero() {
                return Err(SlabScheduleError::BaseTaxMismatch {
                    index,
                    expected: Decimal::ZERO,
                    found: slab.base_tax,
                });
            }
            match slab.max_income {
                Some(max) if max <= slab.min_income => {
                    return Err(SlabScheduleError::EmptyRange { index });
                }
                Some(max) if index < last_index => {
                    let next = &slabs[index + 1];
                    if next.min_income != max {
                        return Err(SlabScheduleError::Gap {
                            index: index + 1,
                            expected: max,
                            found: next.min_income,
                        });
                    }
                    // Bounded by `max`, since every earlier base tax already chained.
                    let expected =
                        round_half_up(slab.base_tax + (max - slab.min_income) * slab.rate);
                    if next.base_tax != expected {
                        return Err(SlabScheduleError::BaseTaxMismatch {
                            index: index + 1,
                            expected,
                            found: next.base_tax,
                        });
                    }
                }
                Some(_) => return Err(SlabScheduleError::LastSlabBounded),
                None if index < last_index => {
                    return Err(SlabScheduleError::UnboundedBeforeEnd { index });
                }
                None => {}
            }
        }

        Ok(Self { slabs })
    }

    /// The FY 2025-26 salaried-individual schedule.
    pub fn fy2025_26() -> Self {
        let slab = |min: Decimal, max: Option<Decimal>, base_tax: Decimal, rate: Decimal| TaxSlab {
            min_income: min,
            max_income: max,
            base_tax,
            rate,
        };
        Self {
            slabs: vec![
                slab(dec!(0), Some(dec!(600000)), dec!(0), dec!(0)),
                slab(dec!(600000), Some(dec!(1200000)), dec!(0), dec!(0.05)),
                slab(dec!(1200000), Some(dec!(2200000)), dec!(30000), dec!(0.15)),
                slab(dec!(2200000), Some(dec!(3200000)), dec!(180000), dec!(0.25)),
                slab(dec!(3200000), Some(dec!(4100000)), dec!(430000), dec!(0.30)),
                slab(dec!(4100000), None, dec!(700000), dec!(0.35)),
            ],
        }
    }

    pub fn slabs(&self) -> &[TaxSlab] {
        &self.slabs
    }

    /// Zero-based position of the slab that `income` falls into.
    ///
    /// Zero and negative incomes belong to the first slab.
    pub fn slab_index(
        &self,
        income: Decimal,
    ) -> usize {
        self.slabs
            .iter()
            .position(|slab| slab.contains(income))
            .unwrap_or(0)
    }

    /// Cumulative slab tax on `income`, rounded half-up to two places.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::SlabSchedule;
    ///
    /// let schedule = SlabSchedule::fy2025_26();
    ///
    /// assert_eq!(schedule.tax_on(dec!(600000)), dec!(0));
    /// assert_eq!(schedule.tax_on(dec!(1500000)), dec!(75000.00));
    /// ```
    pub fn tax_on(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let slab = &self.slabs[self.slab_index(income)];
        round_half_up(slab.base_tax + (income - slab.min_income) * slab.rate)
    }
}

impl Default for SlabSchedule {
    fn default() -> Self {
        Self::fy2025_26()
    }
}

impl TryFrom<Vec<TaxSlab>> for SlabSchedule {
    type Error = SlabScheduleError;

    fn try_from(slabs: Vec<TaxSlab>) -> Result<Self, Self::Error> {
        Self::new(slabs)
    }
}

impl From<SlabSchedule> for Vec<TaxSlab> {
    fn from(schedule: SlabSchedule) -> Self {
        schedule.slabs
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn slab(
        min: Decimal,
        max: Option<Decimal>,
        base_tax: Decimal,
        rate: Decimal,
    ) -> TaxSlab {
        TaxSlab {
            min_income: min,
            max_income: max,
            base_tax,
            rate,
        }
    }

    // =========================================================================
    // SlabSchedule::new tests
    // =========================================================================

    #[test]
    fn new_accepts_default_schedule() {
        let slabs: Vec<TaxSlab> = SlabSchedule::fy2025_26().into();

        let result = SlabSchedule::new(slabs);

        assert!(result.is_ok());
    }

    #[test]
    fn new_rejects_empty_list() {
        assert_eq!(SlabSchedule::new(vec![]), Err(SlabScheduleError::Empty));
    }

    #[test]
    fn new_rejects_schedule_not_starting_at_zero() {
        let result = SlabSchedule::new(vec![slab(dec!(100), None, dec!(0), dec!(0.1))]);

        assert_eq!(result, Err(SlabScheduleError::FirstSlabNotAtZero(dec!(100))));
    }

    #[test]
    fn new_rejects_gap_between_slabs() {
        let result = SlabSchedule::new(vec![
            slab(dec!(0), Some(dec!(600000)), dec!(0), dec!(0)),
            slab(dec!(700000), None, dec!(0), dec!(0.05)),
        ]);

        assert_eq!(
            result,
            Err(SlabScheduleError::Gap {
                index: 1,
                expected: dec!(600000),
                found: dec!(700000),
            })
        );
    }

    #[test]
    fn new_rejects_discontinuous_base_tax() {
        let result = SlabSchedule::new(vec![
            slab(dec!(0), Some(dec!(600000)), dec!(0), dec!(0.05)),
            slab(dec!(600000), None, dec!(50000), dec!(0.05)),
        ]);

        assert_eq!(
            result,
            Err(SlabScheduleError::BaseTaxMismatch {
                index: 1,
                expected: dec!(30000),
                found: dec!(50000),
            })
        );
    }

    #[test]
    fn new_rejects_base_tax_that_skips_a_free_slab() {
        let result = SlabSchedule::new(vec![
            slab(dec!(0), Some(dec!(600000)), dec!(0), dec!(0)),
            slab(dec!(600000), None, dec!(50000), dec!(0.05)),
        ]);

        assert_eq!(
            result,
            Err(SlabScheduleError::BaseTaxMismatch {
                index: 1,
                expected: dec!(0),
                found: dec!(50000),
            })
        );
    }

    #[test]
    fn new_rejects_nonzero_base_tax_on_first_slab() {
        let result = SlabSchedule::new(vec![slab(dec!(0), None, Decimal::MAX, dec!(0.1))]);

        assert_eq!(
            result,
            Err(SlabScheduleError::BaseTaxMismatch {
                index: 0,
                expected: dec!(0),
                found: Decimal::MAX,
            })
        );
    }

    #[test]
    fn new_accepts_chained_base_tax_with_fractional_rate() {
        let result = SlabSchedule::new(vec![
            slab(dec!(0), Some(dec!(100001)), dec!(0), dec!(0.125)),
            slab(dec!(100001), None, dec!(12500.13), dec!(0.2)),
        ]);

        assert!(result.is_ok());
    }

    #[test]
    fn new_rejects_unbounded_slab_before_end() {
        let result = SlabSchedule::new(vec![
            slab(dec!(0), None, dec!(0), dec!(0)),
            slab(dec!(600000), None, dec!(0), dec!(0.05)),
        ]);

        assert_eq!(result, Err(SlabScheduleError::UnboundedBeforeEnd { index: 0 }));
    }

    #[test]
    fn new_rejects_empty_range() {
        let result = SlabSchedule::new(vec![
            slab(dec!(0), Some(dec!(0)), dec!(0), dec!(0)),
            slab(dec!(0), None, dec!(0), dec!(0.05)),
        ]);

        assert_eq!(result, Err(SlabScheduleError::EmptyRange { index: 0 }));
    }

    #[test]
    fn new_rejects_rate_above_one() {
        let result = SlabSchedule::new(vec![slab(dec!(0), None, dec!(0), dec!(1.5))]);

        assert_eq!(
            result,
            Err(SlabScheduleError::InvalidRate {
                index: 0,
                rate: dec!(1.5),
            })
        );
    }

    #[test]
    fn new_rejects_negative_base_tax() {
        let result = SlabSchedule::new(vec![slab(dec!(0), None, dec!(-1), dec!(0.1))]);

        assert_eq!(
            result,
            Err(SlabScheduleError::NegativeBaseTax {
                index: 0,
                base_tax: dec!(-1),
            })
        );
    }

    // =========================================================================
    // tax_on tests
    // =========================================================================

    #[test]
    fn tax_on_is_exact_at_every_boundary() {
        let schedule = SlabSchedule::fy2025_26();

        assert_eq!(schedule.tax_on(dec!(600000)), dec!(0));
        assert_eq!(schedule.tax_on(dec!(1200000)), dec!(30000));
        assert_eq!(schedule.tax_on(dec!(2200000)), dec!(180000));
        assert_eq!(schedule.tax_on(dec!(3200000)), dec!(430000));
        assert_eq!(schedule.tax_on(dec!(4100000)), dec!(700000));
    }

    #[test]
    fn tax_on_is_continuous_just_above_boundaries() {
        let schedule = SlabSchedule::fy2025_26();

        assert_eq!(schedule.tax_on(dec!(600100)), dec!(5.00));
        assert_eq!(schedule.tax_on(dec!(1200100)), dec!(30015.00));
        assert_eq!(schedule.tax_on(dec!(2200100)), dec!(180025.00));
        assert_eq!(schedule.tax_on(dec!(3200100)), dec!(430030.00));
        assert_eq!(schedule.tax_on(dec!(4100100)), dec!(700035.00));
    }

    #[test]
    fn tax_on_zero_and_negative_income_is_zero() {
        let schedule = SlabSchedule::fy2025_26();

        assert_eq!(schedule.tax_on(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(schedule.tax_on(dec!(-5000)), Decimal::ZERO);
    }

    #[test]
    fn tax_on_top_slab() {
        let schedule = SlabSchedule::fy2025_26();

        // 700,000 + 35% × 900,000
        assert_eq!(schedule.tax_on(dec!(5000000)), dec!(1015000.00));
    }

    // =========================================================================
    // slab_index tests
    // =========================================================================

    #[test]
    fn slab_index_uses_inclusive_upper_bounds() {
        let schedule = SlabSchedule::fy2025_26();

        assert_eq!(schedule.slab_index(Decimal::ZERO), 0);
        assert_eq!(schedule.slab_index(dec!(600000)), 0);
        assert_eq!(schedule.slab_index(dec!(600001)), 1);
        assert_eq!(schedule.slab_index(dec!(4100000)), 4);
        assert_eq!(schedule.slab_index(dec!(90000000)), 5);
    }

    // =========================================================================
    // serde tests
    // =========================================================================

    #[test]
    fn deserialize_validates_slabs() {
        let json = r#"[{"min_income":"100","max_income":null,"base_tax":"0","rate":"0.1"}]"#;

        let result: Result<SlabSchedule, _> = serde_json::from_str(json);

        assert!(result.is_err());
    }
}
