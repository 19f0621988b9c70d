//! Credit-weighted cost aggregation for bootcamps.

use rust_decimal::{Decimal, RoundingStrategy};

/// Running totals over a bootcamp's courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CreditTotals {
    /// `Σ tuition × credits`.
    pub weighted_tuition: Decimal,
    /// `Σ credits`.
    pub credits: i64,
}

impl CreditTotals {
    /// Add one course to the totals.
    #[must_use]
    pub fn with_course(self, tuition: Decimal, credits: i32) -> Self {
        Self {
            weighted_tuition: self.weighted_tuition + tuition * Decimal::from(credits),
            credits: self.credits + i64::from(credits),
        }
    }

    /// Sum a sequence of `(tuition, credits)` pairs.
    pub fn from_courses(courses: impl IntoIterator<Item = (Decimal, i32)>) -> Self {
        courses
            .into_iter()
            .fold(Self::default(), |totals, (tuition, credits)| {
                totals.with_course(tuition, credits)
            })
    }
}

/// Credit-weighted mean tuition, floored to two decimal places.
///
/// Returns `None` when there are no credits to divide by, so a bootcamp
/// without courses keeps an unset average instead of `0/0`.
///
/// ```
/// use campfinder_core::{CreditTotals, average_cost};
/// use rust_decimal::Decimal;
///
/// let totals = CreditTotals::from_courses([
///     (Decimal::from(100), 2),
///     (Decimal::from(400), 2),
/// ]);
/// assert_eq!(average_cost(totals), Some(Decimal::from(250)));
/// assert_eq!(average_cost(CreditTotals::default()), None);
/// ```
#[must_use]
pub fn average_cost(totals: CreditTotals) -> Option<Decimal> {
    if totals.credits <= 0 {
        return None;
    }

    let mean = totals.weighted_tuition / Decimal::from(totals.credits);
    Some(mean.round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity))
}
