use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// The minimum average a student needs to pass.
pub const PASSING_THRESHOLD: Decimal = dec!(7.0);

/// Computes the arithmetic mean of three grades, rounded to one decimal place.
///
/// Grades carry at most one decimal digit, so the unrounded mean is always a
/// multiple of 1/30 and never lands exactly on a midpoint. The strategy is
/// still pinned to away-from-zero so the result does not depend on that.
pub fn compute_average(grade1: Decimal, grade2: Decimal, grade3: Decimal) -> Decimal {
    ((grade1 + grade2 + grade3) / dec!(3))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true when `average` reaches `threshold`.
pub fn is_passing(average: Decimal, threshold: Decimal) -> bool {
    average >= threshold
}
