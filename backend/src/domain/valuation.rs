//! Task valuation: duration plus hourly rate, with an optional multiplier
//! and flat bonus, producing an integer-cents value.

use crate::domain::money::{cents_to_dollars, dollars_to_cents};

/// Compute a task's value in cents.
///
/// A task with no usable time-value (zero/negative duration or rate, or a
/// non-finite duration) still pays its flat bonus; that is the defined edge
/// case, not a failure. Otherwise the minute-prorated rate is scaled by the
/// multiplier, rounded, and the bonus added on top.
pub fn task_value_cents(
    minutes: f64,
    hourly_rate_cents: i64,
    multiplier: f64,
    bonus_cents: i64,
) -> i64 {
    if !minutes.is_finite() || minutes <= 0.0 || hourly_rate_cents <= 0 {
        return bonus_cents;
    }
    let multiplier = if multiplier.is_finite() { multiplier } else { 1.0 };
    let base = hourly_rate_cents as f64 * minutes / 60.0;
    (base * multiplier).round() as i64 + bonus_cents
}

/// Dollars wrapper around [`task_value_cents`]: takes the hourly rate in
/// dollars and returns the value in dollars.
pub fn task_value(minutes: f64, hourly_rate: f64, multiplier: f64, bonus_cents: i64) -> f64 {
    let cents = task_value_cents(minutes, dollars_to_cents(hourly_rate), multiplier, bonus_cents);
    cents_to_dollars(cents)
}
