//! Integer-cents money arithmetic.
//!
//! Every monetary total inside the system is computed in integer cents;
//! conversion to dollars happens only at the display boundary. Accumulating
//! the dollar floats instead would drift, which is the failure mode this
//! module exists to prevent.

/// Correction added before rounding so that binary representation error in
/// two-decimal inputs (4.15 stored as 4.1499…) cannot pull the result down a
/// cent.
const CENTS_EPSILON: f64 = 1e-9;

/// Convert a dollar amount to integer cents, rounding half away from zero.
///
/// `dollars_to_cents(4.15) == 415`, not 414.
pub fn dollars_to_cents(amount: f64) -> i64 {
    if !amount.is_finite() {
        return 0;
    }
    let cents = ((amount.abs() + CENTS_EPSILON) * 100.0).round();
    if amount < 0.0 {
        -(cents as i64)
    } else {
        cents as i64
    }
}

/// Convert integer cents to the dollars view.
pub fn cents_to_dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Normalize a loosely-typed cents value read from storage. Non-finite input
/// is treated as zero before rounding.
pub fn sanitize_cents(raw: f64) -> i64 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round() as i64
}
