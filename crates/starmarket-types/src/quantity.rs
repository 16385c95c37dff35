//! Granularity snapping and compounding for resource amounts and prices.
//!
//! Every stored amount and price is a [`Decimal`] kept on a grid whose step
//! is the configured minimum granularity. Amounts and prices snap slightly
//! differently:
//!
//! - amounts: `<= 0` becomes 0, `(0, step)` becomes exactly `step`, anything
//!   else rounds to the nearest multiple of `step`;
//! - prices: `<= 0` becomes 0, anything else rounds to the nearest multiple
//!   of `step` (so a price below half a step collapses to 0).
//!
//! Rounding is midpoint-to-even. Compounding helpers saturate at
//! [`Decimal::MAX`] instead of overflowing.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

/// Snap a resource amount onto the granularity grid.
pub fn snap_amount(value: Decimal, step: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if step <= Decimal::ZERO {
        return value;
    }
    if value < step {
        return step;
    }
    round_to_step(value, step)
}

/// Snap a price onto the granularity grid.
pub fn snap_price(value: Decimal, step: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if step <= Decimal::ZERO {
        return value;
    }
    round_to_step(value, step)
}

/// Whether `value` is zero or an exact multiple of `step`.
pub fn is_on_grid(value: Decimal, step: Decimal) -> bool {
    if value.is_zero() || step <= Decimal::ZERO {
        return true;
    }
    value
        .checked_rem(step)
        .is_some_and(|remainder| remainder.is_zero())
}

fn round_to_step(value: Decimal, step: Decimal) -> Decimal {
    value
        .checked_div(step)
        .map(|steps| steps.round())
        .and_then(|steps| steps.checked_mul(step))
        .map_or(value, |snapped| snapped.normalize())
}

/// Clamp a rate into `[0, 1]`.
pub fn clamp01(rate: Decimal) -> Decimal {
    rate.clamp(Decimal::ZERO, Decimal::ONE)
}

/// Compute `value * factor^ticks` for a non-negative `factor`.
///
/// A decaying factor that underflows yields zero; growth that overflows
/// saturates at [`Decimal::MAX`].
pub fn compound(value: Decimal, factor: Decimal, ticks: u64) -> Decimal {
    if value.is_zero() {
        return Decimal::ZERO;
    }
    let Some(scale) = factor.checked_powu(ticks) else {
        return if factor < Decimal::ONE {
            Decimal::ZERO
        } else if value.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        };
    };
    value.saturating_mul(scale)
}

/// Compute `base^exponent` for a non-negative, possibly fractional exponent.
///
/// Integral exponents use exact repeated multiplication. On overflow the
/// result saturates: to zero for bases below one, to [`Decimal::MAX`]
/// otherwise.
pub fn power(base: Decimal, exponent: Decimal) -> Decimal {
    if exponent <= Decimal::ZERO {
        return Decimal::ONE;
    }
    let exact = if exponent.fract().is_zero() {
        exponent.to_u64().and_then(|whole| base.checked_powu(whole))
    } else {
        base.checked_powd(exponent)
    };
    exact.unwrap_or(if base < Decimal::ONE {
        Decimal::ZERO
    } else {
        Decimal::MAX
    })
}

/// Saturating `value * multiplier`.
pub fn scale(value: Decimal, multiplier: Decimal) -> Decimal {
    value.saturating_mul(multiplier)
}

/// Saturating `value * ticks`.
pub fn per_ticks(value: Decimal, ticks: u64) -> Decimal {
    value.saturating_mul(Decimal::from(ticks))
}
