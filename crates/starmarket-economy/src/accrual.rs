//! Income, consumption, decay, reserve targets, and local price drift.
//!
//! All five effects are computed on the unsnapped running value of each row
//! and snapped once at the end, matching how a batch of `n` ticks is meant
//! to behave like `n` single ticks for the linear terms.

use rust_decimal::Decimal;
use starmarket_catalog::PlanetProfile;
use starmarket_types::quantity::{clamp01, compound, per_ticks, power, scale, snap_amount, snap_price};
use starmarket_types::{ResourceRole, ResourceState, SimulationConstants};

use crate::ledger::Ledger;

/// Reserve levels derived for one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reserve {
    /// Level the planet wants to hold.
    pub target: Decimal,
    /// Level below which stock is critical.
    pub warning: Decimal,
}

/// Reserve for an ordinary consumed resource.
///
/// Zero unless consumption and the full horizon are both positive.
pub fn consumption_reserve(consumption: Decimal, constants: &SimulationConstants) -> Reserve {
    let full = constants.reserve_ticks_ahead;
    let short = constants.reserve_penalty_ticks_ahead;
    if consumption <= Decimal::ZERO || full <= Decimal::ZERO {
        return Reserve::default();
    }
    Reserve {
        target: scale(consumption, full),
        warning: if short > Decimal::ZERO {
            scale(consumption, short)
        } else {
            Decimal::ZERO
        },
    }
}

/// Reserve for a population resource with a positive need baseline.
///
/// `need * (1 + (1 - f^h))` with `f = 1 - decay`. Faster decay yields a
/// larger buffer.
pub fn population_reserve(need: Decimal, constants: &SimulationConstants) -> Reserve {
    let survival = Decimal::ONE.saturating_sub(clamp01(constants.population_decay_per_tick));
    let buffered = |horizon: Decimal| {
        let lost = Decimal::ONE.saturating_sub(power(survival, horizon.max(Decimal::ZERO)));
        scale(need, Decimal::ONE.saturating_add(lost))
    };
    Reserve {
        target: buffered(constants.reserve_ticks_ahead),
        warning: buffered(constants.reserve_penalty_ticks_ahead),
    }
}

/// Drift a price toward scarcity or surplus.
///
/// Only resources with a positive target move: at or above target the price
/// falls by the decrease rate per tick, below it rises by the increase rate.
pub fn drift_price(
    price: Decimal,
    amount: Decimal,
    target: Decimal,
    ticks: u64,
    constants: &SimulationConstants,
) -> Decimal {
    if target <= Decimal::ZERO {
        return price;
    }
    let decrease = constants.price_decrease_per_tick;
    let increase = constants.price_increase_per_tick;
    if amount >= target {
        if decrease > Decimal::ZERO {
            return compound(price, Decimal::ONE.saturating_sub(clamp01(decrease)), ticks);
        }
    } else if increase > Decimal::ZERO {
        return compound(price, Decimal::ONE.saturating_add(clamp01(increase)), ticks);
    }
    price
}

fn decay(value: Decimal, rate: Decimal, ticks: u64) -> Decimal {
    if rate <= Decimal::ZERO {
        return value;
    }
    compound(value, Decimal::ONE.saturating_sub(clamp01(rate)), ticks)
}

/// Advance one resource row by `ticks`.
pub fn accrue_row(
    row: &mut ResourceState,
    profile: &PlanetProfile,
    ticks: u64,
    constants: &SimulationConstants,
) {
    let step = constants.granularity();
    let id = row.id.as_str();
    let mut value = row.current_amount;
    let mut price = row.effective_price();
    let mut reserve = Reserve::default();

    if let Some(&income) = profile.income.get(id) {
        value = value.saturating_add(per_ticks(income, ticks));
    }
    if let Some(&consumption) = profile.consumption.get(id) {
        value = value.saturating_sub(per_ticks(consumption, ticks));
        reserve = consumption_reserve(consumption, constants);
    }

    match row.role {
        ResourceRole::Currency => {
            value = decay(value, constants.credit_decay_per_tick, ticks);
        }
        ResourceRole::Population => {
            value = decay(value, constants.population_decay_per_tick, ticks);
            if let Some(&need) = profile.need_anytime.get(id).filter(|need| **need > Decimal::ZERO) {
                reserve = population_reserve(need, constants);
            }
        }
        ResourceRole::Ordinary => {}
    }

    if !row.role.is_price_pinned() {
        price = drift_price(price, value, reserve.target, ticks, constants);
    }

    row.current_amount = snap_amount(value, step);
    row.target_amount = snap_amount(reserve.target, step);
    row.warning_amount = snap_amount(reserve.warning, step);
    row.current_price = if row.role.is_price_pinned() {
        row.base_price
    } else {
        snap_price(price, step)
    };
}

/// Advance every row of a ledger by `ticks`.
pub fn accrue(ledger: &mut Ledger, profile: &PlanetProfile, ticks: u64, constants: &SimulationConstants) {
    for row in ledger.rows_mut() {
        accrue_row(row, profile, ticks, constants);
    }
}
