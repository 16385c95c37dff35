//! Process completion and greedy scheduling.
//!
//! Scheduling collects every (free slot, compatible recipe) pair the planet
//! can afford, values it at local prices, and starts the most profitable
//! pairs first. The sort is stable, so ties keep slot order and then recipe
//! table order.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use starmarket_catalog::{Recipe, RecipeCatalog};
use starmarket_types::quantity::{scale, snap_amount};
use starmarket_types::{ProcessSlot, ResourceId};
use tracing::debug;

use crate::ledger::Ledger;

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Count running processes down by `ticks` and deliver finished outputs.
///
/// Outputs naming untracked resources are dropped. A slot whose recipe has
/// left the catalog is freed without output. Returns the number of recipes
/// that delivered.
pub fn complete_processes(
    ledger: &mut Ledger,
    slots: &mut [ProcessSlot],
    ticks: u64,
    recipes: &RecipeCatalog,
    step: Decimal,
) -> u32 {
    let mut completed: u32 = 0;
    for slot in slots.iter_mut().filter(|slot| slot.is_busy()) {
        slot.ticks_remaining = slot.ticks_remaining.saturating_sub(ticks);
        if slot.ticks_remaining > 0 {
            continue;
        }

        let finished = slot.recipe.take();
        slot.clear();
        let Some(recipe_id) = finished else {
            continue;
        };
        let Some(recipe) = recipes.get(recipe_id.as_str()) else {
            debug!(recipe = %recipe_id, "running recipe no longer in catalog, slot freed");
            continue;
        };

        for (resource, &amount) in &recipe.outputs {
            if !amount.is_zero() {
                ledger.adjust(resource.as_str(), amount, step);
            }
        }
        completed = completed.saturating_add(1);
    }
    completed
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// A (slot, recipe) pair worth starting.
struct Candidate<'a> {
    profit: Decimal,
    slot: usize,
    recipe: &'a Recipe,
}

/// Whether every tracked, positive input of `inputs` is covered at
/// `multiplier` times its nominal amount.
pub fn can_afford(ledger: &Ledger, inputs: &BTreeMap<ResourceId, Decimal>, multiplier: Decimal) -> bool {
    inputs
        .iter()
        .filter(|&(_, &need)| need > Decimal::ZERO)
        .all(|(resource, &need)| {
            ledger
                .amount(resource.as_str())
                .is_none_or(|held| held >= scale(need, multiplier))
        })
}

/// Value of the outputs minus the value of the effective inputs.
///
/// Only positive prices and quantities contribute.
pub fn estimate_profit(ledger: &Ledger, recipe: &Recipe, multiplier: Decimal) -> Decimal {
    let value_of = |amounts: &BTreeMap<ResourceId, Decimal>, factor: Decimal| {
        amounts
            .iter()
            .filter(|&(_, &quantity)| quantity > Decimal::ZERO)
            .map(|(resource, &quantity)| (ledger.price_for(resource.as_str()), quantity))
            .filter(|&(price, _)| price > Decimal::ZERO)
            .fold(Decimal::ZERO, |total, (price, quantity)| {
                total.saturating_add(scale(scale(quantity, factor), price))
            })
    };
    let revenue = value_of(&recipe.outputs, Decimal::ONE);
    let cost = value_of(&recipe.inputs, multiplier);
    revenue.saturating_sub(cost)
}

fn consume(
    ledger: &mut Ledger,
    inputs: &BTreeMap<ResourceId, Decimal>,
    multiplier: Decimal,
    step: Decimal,
) {
    for (resource, &need) in inputs {
        if need <= Decimal::ZERO {
            continue;
        }
        if let Some(row) = ledger.get_mut(resource.as_str()) {
            let remaining = row.current_amount.saturating_sub(scale(need, multiplier));
            row.current_amount = snap_amount(remaining, step);
        }
    }
}

/// Start the most profitable affordable recipes in free slots.
///
/// At most `max_starts` recipes start; zero disables scheduling. Each start
/// deducts its effective inputs immediately. Returns the number started.
pub fn schedule_processes(
    ledger: &mut Ledger,
    slots: &mut [ProcessSlot],
    recipes: &RecipeCatalog,
    max_starts: u32,
    step: Decimal,
) -> u32 {
    if max_starts == 0 || recipes.is_empty() {
        return 0;
    }

    let mut candidates = Vec::new();
    for (index, slot) in slots.iter().enumerate() {
        if slot.is_busy() {
            continue;
        }
        let multiplier = slot.input_multiplier();
        for recipe in recipes.compatible_with(slot.slot_type.as_str()) {
            if !can_afford(ledger, &recipe.inputs, multiplier) {
                continue;
            }
            let profit = estimate_profit(ledger, recipe, multiplier);
            if profit > Decimal::ZERO {
                candidates.push(Candidate {
                    profit,
                    slot: index,
                    recipe,
                });
            }
        }
    }

    candidates.sort_by(|a, b| b.profit.cmp(&a.profit));

    let mut started: u32 = 0;
    for candidate in candidates {
        if started >= max_starts {
            break;
        }
        let Some(slot) = slots.get_mut(candidate.slot) else {
            continue;
        };
        if slot.is_busy() {
            continue;
        }
        let multiplier = slot.input_multiplier();
        if !can_afford(ledger, &candidate.recipe.inputs, multiplier) {
            continue;
        }

        consume(ledger, &candidate.recipe.inputs, multiplier, step);
        slot.start(candidate.recipe.id.clone(), candidate.recipe.duration_ticks);
        started = started.saturating_add(1);
        debug!(
            slot = %slot.slot_type,
            recipe = %candidate.recipe.id,
            profit = %candidate.profit,
            "process started"
        );
    }
    started
}
