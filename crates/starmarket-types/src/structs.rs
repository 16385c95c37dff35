//! Core data structures shared across the simulation.
//!
//! These rows are owned by the economy and core crates at runtime and are
//! copied into [`PlanetSnapshot`] / [`SimulationSnapshot`] for display
//! collaborators. All amounts and prices are [`Decimal`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::ResourceRole;
use crate::ids::{PlanetHandle, PlanetId, RecipeId, ResourceId, SlotType};

// ---------------------------------------------------------------------------
// Resource ledger
// ---------------------------------------------------------------------------

/// One row of a planet's resource ledger.
///
/// `target_amount` and `warning_amount` are derived every tick from the
/// planet's consumption and need baselines. `current_price` drifts under
/// supply and demand; `base_price` never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceState {
    /// Catalog id of the resource.
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// Economic role (ordinary, currency, population).
    pub role: ResourceRole,
    /// Amount the planet started with.
    #[ts(as = "String")]
    pub start_amount: Decimal,
    /// Amount currently held (never negative).
    #[ts(as = "String")]
    pub current_amount: Decimal,
    /// Reserve level the planet wants to hold.
    #[ts(as = "String")]
    pub target_amount: Decimal,
    /// Critical reserve level.
    #[ts(as = "String")]
    pub warning_amount: Decimal,
    /// Static catalog price.
    #[ts(as = "String")]
    pub base_price: Decimal,
    /// Local dynamic price (never negative).
    #[ts(as = "String")]
    pub current_price: Decimal,
}

impl ResourceState {
    /// Price used when valuing this resource: the current price when
    /// positive, otherwise the base price.
    pub fn effective_price(&self) -> Decimal {
        if self.current_price > Decimal::ZERO {
            self.current_price
        } else {
            self.base_price
        }
    }

    /// Whether the holding has fallen below the warning level.
    pub fn is_critical(&self) -> bool {
        self.warning_amount > Decimal::ZERO && self.current_amount < self.warning_amount
    }
}

// ---------------------------------------------------------------------------
// Production slots
// ---------------------------------------------------------------------------

/// A production slot that runs at most one recipe at a time.
///
/// `ticks_remaining > 0` exactly when `recipe` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProcessSlot {
    /// Slot type name (e.g. `PS_Mining`).
    pub slot_type: SlotType,
    /// Input cost multiplier in percent (100 = nominal).
    #[ts(as = "String")]
    pub penalty_percent: Decimal,
    /// Recipe currently running, if any.
    pub recipe: Option<RecipeId>,
    /// Ticks until the running recipe completes.
    pub ticks_remaining: u64,
}

impl ProcessSlot {
    /// Create an idle slot.
    pub const fn idle(slot_type: SlotType, penalty_percent: Decimal) -> Self {
        Self {
            slot_type,
            penalty_percent,
            recipe: None,
            ticks_remaining: 0,
        }
    }

    /// Whether a recipe is running in this slot.
    pub const fn is_busy(&self) -> bool {
        self.recipe.is_some()
    }

    /// Multiplier applied to recipe inputs started in this slot.
    ///
    /// A non-positive penalty falls back to nominal cost.
    pub fn input_multiplier(&self) -> Decimal {
        if self.penalty_percent <= Decimal::ZERO {
            return Decimal::ONE;
        }
        self.penalty_percent
            .checked_div(Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ONE)
    }

    /// Occupy the slot with `recipe` for `duration` ticks (at least one).
    pub fn start(&mut self, recipe: RecipeId, duration: u64) {
        self.recipe = Some(recipe);
        self.ticks_remaining = duration.max(1);
    }

    /// Return the slot to idle.
    pub fn clear(&mut self) {
        self.recipe = None;
        self.ticks_remaining = 0;
    }
}

// ---------------------------------------------------------------------------
// Galactic market
// ---------------------------------------------------------------------------

/// Galaxy-wide smoothed price of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GalacticPriceEntry {
    /// Catalog id of the resource.
    pub resource_id: ResourceId,
    /// Smoothed price before the most recent aggregation.
    #[ts(as = "String")]
    pub last_price: Decimal,
    /// Smoothed price after the most recent aggregation.
    #[ts(as = "String")]
    pub current_price: Decimal,
}

impl GalacticPriceEntry {
    /// An entry that has never been sampled.
    pub const fn unsampled(resource_id: ResourceId) -> Self {
        Self {
            resource_id,
            last_price: Decimal::ZERO,
            current_price: Decimal::ZERO,
        }
    }

    /// Price that anchors the band: current when positive, else last.
    ///
    /// `None` when neither is positive.
    pub fn reference_price(&self) -> Option<Decimal> {
        if self.current_price > Decimal::ZERO {
            Some(self.current_price)
        } else if self.last_price > Decimal::ZERO {
            Some(self.last_price)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Read-only copy of one planet's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlanetSnapshot {
    /// Runtime handle.
    pub handle: PlanetHandle,
    /// Catalog id of the planet.
    pub planet_id: PlanetId,
    /// False when the planet had no planet-type profile and never ticks.
    pub initialized: bool,
    /// Resource ledger in catalog order.
    pub resources: Vec<ResourceState>,
    /// Production slots in expansion order.
    pub slots: Vec<ProcessSlot>,
}

/// Read-only copy of the whole simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationSnapshot {
    /// Wall-clock time the snapshot was taken.
    pub captured_at: DateTime<Utc>,
    /// Ticks elapsed since the simulation was created.
    pub elapsed_ticks: u64,
    /// Version of the constants snapshot in effect.
    pub constants_version: u64,
    /// Planets in registration order.
    pub planets: Vec<PlanetSnapshot>,
    /// Galactic price entries in catalog order.
    pub galactic_prices: Vec<GalacticPriceEntry>,
}
