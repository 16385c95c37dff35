//! [`PlanetEconomy`]: one planet's ledger, slots, and tick entry point.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use starmarket_catalog::{PlanetProfile, PlanetRecord, RecipeCatalog, ResourceCatalog};
use starmarket_types::quantity::{snap_amount, snap_price};
use starmarket_types::{
    PlanetHandle, PlanetId, PlanetSnapshot, ProcessSlot, ResourceId, ResourceState,
    SimulationConstants,
};
use tracing::{debug, warn};

use crate::accrual::accrue;
use crate::ledger::Ledger;
use crate::production::{complete_processes, schedule_processes};

/// Allowed price range for one resource, `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBand {
    /// Lowest allowed local price.
    pub min: Decimal,
    /// Highest allowed local price.
    pub max: Decimal,
}

/// What happened to one planet during a tick batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanetTickReport {
    /// Recipes that delivered their outputs.
    pub completed: u32,
    /// Recipes started.
    pub started: u32,
}

/// The economy of a single planet.
#[derive(Debug, Clone)]
pub struct PlanetEconomy {
    handle: PlanetHandle,
    planet_id: PlanetId,
    ledger: Ledger,
    slots: Vec<ProcessSlot>,
    profile: Option<PlanetProfile>,
}

impl PlanetEconomy {
    /// Build a planet economy from its catalog record.
    ///
    /// Every catalog resource gets a row; start amounts are snapped and
    /// prices start at the base price. Start entries naming unknown
    /// resources are ignored. A record without a profile yields an
    /// uninitialized planet whose ticks do nothing.
    pub fn new(
        handle: PlanetHandle,
        planet_id: PlanetId,
        record: &PlanetRecord,
        resources: &ResourceCatalog,
        constants: &SimulationConstants,
    ) -> Self {
        let step = constants.granularity();
        let ledger = Ledger::new(resources.iter().map(|definition| {
            let start = snap_amount(
                record
                    .start_resources
                    .get(&definition.id)
                    .copied()
                    .unwrap_or(Decimal::ZERO),
                step,
            );
            ResourceState {
                id: definition.id.clone(),
                name: definition.name.clone(),
                role: definition.role,
                start_amount: start,
                current_amount: start,
                target_amount: Decimal::ZERO,
                warning_amount: Decimal::ZERO,
                base_price: definition.base_cost,
                current_price: definition.base_cost,
            }
        }));

        for unknown in record
            .start_resources
            .keys()
            .filter(|id| resources.get(id.as_str()).is_none())
        {
            debug!(planet = %planet_id, resource = %unknown, "start resource not in catalog, ignored");
        }

        let slots = record
            .profile
            .iter()
            .flat_map(|profile| &profile.slots)
            .map(|spec| ProcessSlot::idle(spec.slot_type.clone(), spec.penalty_percent))
            .collect();

        if record.profile.is_none() {
            warn!(
                planet = %planet_id,
                planet_type = %record.planet_type,
                "planet has no planet-type profile and will not tick"
            );
        }

        Self {
            handle,
            planet_id,
            ledger,
            slots,
            profile: record.profile.clone(),
        }
    }

    /// Runtime handle.
    pub const fn handle(&self) -> PlanetHandle {
        self.handle
    }

    /// Catalog id.
    pub const fn planet_id(&self) -> &PlanetId {
        &self.planet_id
    }

    /// Whether the planet has a profile and therefore ticks.
    pub const fn is_initialized(&self) -> bool {
        self.profile.is_some()
    }

    /// Resource rows in catalog order.
    pub fn resources(&self) -> &[ResourceState] {
        self.ledger.rows()
    }

    /// Production slots in expansion order.
    pub fn slots(&self) -> &[ProcessSlot] {
        &self.slots
    }

    /// Look up one resource row.
    pub fn resource(&self, id: &str) -> Option<&ResourceState> {
        self.ledger.get(id)
    }

    /// Copy the planet's state for display.
    pub fn snapshot(&self) -> PlanetSnapshot {
        PlanetSnapshot {
            handle: self.handle,
            planet_id: self.planet_id.clone(),
            initialized: self.is_initialized(),
            resources: self.ledger.rows().to_vec(),
            slots: self.slots.clone(),
        }
    }

    /// Override the local price of a non-currency resource (snapped).
    ///
    /// Returns `false` for untracked or price-pinned resources.
    pub fn set_price(&mut self, id: &str, price: Decimal, constants: &SimulationConstants) -> bool {
        match self.ledger.get_mut(id) {
            Some(row) if !row.role.is_price_pinned() => {
                row.current_price = snap_price(price, constants.granularity());
                true
            }
            _ => false,
        }
    }

    /// Advance the planet by `ticks` ticks.
    ///
    /// Completion, scheduling, then accrual. Uninitialized planets and empty
    /// batches are no-ops.
    pub fn on_tick(
        &mut self,
        ticks: u64,
        recipes: &RecipeCatalog,
        constants: &SimulationConstants,
    ) -> PlanetTickReport {
        let Some(profile) = self.profile.as_ref() else {
            return PlanetTickReport::default();
        };
        if ticks == 0 || self.ledger.is_empty() {
            return PlanetTickReport::default();
        }
        // A profile with neither income nor consumption still runs production.

        let step = constants.granularity();
        let completed = complete_processes(&mut self.ledger, &mut self.slots, ticks, recipes, step);
        let started = schedule_processes(
            &mut self.ledger,
            &mut self.slots,
            recipes,
            constants.max_processes_per_tick,
            step,
        );
        accrue(&mut self.ledger, profile, ticks, constants);

        debug!(planet = %self.planet_id, ticks, completed, started, "planet ticked");
        PlanetTickReport { completed, started }
    }

    /// Clamp local prices into their galactic bands.
    ///
    /// Price-pinned resources and resources without a band are untouched.
    /// Clamped prices are not re-snapped, so applying the same bands twice
    /// changes nothing. Returns the number of prices moved.
    pub fn clamp_prices(&mut self, bands: &BTreeMap<ResourceId, PriceBand>) -> usize {
        let mut moved: usize = 0;
        for row in self.ledger.rows_mut() {
            if row.role.is_price_pinned() {
                continue;
            }
            let Some(band) = bands.get(&row.id) else {
                continue;
            };
            let clamped = row.current_price.clamp(band.min, band.max);
            if clamped != row.current_price {
                row.current_price = clamped;
                moved = moved.saturating_add(1);
            }
        }
        moved
    }
}
