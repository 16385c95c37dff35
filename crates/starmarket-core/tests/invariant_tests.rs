//! Randomized, seeded runs checking the invariants that must hold after
//! every emission: non-negative amounts and prices, amounts on the
//! granularity grid, single slot occupancy, the start quota, affordable
//! starts, currency exemption, and idempotent band clamping.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::collections::BTreeMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use starmarket_catalog::recipe::RecipeRecord;
use starmarket_catalog::resource::ResourceRecord;
use starmarket_catalog::{
    PlanetProfile, PlanetRecord, RecipeCatalog, ResourceCatalog, ResourceRoles, SlotSpec,
};
use starmarket_core::{Simulation, StaticConstants};
use starmarket_types::quantity::is_on_grid;
use starmarket_types::{PlanetId, RecipeId, ResourceId, ResourceRole, SimulationConstants, SlotType};

const RESOURCES: [&str; 6] = ["PR_Credits", "PR_Workers", "PR_Ore", "PR_Metal", "PR_Food", "PR_Ice"];
const SLOT_TYPES: [&str; 4] = ["PS_Mining", "PS_Industrial", "PS_Social", "PS_Universal"];

fn random_decimal(rng: &mut StdRng, max: i64, scale: u32) -> Decimal {
    Decimal::new(rng.random_range(0..=max), scale)
}

fn random_map(rng: &mut StdRng, entries: usize, max: i64) -> String {
    (0..entries)
        .map(|_| {
            let id = RESOURCES.get(rng.random_range(1..RESOURCES.len())).unwrap();
            format!("{id}:{}", random_decimal(rng, max, 1))
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn resources(rng: &mut StdRng) -> ResourceCatalog {
    let records = RESOURCES
        .iter()
        .map(|id| ResourceRecord {
            id: ResourceId::from(*id),
            name: None,
            base_cost: random_decimal(rng, 5000, 2),
            role: None,
        })
        .collect();
    ResourceCatalog::from_records(records, &ResourceRoles::default())
}

fn recipes(rng: &mut StdRng) -> RecipeCatalog {
    let records = (0..8)
        .map(|index| RecipeRecord {
            id: RecipeId::new(format!("R_{index}")),
            slot_universal: rng.random_range(0..2),
            slot_mining: rng.random_range(0..2),
            slot_social: rng.random_range(0..2),
            slot_industrial: rng.random_range(0..2),
            slot_scientific: 0,
            duration_ticks: rng.random_range(0..6),
            inputs: random_map(rng, 2, 500),
            outputs: random_map(rng, 2, 800),
        })
        .collect();
    RecipeCatalog::from_records(records)
}

fn planet(rng: &mut StdRng, index: usize) -> PlanetRecord {
    let slots = (0..rng.random_range(1..6))
        .map(|_| SlotSpec {
            slot_type: SlotType::from(*SLOT_TYPES.get(rng.random_range(0..SLOT_TYPES.len())).unwrap()),
            penalty_percent: Decimal::ONE_HUNDRED + random_decimal(rng, 60, 0),
        })
        .collect();
    let parse = starmarket_catalog::csv_map::parse_amount_map;
    PlanetRecord {
        id: PlanetId::new(format!("P_{index}")),
        planet_type: "Random".to_owned(),
        start_resources: parse(&format!("PR_Credits:1000,{}", random_map(rng, 4, 20000))),
        scale: Decimal::ONE,
        color: "#FFFFFF".to_owned(),
        profile: Some(PlanetProfile {
            slots,
            income: parse(&random_map(rng, 2, 100)),
            consumption: parse(&random_map(rng, 2, 100)),
            need_anytime: BTreeMap::from([(ResourceId::from("PR_Workers"), dec!(2000))]),
        }),
    }
}

fn build(seed: u64, constants: SimulationConstants) -> Simulation {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sim = Simulation::new(
        resources(&mut rng),
        recipes(&mut rng),
        Box::new(StaticConstants(constants)),
    );
    for index in 0..5 {
        let record = planet(&mut rng, index);
        sim.register_planet(record.id.clone(), &record);
    }
    sim.start();
    sim
}

fn fast_constants() -> SimulationConstants {
    SimulationConstants {
        seconds_per_tick: Decimal::ONE,
        average_price_collect_ticks: 3,
        max_processes_per_tick: 2,
        ..SimulationConstants::default()
    }
}

fn check_state(sim: &Simulation) {
    let step = sim.constants().granularity();
    for planet in sim.planets() {
        for row in planet.resources() {
            assert!(row.current_amount >= Decimal::ZERO, "{} negative", row.id);
            assert!(row.current_price >= Decimal::ZERO, "{} price negative", row.id);
            assert!(is_on_grid(row.current_amount, step), "{} off grid", row.id);
            assert!(is_on_grid(row.target_amount, step));
            assert!(is_on_grid(row.warning_amount, step));
            if row.role == ResourceRole::Currency {
                assert_eq!(row.current_price, row.base_price);
            }
        }
        for slot in planet.slots() {
            assert_eq!(slot.recipe.is_some(), slot.ticks_remaining > 0);
        }
    }
}

#[test]
fn invariants_hold_across_seeded_runs() {
    for seed in 0..8 {
        let mut sim = build(seed, fast_constants());
        let mut frame_rng = StdRng::seed_from_u64(seed.wrapping_add(1000));
        for _ in 0..60 {
            let frame = Duration::from_millis(frame_rng.random_range(0..2500));
            if let Some(summary) = sim.advance_clock(frame) {
                assert!(summary.tick_count >= 1);
                let quota = u64::from(sim.constants().max_processes_per_tick);
                assert!(summary.processes_started <= quota.saturating_mul(5));
            }
            check_state(&sim);
        }
    }
}

#[test]
fn starts_respect_quota_and_stock() {
    let constants = fast_constants();
    let quota = usize::try_from(constants.max_processes_per_tick).unwrap();
    let mut total_starts = 0;

    for seed in 0..6 {
        let mut sim = build(seed, constants.clone());
        let step = sim.constants().granularity();
        for _ in 0..40 {
            let before: Vec<_> = sim.planets().cloned().collect();
            let Some(summary) = sim.advance_clock(Duration::from_secs(1)) else {
                continue;
            };
            assert_eq!(summary.tick_count, 1);

            let mut emission_starts = 0;
            for (old, new) in before.iter().zip(sim.planets()) {
                // Stock available to the scheduler: pre-tick holdings plus
                // the outputs of processes completing this tick.
                let mut available: BTreeMap<ResourceId, Decimal> = old
                    .resources()
                    .iter()
                    .map(|row| (row.id.clone(), row.current_amount))
                    .collect();
                let mut required: BTreeMap<ResourceId, Decimal> = BTreeMap::new();
                let mut adjustments: u32 = 0;
                let mut starts = 0;

                for (prev, slot) in old.slots().iter().zip(new.slots()) {
                    let finished = prev
                        .recipe
                        .as_ref()
                        .filter(|_| prev.ticks_remaining == 1)
                        .and_then(|id| sim.recipes().get(id.as_str()));
                    if let Some(recipe) = finished {
                        for (id, output) in &recipe.outputs {
                            *available.entry(id.clone()).or_default() += *output;
                        }
                        adjustments += 1;
                    }

                    // A fresh start is the only way a slot holds its full duration.
                    let Some(recipe) = slot
                        .recipe
                        .as_ref()
                        .and_then(|id| sim.recipes().get(id.as_str()))
                    else {
                        continue;
                    };
                    if slot.ticks_remaining != recipe.duration_ticks {
                        continue;
                    }
                    starts += 1;
                    adjustments += 1;
                    for (id, input) in &recipe.inputs {
                        *required.entry(id.clone()).or_default() += *input * slot.input_multiplier();
                    }
                }

                assert!(starts <= quota, "{} started {starts} > {quota}", new.planet_id());
                let tolerance = step * Decimal::from(adjustments + 1);
                for (id, need) in &required {
                    let have = available.get(id).copied().unwrap_or_default();
                    assert!(
                        *need <= have + tolerance,
                        "{} started {need} {id} holding {have}",
                        new.planet_id()
                    );
                }
                emission_starts += starts;
            }
            assert_eq!(u64::try_from(emission_starts).unwrap(), summary.processes_started);
            total_starts += emission_starts;
        }
    }
    assert!(total_starts > 0);
}

#[test]
fn band_clamp_is_idempotent() {
    let mut sim = build(7, fast_constants());
    for _ in 0..3 {
        sim.advance_clock(Duration::from_secs(1));
    }
    let bands = sim.market().bands(sim.resources(), sim.constants());
    assert!(!bands.is_empty());

    let mut planets: Vec<_> = sim.planets().cloned().collect();
    for planet in &mut planets {
        planet.clamp_prices(&bands);
        let settled = planet.snapshot();
        assert_eq!(planet.clamp_prices(&bands), 0);
        assert_eq!(planet.snapshot(), settled);
    }
}

#[test]
fn collected_prices_stay_within_band() {
    let mut sim = build(11, fast_constants());
    for _ in 0..30 {
        let Some(summary) = sim.advance_clock(Duration::from_secs(1)) else {
            continue;
        };
        if !summary.market_collected {
            continue;
        }
        let bands = sim.market().bands(sim.resources(), sim.constants());
        for planet in sim.planets() {
            for row in planet.resources() {
                if let Some(band) = bands.get(&row.id) {
                    assert!(row.current_price >= band.min && row.current_price <= band.max);
                }
            }
        }
    }
}
