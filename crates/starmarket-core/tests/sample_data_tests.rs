//! Loads the sample tables shipped under `data/` and runs the simulation
//! built from them, including constants reloads from disk.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_decimal_macros::dec;
use starmarket_catalog::{CatalogSet, RecipeCatalog, ResourceCatalog};
use starmarket_core::{EngineConfig, JsonFileConstants, Simulation};
use starmarket_types::{ResourceId, ResourceRole, SlotType};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn sample_config() -> EngineConfig {
    EngineConfig::from_file(&workspace_root().join("starmarket-config.yaml")).unwrap()
}

fn sample_catalogs(config: &EngineConfig) -> CatalogSet {
    CatalogSet::load(&config.data.rooted_at(&workspace_root()), &config.roles)
}

#[test]
fn sample_config_parses() {
    let config = sample_config();
    assert_eq!(config.roles.currency, Some(ResourceId::from("PR_Credits")));
    assert_eq!(config.roles.population.len(), 2);
    assert_eq!(config.engine.frame_interval_ms, 100);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn sample_catalogs_load() {
    let config = sample_config();
    let catalogs = sample_catalogs(&config);

    assert_eq!(catalogs.resources.len(), 12);
    assert_eq!(catalogs.recipes.len(), 9);
    assert_eq!(catalogs.planets.len(), 4);
    assert_eq!(
        catalogs.resources.get("PR_Workers").unwrap().role,
        ResourceRole::Population
    );
    assert_eq!(catalogs.resources.get("PR_Fuel").unwrap().base_cost, dec!(4.5));

    // The blank slot type is skipped along with its count.
    let kessa = catalogs.planets.get("Planet_Kessa").unwrap();
    let slots = &kessa.profile.as_ref().unwrap().slots;
    assert_eq!(slots.len(), 6);
    let industrial: Vec<_> = slots
        .iter()
        .filter(|slot| slot.slot_type == SlotType::from("PS_Industrial"))
        .collect();
    assert_eq!(industrial.len(), 1);
    assert_eq!(industrial.first().unwrap().penalty_percent, dec!(140));

    // A planet whose type is missing loads without a profile.
    assert!(catalogs.planets.get("Planet_Orphan").unwrap().profile.is_none());
}

#[test]
fn sample_simulation_runs() {
    let config = sample_config();
    let root = workspace_root();
    let catalogs = sample_catalogs(&config);
    let constants = JsonFileConstants::new(root.join(&config.data.constants));
    let mut sim = Simulation::from_catalogs(catalogs, Box::new(constants));

    assert_eq!(sim.constants().version, 1);
    assert_eq!(sim.constants().average_price_collect_ticks, 10);
    assert_eq!(sim.planets().count(), 4);

    sim.start();
    let mut collections = 0;
    let mut started = 0;
    for _ in 0..100 {
        let summary = sim.advance_clock(Duration::from_secs(1)).unwrap();
        assert_eq!(summary.planets_ticked, 3);
        if summary.market_collected {
            collections += 1;
        }
        started += summary.processes_started;
    }

    assert_eq!(sim.clock().elapsed_ticks(), 100);
    assert_eq!(collections, 10);
    assert!(started > 0);
    assert_eq!(sim.galactic_price("PR_Credits"), Some(dec!(1)));
    assert!(sim.galactic_price("PR_Food").is_some());

    let snapshot = sim.snapshot();
    assert_eq!(snapshot.elapsed_ticks, 100);
    assert_eq!(snapshot.planets.iter().filter(|planet| !planet.initialized).count(), 1);
}

#[test]
fn constants_reload_from_disk() {
    let root = workspace_root();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("constants.json");
    std::fs::copy(root.join("data/constants.json"), &path).unwrap();

    let mut sim = Simulation::new(
        ResourceCatalog::default(),
        RecipeCatalog::default(),
        Box::new(JsonFileConstants::new(&path)),
    );
    assert_eq!(sim.clock().period(), Some(Duration::from_secs(1)));

    std::fs::write(
        &path,
        r#"[{"name": "seconds_per_tick", "value": "2.5"}, {"name": "max_processes_per_tick", "value": 1.9}]"#,
    )
    .unwrap();
    assert_eq!(sim.reload_constants().unwrap(), 2);
    assert_eq!(sim.constants().max_processes_per_tick, 1);
    assert_eq!(sim.clock().period(), Some(Duration::from_millis(2500)));

    std::fs::write(&path, "not json").unwrap();
    assert!(sim.reload_constants().is_err());
    assert_eq!(sim.constants().version, 2);
    assert_eq!(sim.constants().seconds_per_tick, dec!(2.5));
}
