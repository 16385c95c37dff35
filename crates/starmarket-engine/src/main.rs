//! Headless engine binary for the Starmarket simulation.
//!
//! Wires the catalogs, the constants table and the simulation together and
//! drives it in real time until interrupted or a tick limit is reached.
//!
//! # Startup Sequence
//!
//! 1. Load `starmarket-config.yaml` (or the path given as first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Load the resource, recipe and planet catalogs
//! 4. Build the simulation and register every catalog planet
//! 5. Run the frame loop, polling the constants file for changes
//! 6. Write the final snapshot

mod error;
mod runner;
mod summary;
mod watch;

use std::path::{Path, PathBuf};

use starmarket_catalog::CatalogSet;
use starmarket_core::{EngineConfig, JsonFileConstants, Simulation};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::summary::SummaryLogger;
use crate::watch::ConstantsWatcher;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG: &str = "starmarket-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the final
/// snapshot cannot be written.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration; logging depends on it.
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    let (config, config_found) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        config = %config_path.display(),
        found = config_found,
        "starmarket-engine starting"
    );
    if !config.engine.time_scale.is_finite() || config.engine.time_scale <= 0.0 {
        warn!(
            time_scale = config.engine.time_scale,
            "time scale is not positive, simulated time will not advance"
        );
    }

    // 3. Load catalogs relative to the configuration file.
    let base = config_path.parent().unwrap_or_else(|| Path::new(""));
    let paths = config.data.rooted_at(base);
    let catalogs = CatalogSet::load(&paths, &config.roles);

    // 4. Build the simulation.
    let constants = JsonFileConstants::new(&paths.constants);
    let mut simulation = Simulation::from_catalogs(catalogs, Box::new(constants));
    simulation.subscribe(Box::new(SummaryLogger::new(
        config.engine.summary_interval_ticks,
    )));
    info!(
        planets = simulation.planets().count(),
        initialized = simulation.planets().filter(|p| p.is_initialized()).count(),
        constants_version = simulation.constants().version,
        "simulation assembled, entering frame loop"
    );

    // 5. Run.
    let watcher = ConstantsWatcher::new(&paths.constants);
    let outcome = runner::run(&mut simulation, &config.engine, Some(watcher)).await;

    // 6. Final snapshot.
    if let Some(path) = &config.engine.snapshot_path {
        runner::write_snapshot(&simulation, path).await?;
    }

    info!(
        reason = ?outcome.reason,
        elapsed_ticks = outcome.elapsed_ticks,
        "starmarket-engine shutdown complete"
    );
    Ok(())
}

/// Load the engine configuration, falling back to defaults when the file
/// does not exist. The flag reports whether the file was found.
fn load_config(path: &Path) -> Result<(EngineConfig, bool), EngineError> {
    if path.exists() {
        Ok((EngineConfig::from_file(path)?, true))
    } else {
        Ok((EngineConfig::default(), false))
    }
}
