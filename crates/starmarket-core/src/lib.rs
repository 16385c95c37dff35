//! Simulation clock, galactic market, tick cycle, and facade for the
//! Starmarket economic simulation.
//!
//! Collaborators interact with a single [`Simulation`]: they register
//! planets, feed it elapsed time, read snapshots, and subscribe to tick
//! summaries. Everything runs synchronously on the caller's thread.
//!
//! # Modules
//!
//! - [`clock`] -- [`SimulationClock`], time to whole-tick conversion.
//! - [`config`] -- Engine YAML configuration and the constants table.
//! - [`market`] -- [`GalacticMarket`], smoothed galaxy-wide prices and bands.
//! - [`observer`] -- [`TickObserver`] and the subscription registry.
//! - [`simulation`] -- The [`Simulation`] facade.
//! - [`tick`] -- The two-phase tick cycle and [`TickSummary`].

pub mod clock;
pub mod config;
pub mod market;
pub mod observer;
pub mod simulation;
pub mod tick;

pub use clock::SimulationClock;
pub use config::{
    ConfigError, ConstantsSource, EngineConfig, EngineSettings, JsonFileConstants, LoggingConfig,
    StaticConstants,
};
pub use market::GalacticMarket;
pub use observer::TickObserver;
pub use simulation::Simulation;
pub use tick::TickSummary;
