//! Planet economies for the Starmarket simulation.
//!
//! A [`PlanetEconomy`] owns one planet's resource ledger and production
//! slots and advances them by a batch of ticks:
//!
//! 1. running processes count down and deliver their outputs;
//! 2. free slots greedily start the most profitable affordable recipes;
//! 3. income, consumption, and decay are applied;
//! 4. reserve targets are recomputed;
//! 5. local prices drift toward scarcity or surplus.
//!
//! Galactic price bands are applied from outside through
//! [`PlanetEconomy::clamp_prices`].
//!
//! # Modules
//!
//! - [`ledger`] -- Resource rows indexed by id
//! - [`production`] -- Process completion and greedy scheduling
//! - [`accrual`] -- Income, consumption, decay, reserves, and price drift
//! - [`planet`] -- [`PlanetEconomy`] and [`PlanetTickReport`]

pub mod accrual;
pub mod ledger;
pub mod planet;
pub mod production;

pub use ledger::Ledger;
pub use planet::{PlanetEconomy, PlanetTickReport, PriceBand};
