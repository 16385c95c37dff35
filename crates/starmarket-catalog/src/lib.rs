//! Static configuration catalogs for the Starmarket simulation.
//!
//! Catalogs are loaded once from JSON tables and are read-only afterwards.
//! Comma-separated `id:amount` maps and slot lists found in those tables are
//! decoded here, so the rest of the workspace only sees typed maps.
//!
//! # Modules
//!
//! - [`csv_map`] -- Decoding of comma-separated maps, counts, and penalties
//! - [`resource`] -- [`ResourceCatalog`]: ids, names, base costs, roles
//! - [`recipe`] -- [`RecipeCatalog`]: slot compatibility, inputs, outputs
//! - [`planet`] -- [`PlanetCatalog`]: planet records joined with type profiles
//! - [`loader`] -- Tolerant JSON table loading and [`CatalogSet`]
//! - [`error`] -- [`CatalogError`]

pub mod csv_map;
pub mod error;
pub mod loader;
pub mod planet;
pub mod recipe;
pub mod resource;

pub use error::CatalogError;
pub use loader::{CatalogPaths, CatalogSet};
pub use planet::{PlanetCatalog, PlanetProfile, PlanetRecord, SlotSpec};
pub use recipe::{Recipe, RecipeCatalog};
pub use resource::{ResourceCatalog, ResourceDefinition, ResourceRoles};
