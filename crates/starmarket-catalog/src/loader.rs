//! Tolerant loading of the JSON catalog tables.
//!
//! Every table is a JSON array with one record per element. Elements are
//! decoded one at a time so a malformed record only costs that record. A
//! missing or unreadable table degrades to an empty catalog with a warning.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::CatalogError;
use crate::planet::{PlanetCatalog, PlanetRow, PlanetTypeRow};
use crate::recipe::{RecipeCatalog, RecipeRecord};
use crate::resource::{ResourceCatalog, ResourceRecord, ResourceRoles};

/// Read a JSON array table, skipping elements that fail to decode.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(path, &contents)
}

/// Decode a JSON array table held in memory. `origin` is used for diagnostics.
pub fn parse_records<T: DeserializeOwned>(
    origin: &Path,
    contents: &str,
) -> Result<Vec<T>, CatalogError> {
    let elements: Vec<serde_json::Value> =
        serde_json::from_str(contents).map_err(|source| CatalogError::Json {
            path: origin.to_path_buf(),
            source,
        })?;

    let mut records = Vec::with_capacity(elements.len());
    for (position, element) in elements.into_iter().enumerate() {
        match serde_json::from_value(element) {
            Ok(record) => records.push(record),
            Err(error) => warn!(
                table = %origin.display(),
                position,
                error = %error,
                "skipping malformed record"
            ),
        }
    }
    Ok(records)
}

/// Read a table, degrading to no records when it cannot be read at all.
pub fn load_or_empty<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    match read_records(path) {
        Ok(records) => records,
        Err(error) => {
            warn!(error = %error, "catalog unavailable, continuing with an empty table");
            Vec::new()
        }
    }
}

/// Locations of the catalog tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogPaths {
    /// Resource table.
    #[serde(default = "default_resources")]
    pub resources: PathBuf,
    /// Recipe table.
    #[serde(default = "default_recipes")]
    pub recipes: PathBuf,
    /// Planet table.
    #[serde(default = "default_planets")]
    pub planets: PathBuf,
    /// Planet type table.
    #[serde(default = "default_planet_types")]
    pub planet_types: PathBuf,
    /// Constants table.
    #[serde(default = "default_constants")]
    pub constants: PathBuf,
}

fn default_resources() -> PathBuf {
    PathBuf::from("data/resources.json")
}

fn default_recipes() -> PathBuf {
    PathBuf::from("data/recipes.json")
}

fn default_planets() -> PathBuf {
    PathBuf::from("data/planets.json")
}

fn default_planet_types() -> PathBuf {
    PathBuf::from("data/planet_types.json")
}

fn default_constants() -> PathBuf {
    PathBuf::from("data/constants.json")
}

impl Default for CatalogPaths {
    fn default() -> Self {
        Self {
            resources: default_resources(),
            recipes: default_recipes(),
            planets: default_planets(),
            planet_types: default_planet_types(),
            constants: default_constants(),
        }
    }
}

impl CatalogPaths {
    /// Resolve every relative path against `base`.
    pub fn rooted_at(&self, base: &Path) -> Self {
        let root = |path: &PathBuf| {
            if path.is_absolute() {
                path.clone()
            } else {
                base.join(path)
            }
        };
        Self {
            resources: root(&self.resources),
            recipes: root(&self.recipes),
            planets: root(&self.planets),
            planet_types: root(&self.planet_types),
            constants: root(&self.constants),
        }
    }
}

/// The three static catalogs a simulation is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSet {
    /// Resources.
    pub resources: ResourceCatalog,
    /// Recipes.
    pub recipes: RecipeCatalog,
    /// Planets joined with their types.
    pub planets: PlanetCatalog,
}

impl CatalogSet {
    /// Load every table, substituting empty tables for unreadable ones.
    pub fn load(paths: &CatalogPaths, roles: &ResourceRoles) -> Self {
        let resources =
            ResourceCatalog::from_records(load_or_empty::<ResourceRecord>(&paths.resources), roles);
        let recipes = load_recipes(&paths.recipes);
        let types = load_or_empty::<PlanetTypeRow>(&paths.planet_types);
        let planets = PlanetCatalog::join(load_or_empty::<PlanetRow>(&paths.planets), &types);

        info!(
            resources = resources.len(),
            recipes = recipes.len(),
            planet_types = types.len(),
            planets = planets.len(),
            "catalogs loaded"
        );

        Self {
            resources,
            recipes,
            planets,
        }
    }
}

/// Load the recipe table on its own, e.g. for an explicit recipe reload.
pub fn load_recipes(path: &Path) -> RecipeCatalog {
    RecipeCatalog::from_records(load_or_empty::<RecipeRecord>(path))
}
