//! Recipe catalog: production processes and the slots that can run them.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use starmarket_types::{RecipeId, ResourceId, SlotFamily};
use tracing::warn;

use crate::csv_map::parse_amount_map;

/// One row of `recipes.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipeRecord {
    /// Recipe id.
    pub id: RecipeId,
    /// Capacity in universal slots.
    #[serde(default)]
    pub slot_universal: i64,
    /// Capacity in mining slots.
    #[serde(default)]
    pub slot_mining: i64,
    /// Capacity in social slots.
    #[serde(default)]
    pub slot_social: i64,
    /// Capacity in industrial slots.
    #[serde(default)]
    pub slot_industrial: i64,
    /// Capacity in scientific slots.
    #[serde(default)]
    pub slot_scientific: i64,
    /// Run time in ticks; values below one are raised to one.
    #[serde(default)]
    pub duration_ticks: i64,
    /// Consumed resources as `id:amount` pairs.
    #[serde(default)]
    pub inputs: String,
    /// Produced resources as `id:amount` pairs.
    #[serde(default)]
    pub outputs: String,
}

/// A production recipe. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Recipe id.
    pub id: RecipeId,
    /// Capacity flag per slot family (positive means usable).
    pub capacity: BTreeMap<SlotFamily, i64>,
    /// Run time in ticks, at least one.
    pub duration_ticks: u64,
    /// Nominal inputs.
    pub inputs: BTreeMap<ResourceId, Decimal>,
    /// Outputs granted on completion.
    pub outputs: BTreeMap<ResourceId, Decimal>,
}

impl Recipe {
    /// Resolve a table row.
    pub fn from_record(record: RecipeRecord) -> Self {
        let capacity = BTreeMap::from([
            (SlotFamily::Universal, record.slot_universal),
            (SlotFamily::Mining, record.slot_mining),
            (SlotFamily::Social, record.slot_social),
            (SlotFamily::Industrial, record.slot_industrial),
            (SlotFamily::Scientific, record.slot_scientific),
        ]);
        Self {
            id: record.id,
            capacity,
            duration_ticks: u64::try_from(record.duration_ticks.max(1)).unwrap_or(1),
            inputs: parse_amount_map(&record.inputs),
            outputs: parse_amount_map(&record.outputs),
        }
    }

    /// Whether the recipe may run in a family of slot.
    pub fn supports(&self, family: SlotFamily) -> bool {
        self.capacity.get(&family).is_some_and(|&flag| flag > 0)
    }

    /// Whether the recipe may run in a slot named `slot_type`.
    ///
    /// Slot names matching no family are incompatible with every recipe.
    pub fn compatible_with(&self, slot_type: &str) -> bool {
        SlotFamily::classify(slot_type).is_some_and(|family| self.supports(family))
    }
}

/// All recipes in table order, indexed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
    index: BTreeMap<RecipeId, usize>,
}

impl RecipeCatalog {
    /// Build the catalog from table rows.
    ///
    /// Rows with a blank id are skipped. A duplicate id replaces the earlier
    /// recipe but keeps its position.
    pub fn from_records(records: Vec<RecipeRecord>) -> Self {
        let mut catalog = Self::default();
        for record in records {
            if record.id.as_str().trim().is_empty() {
                warn!("skipping recipe with blank id");
                continue;
            }
            catalog.insert(Recipe::from_record(record));
        }
        catalog
    }

    fn insert(&mut self, recipe: Recipe) {
        if let Some(slot) = self
            .index
            .get(&recipe.id)
            .and_then(|&position| self.recipes.get_mut(position))
        {
            warn!(recipe = %recipe.id, "duplicate recipe id, later row wins");
            *slot = recipe;
            return;
        }
        self.index.insert(recipe.id.clone(), self.recipes.len());
        self.recipes.push(recipe);
    }

    /// Look up a recipe by id.
    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.index
            .get(id)
            .and_then(|&position| self.recipes.get(position))
    }

    /// Iterate recipes in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    /// Recipes that can run in a slot named `slot_type`, in table order.
    pub fn compatible_with<'a, 's>(&'a self, slot_type: &'s str) -> impl Iterator<Item = &'a Recipe> + use<'a, 's> {
        self.recipes
            .iter()
            .filter(move |recipe| recipe.compatible_with(slot_type))
    }

    /// Number of recipes.
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the catalog has no recipes.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn smelt() -> RecipeRecord {
        RecipeRecord {
            id: RecipeId::from("R_Smelt"),
            slot_universal: 0,
            slot_mining: 1,
            slot_social: 0,
            slot_industrial: 1,
            slot_scientific: 0,
            duration_ticks: 5,
            inputs: "PR_Ore:100".to_owned(),
            outputs: "PR_Metal:80".to_owned(),
        }
    }

    #[test]
    fn compatibility_follows_family_flags() {
        let recipe = Recipe::from_record(smelt());
        assert!(recipe.compatible_with("PS_Mining"));
        assert!(recipe.compatible_with("ps_INDUSTRIAL"));
        assert!(!recipe.compatible_with("PS_Social"));
        assert!(!recipe.compatible_with("PS_Farming"));
    }

    #[test]
    fn universal_keyword_takes_priority() {
        let recipe = Recipe::from_record(smelt());
        assert!(!recipe.compatible_with("PS_UniversalMining"));
    }

    #[test]
    fn duration_is_at_least_one_tick() {
        let mut record = smelt();
        record.duration_ticks = -3;
        assert_eq!(Recipe::from_record(record).duration_ticks, 1);
    }

    #[test]
    fn maps_are_decoded() {
        let recipe = Recipe::from_record(smelt());
        assert_eq!(recipe.inputs.get("PR_Ore"), Some(&dec!(100)));
        assert_eq!(recipe.outputs.get("PR_Metal"), Some(&dec!(80)));
    }

    #[test]
    fn catalog_keeps_table_order() {
        let mut second = smelt();
        second.id = RecipeId::from("R_Refine");
        second.slot_mining = 0;
        let catalog = RecipeCatalog::from_records(vec![smelt(), second]);
        let ids: Vec<&str> = catalog.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["R_Smelt", "R_Refine"]);
        assert_eq!(catalog.compatible_with("PS_Mining").count(), 1);
        assert_eq!(catalog.compatible_with("PS_Industrial").count(), 2);
        assert!(catalog.get("R_Refine").is_some());
        assert!(catalog.get("R_Missing").is_none());
    }
}
