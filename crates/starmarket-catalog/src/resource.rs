//! Resource catalog: every tradable resource and its economic role.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use starmarket_types::{ResourceId, ResourceRole};
use tracing::warn;

/// One row of `resources.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceRecord {
    /// Resource id.
    pub id: ResourceId,
    /// Display name; defaults to the id.
    #[serde(default)]
    pub name: Option<String>,
    /// Base price.
    #[serde(default)]
    pub base_cost: Decimal,
    /// Explicit role; overrides [`ResourceRoles`].
    #[serde(default)]
    pub role: Option<ResourceRole>,
}

/// Role assignment applied to resources whose record has no explicit role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceRoles {
    /// The currency resource.
    #[serde(default = "default_currency")]
    pub currency: Option<ResourceId>,
    /// Population-class resources.
    #[serde(default = "default_population")]
    pub population: Vec<ResourceId>,
}

fn default_currency() -> Option<ResourceId> {
    Some(ResourceId::from("PR_Credits"))
}

fn default_population() -> Vec<ResourceId> {
    vec![ResourceId::from("PR_Workers"), ResourceId::from("PR_Engineers")]
}

impl Default for ResourceRoles {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            population: default_population(),
        }
    }
}

impl ResourceRoles {
    /// Role assigned to `id` by this table.
    pub fn role_of(&self, id: &ResourceId) -> ResourceRole {
        if self.currency.as_ref() == Some(id) {
            ResourceRole::Currency
        } else if self.population.contains(id) {
            ResourceRole::Population
        } else {
            ResourceRole::Ordinary
        }
    }
}

/// A resolved catalog resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDefinition {
    /// Resource id.
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// Base price (never negative).
    pub base_cost: Decimal,
    /// Economic role.
    pub role: ResourceRole,
}

/// Every tradable resource, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceCatalog {
    resources: Vec<ResourceDefinition>,
    index: BTreeMap<ResourceId, usize>,
}

impl ResourceCatalog {
    /// Build the catalog from table rows.
    ///
    /// Rows with a blank id are skipped. A duplicate id replaces the earlier
    /// definition but keeps its position.
    pub fn from_records(records: Vec<ResourceRecord>, roles: &ResourceRoles) -> Self {
        let mut catalog = Self::default();
        for record in records {
            if record.id.as_str().trim().is_empty() {
                warn!("skipping resource with blank id");
                continue;
            }
            if record.base_cost < Decimal::ZERO {
                warn!(resource = %record.id, base_cost = %record.base_cost, "negative base cost clamped to zero");
            }
            let definition = ResourceDefinition {
                role: record.role.unwrap_or_else(|| roles.role_of(&record.id)),
                name: record.name.unwrap_or_else(|| record.id.to_string()),
                base_cost: record.base_cost.max(Decimal::ZERO),
                id: record.id,
            };
            catalog.insert(definition);
        }
        catalog
    }

    fn insert(&mut self, definition: ResourceDefinition) {
        if let Some(slot) = self
            .index
            .get(&definition.id)
            .and_then(|&position| self.resources.get_mut(position))
        {
            warn!(resource = %definition.id, "duplicate resource id, later row wins");
            *slot = definition;
            return;
        }
        self.index
            .insert(definition.id.clone(), self.resources.len());
        self.resources.push(definition);
    }

    /// Look up a resource by id.
    pub fn get(&self, id: &str) -> Option<&ResourceDefinition> {
        self.index
            .get(id)
            .and_then(|&position| self.resources.get(position))
    }

    /// Iterate resources in table order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources.iter()
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the catalog has no resources.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn record(id: &str, base_cost: Decimal) -> ResourceRecord {
        ResourceRecord {
            id: ResourceId::from(id),
            name: None,
            base_cost,
            role: None,
        }
    }

    #[test]
    fn roles_come_from_assignment_table() {
        let catalog = ResourceCatalog::from_records(
            vec![
                record("PR_Credits", dec!(1)),
                record("PR_Workers", dec!(2)),
                record("PR_Ore", dec!(3)),
            ],
            &ResourceRoles::default(),
        );
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("PR_Credits").map(|r| r.role), Some(ResourceRole::Currency));
        assert_eq!(catalog.get("PR_Workers").map(|r| r.role), Some(ResourceRole::Population));
        assert_eq!(catalog.get("PR_Ore").map(|r| r.role), Some(ResourceRole::Ordinary));
    }

    #[test]
    fn explicit_role_overrides_assignment() {
        let mut gold = record("PR_Gold", dec!(9));
        gold.role = Some(ResourceRole::Currency);
        let roles = ResourceRoles {
            currency: None,
            population: Vec::new(),
        };
        let catalog = ResourceCatalog::from_records(vec![gold], &roles);
        assert_eq!(catalog.get("PR_Gold").map(|r| r.role), Some(ResourceRole::Currency));
    }

    #[test]
    fn duplicates_replace_in_place() {
        let catalog = ResourceCatalog::from_records(
            vec![record("PR_Ore", dec!(1)), record("PR_Ice", dec!(2)), record("PR_Ore", dec!(5))],
            &ResourceRoles::default(),
        );
        let ids: Vec<&str> = catalog.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["PR_Ore", "PR_Ice"]);
        assert_eq!(catalog.get("PR_Ore").map(|r| r.base_cost), Some(dec!(5)));
    }

    #[test]
    fn blank_ids_and_negative_costs_are_sanitized() {
        let catalog = ResourceCatalog::from_records(
            vec![record(" ", dec!(1)), record("PR_Ore", dec!(-4))],
            &ResourceRoles::default(),
        );
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("PR_Ore").map(|r| r.base_cost), Some(Decimal::ZERO));
        assert_eq!(catalog.get("PR_Ore").map(|r| r.name.as_str()), Some("PR_Ore"));
    }
}
