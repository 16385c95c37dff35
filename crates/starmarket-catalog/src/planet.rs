//! Planet catalog: planet records joined with their planet-type profiles.
//!
//! A planet row names a planet type. The type row carries the slot layout
//! and the per-tick income, consumption, and population need baselines. A
//! planet whose type is missing keeps `profile: None` and never ticks.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use starmarket_types::{PlanetId, ResourceId, SlotType};
use tracing::warn;

use crate::csv_map::{parse_amount_map, parse_count, parse_penalty_percent, split_aligned};

/// Prefix applied to slot type names from the type table.
const SLOT_PREFIX: &str = "PS_";

/// Upper bound on the slots one type entry can expand to.
pub const MAX_SLOTS_PER_TYPE: i64 = 256;

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

/// One row of `planets.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanetRow {
    /// Planet id.
    pub id: PlanetId,
    /// Planet type name, joined against `planet_types.json`.
    #[serde(default)]
    pub planet_type: String,
    /// Starting stock as `id:amount` pairs.
    #[serde(default)]
    pub start_resources: String,
    /// Display scale (carried, unused by the simulation).
    #[serde(default = "default_scale")]
    pub scale: Decimal,
    /// Display color (carried, unused by the simulation).
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_scale() -> Decimal {
    Decimal::ONE
}

fn default_color() -> String {
    "#FFFFFF".to_owned()
}

/// One row of `planet_types.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlanetTypeRow {
    /// Planet type name.
    pub planet_type: String,
    /// Comma-separated slot type names (without the `PS_` prefix).
    #[serde(default)]
    pub slot_types: String,
    /// Comma-separated slot counts, aligned with `slot_types`.
    #[serde(default)]
    pub slot_counts: String,
    /// Comma-separated penalty surcharges, aligned with `slot_types`.
    #[serde(default)]
    pub slot_penalties: String,
    /// Per-tick income as `id:amount` pairs.
    #[serde(default)]
    pub income_per_tick: String,
    /// Per-tick consumption as `id:amount` pairs.
    #[serde(default)]
    pub consumption_per_tick: String,
    /// Population need baselines as `id:amount` pairs.
    #[serde(default)]
    pub need_anytime: String,
}

// ---------------------------------------------------------------------------
// Resolved records
// ---------------------------------------------------------------------------

/// One production slot of a planet type, already expanded from its count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    /// Slot type name with prefix (e.g. `PS_Mining`).
    pub slot_type: SlotType,
    /// Absolute penalty percentage (at least 100).
    pub penalty_percent: Decimal,
}

/// The economic template of a planet type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanetProfile {
    /// Expanded slots in table order.
    pub slots: Vec<SlotSpec>,
    /// Per-tick income.
    pub income: BTreeMap<ResourceId, Decimal>,
    /// Per-tick consumption.
    pub consumption: BTreeMap<ResourceId, Decimal>,
    /// Population need baselines.
    pub need_anytime: BTreeMap<ResourceId, Decimal>,
}

impl PlanetProfile {
    /// Resolve a planet type row.
    ///
    /// The aligned slot lists are walked up to the shortest of the three.
    /// Blank types and non-positive counts produce no slots. Counts above
    /// [`MAX_SLOTS_PER_TYPE`] are clamped to it.
    pub fn from_type_row(row: &PlanetTypeRow) -> Self {
        let types = split_aligned(&row.slot_types);
        let counts = split_aligned(&row.slot_counts);
        let penalties = split_aligned(&row.slot_penalties);

        let mut slots = Vec::new();
        for ((name, count), penalty) in types.iter().zip(&counts).zip(&penalties) {
            let count = parse_count(count);
            if name.is_empty() || count <= 0 {
                continue;
            }
            let count = if count > MAX_SLOTS_PER_TYPE {
                warn!(
                    planet_type = %row.planet_type,
                    slot_type = %name,
                    count,
                    max = MAX_SLOTS_PER_TYPE,
                    "slot count above limit, clamped"
                );
                MAX_SLOTS_PER_TYPE
            } else {
                count
            };
            let slot_type = SlotType::new(format!("{SLOT_PREFIX}{name}"));
            let penalty_percent = parse_penalty_percent(penalty);
            for _ in 0..count {
                slots.push(SlotSpec {
                    slot_type: slot_type.clone(),
                    penalty_percent,
                });
            }
        }

        Self {
            slots,
            income: parse_amount_map(&row.income_per_tick),
            consumption: parse_amount_map(&row.consumption_per_tick),
            need_anytime: parse_amount_map(&row.need_anytime),
        }
    }
}

/// A planet ready for registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanetRecord {
    /// Planet id.
    pub id: PlanetId,
    /// Planet type name.
    pub planet_type: String,
    /// Starting stock.
    pub start_resources: BTreeMap<ResourceId, Decimal>,
    /// Display scale.
    pub scale: Decimal,
    /// Display color.
    pub color: String,
    /// Economic template; `None` when the planet type is unknown.
    pub profile: Option<PlanetProfile>,
}

/// All planets in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanetCatalog {
    planets: Vec<PlanetRecord>,
}

impl PlanetCatalog {
    /// Join planet rows with planet type rows.
    ///
    /// Planets with a blank id are skipped. Planets whose type is missing
    /// are kept without a profile.
    pub fn join(planets: Vec<PlanetRow>, types: &[PlanetTypeRow]) -> Self {
        let profiles: BTreeMap<&str, PlanetProfile> = types
            .iter()
            .filter(|row| !row.planet_type.trim().is_empty())
            .map(|row| (row.planet_type.trim(), PlanetProfile::from_type_row(row)))
            .collect();

        let mut records = Vec::with_capacity(planets.len());
        for row in planets {
            if row.id.as_str().trim().is_empty() {
                warn!("skipping planet with blank id");
                continue;
            }
            let profile = profiles.get(row.planet_type.trim()).cloned();
            if profile.is_none() {
                warn!(planet = %row.id, planet_type = %row.planet_type, "planet type not found");
            }
            records.push(PlanetRecord {
                start_resources: parse_amount_map(&row.start_resources),
                id: row.id,
                planet_type: row.planet_type,
                scale: row.scale,
                color: row.color,
                profile,
            });
        }
        Self { planets: records }
    }

    /// Look up a planet by id.
    pub fn get(&self, id: &str) -> Option<&PlanetRecord> {
        self.planets.iter().find(|record| record.id.as_str() == id)
    }

    /// Iterate planets in table order.
    pub fn iter(&self) -> impl Iterator<Item = &PlanetRecord> {
        self.planets.iter()
    }

    /// Number of planets.
    pub fn len(&self) -> usize {
        self.planets.len()
    }

    /// Whether the catalog has no planets.
    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }
}
