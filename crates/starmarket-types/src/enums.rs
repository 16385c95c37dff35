//! Enumeration types for the Starmarket simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// ResourceRole
// ---------------------------------------------------------------------------

/// Economic role of a resource, which selects the decay and pricing rules
/// applied to it every tick.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceRole {
    /// Produced, consumed, and priced by supply and demand.
    #[default]
    Ordinary,
    /// The designated currency: decays exponentially, price pinned to base.
    Currency,
    /// Population class: decays exponentially, reserve from need baselines.
    Population,
}

impl ResourceRole {
    /// Whether this resource is exempt from market price dynamics.
    pub const fn is_price_pinned(self) -> bool {
        matches!(self, Self::Currency)
    }
}

// ---------------------------------------------------------------------------
// SlotFamily
// ---------------------------------------------------------------------------

/// Family of process slot a recipe can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SlotFamily {
    /// General purpose slot.
    Universal,
    /// Extraction slot.
    Mining,
    /// Population and services slot.
    Social,
    /// Manufacturing slot.
    Industrial,
    /// Research slot.
    Scientific,
}

impl SlotFamily {
    /// All families in classification priority order.
    pub const ALL: [Self; 5] = [
        Self::Universal,
        Self::Mining,
        Self::Social,
        Self::Industrial,
        Self::Scientific,
    ];

    /// Keyword matched against slot type names.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Universal => "universal",
            Self::Mining => "mining",
            Self::Social => "social",
            Self::Industrial => "industrial",
            Self::Scientific => "scientific",
        }
    }

    /// Classify a slot type name such as `PS_Mining`.
    ///
    /// The first family whose keyword occurs in the name (case-insensitive)
    /// wins. Returns `None` for names matching no family.
    pub fn classify(slot_type: &str) -> Option<Self> {
        let lowered = slot_type.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|family| lowered.contains(family.keyword()))
    }
}
