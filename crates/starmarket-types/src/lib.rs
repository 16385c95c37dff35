//! Shared type definitions for the Starmarket economic simulation.
//!
//! This crate is the single source of truth for the types that flow between
//! the catalog, economy, and core crates, and out to display collaborators.
//! Snapshot types are exported to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Runtime UUID handles and catalog string keys
//! - [`enums`] -- Resource roles and process slot families
//! - [`structs`] -- Resource ledger rows, process slots, market entries, snapshots
//! - [`constants`] -- [`SimulationConstants`], the versioned tunables bag
//! - [`quantity`] -- Granularity snapping and compounding on [`Decimal`]
//!
//! [`Decimal`]: rust_decimal::Decimal

pub mod constants;
pub mod enums;
pub mod ids;
pub mod quantity;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use constants::SimulationConstants;
pub use enums::{ResourceRole, SlotFamily};
pub use ids::{PlanetHandle, PlanetId, RecipeId, ResourceId, SlotType, SubscriptionId};
pub use structs::{
    GalacticPriceEntry, PlanetSnapshot, ProcessSlot, ResourceState, SimulationSnapshot,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for snapshot types.

    #[test]
    fn export_bindings() {
        // ts-rs writes the files to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::PlanetHandle::export_all();
        let _ = crate::ids::ResourceId::export_all();
        let _ = crate::ids::RecipeId::export_all();
        let _ = crate::ids::PlanetId::export_all();
        let _ = crate::ids::SlotType::export_all();

        let _ = crate::enums::ResourceRole::export_all();
        let _ = crate::enums::SlotFamily::export_all();

        let _ = crate::structs::ResourceState::export_all();
        let _ = crate::structs::ProcessSlot::export_all();
        let _ = crate::structs::GalacticPriceEntry::export_all();
        let _ = crate::structs::PlanetSnapshot::export_all();
        let _ = crate::structs::SimulationSnapshot::export_all();
    }
}
