//! A planet's resource rows, indexed by resource id.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use starmarket_types::{ResourceId, ResourceState};
use starmarket_types::quantity::snap_amount;

/// Resource rows in catalog order with an id index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    rows: Vec<ResourceState>,
    index: BTreeMap<ResourceId, usize>,
}

impl Ledger {
    /// Build a ledger from rows. A later row with a repeated id is dropped.
    pub fn new(rows: impl IntoIterator<Item = ResourceState>) -> Self {
        let mut ledger = Self::default();
        for row in rows {
            if ledger.index.contains_key(row.id.as_str()) {
                continue;
            }
            ledger.index.insert(row.id.clone(), ledger.rows.len());
            ledger.rows.push(row);
        }
        ledger
    }

    /// Look up a row.
    pub fn get(&self, id: &str) -> Option<&ResourceState> {
        self.index.get(id).and_then(|&position| self.rows.get(position))
    }

    /// Look up a row for modification.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut ResourceState> {
        self.index
            .get(id)
            .and_then(|&position| self.rows.get_mut(position))
    }

    /// Amount held, or `None` for untracked resources.
    pub fn amount(&self, id: &str) -> Option<Decimal> {
        self.get(id).map(|row| row.current_amount)
    }

    /// Valuation price of a resource; zero when untracked.
    pub fn price_for(&self, id: &str) -> Decimal {
        self.get(id)
            .map_or(Decimal::ZERO, ResourceState::effective_price)
    }

    /// Add `delta` (possibly negative) to a tracked resource and snap.
    ///
    /// Returns `false` for untracked resources.
    pub fn adjust(&mut self, id: &str, delta: Decimal, step: Decimal) -> bool {
        let Some(row) = self.get_mut(id) else {
            return false;
        };
        row.current_amount = snap_amount(row.current_amount.saturating_add(delta), step);
        true
    }

    /// Rows in catalog order.
    pub fn rows(&self) -> &[ResourceState] {
        &self.rows
    }

    /// Rows in catalog order, mutably.
    pub fn rows_mut(&mut self) -> &mut [ResourceState] {
        &mut self.rows
    }

    /// Number of tracked resources.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no resource is tracked.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
