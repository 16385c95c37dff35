//! Tick observers: explicit subscribers notified after every emission.

use starmarket_types::SubscriptionId;

use crate::simulation::Simulation;
use crate::tick::TickSummary;

/// Callback invoked after each clock emission completes.
///
/// Observers run after the market phase, so the simulation they see is
/// fully consistent. Any closure `FnMut(&TickSummary, &Simulation) + Send`
/// is an observer.
pub trait TickObserver: Send {
    /// Called once per emission with its summary and the settled simulation.
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation);
}

impl<F> TickObserver for F
where
    F: FnMut(&TickSummary, &Simulation) + Send,
{
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation) {
        self(summary, simulation);
    }
}

/// Observers in subscription order.
#[derive(Default)]
pub struct ObserverRegistry {
    entries: Vec<(SubscriptionId, Box<dyn TickObserver>)>,
}

impl core::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("subscribers", &self.entries.len())
            .finish()
    }
}

impl ObserverRegistry {
    /// Add an observer and return its subscription id.
    pub fn subscribe(&mut self, observer: Box<dyn TickObserver>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.entries.push((id, observer));
        id
    }

    /// Remove an observer. Returns `false` if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Notify every observer in subscription order.
    pub fn notify(&mut self, summary: &TickSummary, simulation: &Simulation) {
        for (_, observer) in &mut self.entries {
            observer.on_tick(summary, simulation);
        }
    }
}
