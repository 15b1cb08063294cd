use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::consent::ConsentEvent;

/// Registered broadcast callback
pub type Subscriber = Box<dyn Fn(&ConsentEvent) + Send>;

/// Observer list owned by the controller.
///
/// Publishing is synchronous and fire-and-forget: no acknowledgment, no
/// return channel, and a subscriber failure never reaches the publisher —
/// the state transition has already committed by the time it fires.
#[derive(Default)]
pub struct ConsentBus {
    subscribers: Vec<Subscriber>,
}

impl ConsentBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(&ConsentEvent) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Deliver the event to every subscriber in registration order
    pub fn publish(&self, event: &ConsentEvent) {
        for (index, subscriber) in self.subscribers.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| subscriber(event))).is_err() {
                tracing::warn!("Consent subscriber {} panicked during broadcast", index);
            }
        }
    }
}

impl std::fmt::Debug for ConsentBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsentBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
