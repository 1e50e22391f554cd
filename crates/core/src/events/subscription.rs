//! Scoped subscriptions

use std::fmt;
use std::rc::Weak;

use ecode_sdk::EcodeEvent;

use super::bus::BusInner;
use super::SubscriptionKey;

/// A registration that ends when this handle is dropped
///
/// The handle does not keep the bus alive; dropping it after the bus is gone
/// does nothing.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    bus: Weak<BusInner>,
    event: EcodeEvent,
    key: Option<SubscriptionKey>,
}

impl Subscription {
    pub(crate) fn new(bus: Weak<BusInner>, event: EcodeEvent, key: SubscriptionKey) -> Self {
        Self {
            bus,
            event,
            key: Some(key),
        }
    }

    /// The event this registration listens for
    pub fn event(&self) -> EcodeEvent {
        self.event
    }

    /// The underlying key, or `None` once cancelled
    pub fn key(&self) -> Option<SubscriptionKey> {
        self.key
    }

    /// Unsubscribe now
    ///
    /// # Returns
    /// `true` if the registration was still present
    pub fn cancel(&mut self) -> bool {
        let Some(key) = self.key.take() else {
            return false;
        };
        match self.bus.upgrade() {
            Some(bus) => BusInner::unsubscribe(&bus, self.event, key),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("key", &self.key)
            .finish()
    }
}
