//! Event system types

use std::rc::Rc;

use ecode_sdk::EcodeEvent;
use slotmap::new_key_type;

use super::Payload;

new_key_type! {
    /// Key for a single subscription, used for removal
    pub struct SubscriptionKey;
}

/// Type alias for event callback functions
///
/// # Arguments
/// * `payload` - Keyword arguments passed to `emit`
pub type EventCallback = Rc<dyn Fn(&Payload)>;

/// Reports whether a listener's target still exists
pub(crate) type Liveness = Box<dyn Fn() -> bool>;

/// Storage for one subscription
pub(crate) struct ListenerEntry {
    pub event: EcodeEvent,
    pub callback: EventCallback,
    /// `None` for listeners that own their callback outright
    pub liveness: Option<Liveness>,
}

impl ListenerEntry {
    pub fn is_alive(&self) -> bool {
        self.liveness.as_ref().map_or(true, |alive| alive())
    }
}

/// Event system errors
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Payload did not match the shape a typed subscriber expects
    #[error("Invalid payload for event '{event}': {source}")]
    InvalidPayload {
        event: EcodeEvent,
        #[source]
        source: serde_json::Error,
    },
}
