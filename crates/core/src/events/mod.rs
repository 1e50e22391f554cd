//! Game Event System
//!
//! Publish/subscribe between game systems, with delayed delivery.
//!
//! # Architecture
//!
//! ```text
//! emit ─────────────┐
//! emit_delayed → Schedule ─┐
//! RemoteEmitter → channel ─┼→ EventBus::update (once per frame) → dispatch → callbacks
//! ```
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use ecode_core::events::{EventBus, Payload};
//! use ecode_core::events::typed::CameraShake;
//! use ecode_sdk::EcodeEvent;
//!
//! let bus = EventBus::new();
//!
//! bus.subscribe_typed::<CameraShake, _>(|shake| {
//!     tracing::info!("Shaking for {}ms", shake.duration_ms);
//! });
//!
//! bus.emit_typed(&CameraShake { duration_ms: 5000, max_intensity: 10.0 });
//! bus.emit_delayed(EcodeEvent::NextLevel, Duration::from_secs(5), Payload::new());
//!
//! // Once per frame, from the game loop:
//! bus.update();
//! ```

mod bus;
mod payload;
pub mod remote;
mod schedule;
mod subscription;
pub mod typed;
mod types;

pub use bus::EventBus;
pub use payload::Payload;
pub use remote::{RemoteEmitter, RemoteError};
pub use schedule::ScheduledEvent;
pub use subscription::Subscription;
pub use types::{EventCallback, EventError, SubscriptionKey};

// Re-export common typed events
pub use typed::{
    BossHack, CameraBlackout, CameraShake, GameEvent, GiveOrder, OpenDialog, ProblemSolved,
};
