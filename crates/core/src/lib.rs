//! ecode - Core Logic
//!
//! Event bus, state machines, entities, and the level loop for the ecode
//! game.
//!
//! # Re-exports
//!
//! This crate re-exports the SDK and engine crates for convenience:
//! - [`sdk`] - Event identifiers and raw input types
//! - [`engine`] - Clocks and frame timing

use tracing::info;

// Re-export SDK and engine crates
pub use ecode_engine as engine;
pub use ecode_sdk as sdk;

pub mod config;
pub mod entities;
pub mod events;
pub mod fsm;
pub mod geometry;
pub mod world;

// Re-export commonly used items
pub use events::{EventBus, GameEvent, Payload, RemoteEmitter, Subscription, SubscriptionKey};
pub use fsm::{FiniteStateMachine, FsmBuilder, FsmError, FsmResult};

// Re-export entity and world types
pub use entities::{AttackPattern, Boss, BossSpec, BossState, Entity, Player};
pub use world::{EntityKey, Level, LevelLoader, World};

// Re-export config types
pub use config::{BossConfig, ConfigError, ConfigResult, GameConfig};

/// Log the end of a session
pub fn shutdown(world: &World) {
    info!(
        "ecode shutting down after {} frames ({} events still scheduled)",
        world.frame_count(),
        world.bus().scheduled_count()
    );
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_sdk_types_exist() {
        use crate::sdk::EcodeEvent;
        assert_eq!(EcodeEvent::from_name(EcodeEvent::KillBoss.name()), Some(EcodeEvent::KillBoss));
    }
}
