//! Game entities
//!
//! Everything in a level that reacts to the player implements [`Entity`].
//! The world forwards input and per-frame updates; entities talk to the rest
//! of the game through the event bus.
//!
//! ```ignore
//! use ecode_core::entities::{Boss, BossSpec, Entity, Player};
//!
//! let boss = Boss::new(&bus, BossSpec::new("Overlord", room, "two-sum"), &config.boss)?;
//! boss.update(&mut player);
//! ```

mod boss;
mod player;

pub use boss::{AttackPattern, Boss, BossSpec, BossState, PROMPT_KEY};
pub use player::{Health, Player};

use ecode_sdk::InputEvent;

/// An object the world updates once per frame
pub trait Entity {
    /// Label used in logs
    fn name(&self) -> &str;

    /// Advance one frame
    fn update(&self, player: &mut Player);

    /// React to a raw input event
    fn handle_input(&self, input: &InputEvent);

    /// False once the entity should be removed from the world
    fn is_alive(&self) -> bool;
}
