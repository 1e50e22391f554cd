//! ecode SDK - Shared Type Definitions
//!
//! This crate contains the closed vocabularies every other crate speaks:
//! the named game events carried by the event bus, and the raw input
//! events forwarded to entities. It has no dependencies and compiles
//! quickly, allowing parallel compilation of dependent crates.
//!
//! # Modules
//!
//! - [`events`] - Named game events (`EcodeEvent`)
//! - [`input`] - Raw discrete input (`InputEvent`, `KeyCode`)

pub mod events;
pub mod input;

pub use events::EcodeEvent;
pub use input::{InputEvent, KeyCode};
