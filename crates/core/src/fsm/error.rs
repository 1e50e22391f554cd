//! Errors for state machine definition and dispatch

use ecode_sdk::EcodeEvent;

/// State machine errors
///
/// State identifiers are carried in their `Debug` form so the error type
/// does not depend on the state enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsmError {
    /// A state was registered twice
    #[error("State machine '{machine}' already contains state {state}")]
    DuplicateState { machine: String, state: String },

    /// A second transition was registered for the same (state, event) pair
    #[error("State machine '{machine}' already has a transition for state {state} on event '{event}'")]
    DuplicateTransition {
        machine: String,
        state: String,
        event: EcodeEvent,
    },

    /// A state was referenced before being registered
    #[error("State machine '{machine}' does not contain state {state}")]
    UnknownState { machine: String, state: String },

    /// The machine was used after `destroy`
    #[error("State machine '{machine}' has been destroyed")]
    Destroyed { machine: String },
}

/// Result type for state machine operations
pub type FsmResult<T> = Result<T, FsmError>;
