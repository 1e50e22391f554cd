//! Event-driven finite state machines
//!
//! A machine maps each state to three behaviours (per-frame update, raw input
//! handler, on-enter hook) and each (state, event) pair to at most one
//! transition. Transitions are driven by the [`EventBus`](crate::events::EventBus):
//! building a machine registers one listener per event it reacts to, and a
//! transition only fires while the machine is in its source state. One
//! emission moves a machine at most one step, whatever its transition graph.
//!
//! # Lifecycle
//!
//! ```text
//! FsmBuilder::new → add_state* → add_transition* → build(bus, initial)
//!     → update / handle_event every frame → destroy (or drop)
//! ```
//!
//! # Example
//!
//! ```
//! use ecode_core::events::{EventBus, Payload};
//! use ecode_core::fsm::FsmBuilder;
//! use ecode_sdk::EcodeEvent;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Door { Closed, Open }
//!
//! let bus = EventBus::new();
//! let fsm = FsmBuilder::<Door, (), ()>::new("door")
//!     .add_state(Door::Closed, |_| {}, |_| {})?
//!     .add_state(Door::Open, |_| {}, |_| {})?
//!     .add_transition(Door::Closed, Door::Open, EcodeEvent::OpenDoor)?
//!     .build(&bus, Door::Closed)?;
//!
//! bus.emit(EcodeEvent::OpenDoor, Payload::new());
//! assert_eq!(fsm.state(), Door::Open);
//! # Ok::<(), ecode_core::fsm::FsmError>(())
//! ```

mod builder;
mod error;
mod machine;

pub use builder::FsmBuilder;
pub use error::{FsmError, FsmResult};
pub use machine::FiniteStateMachine;

use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use crate::events::Payload;

/// Requirements for a state identifier
///
/// Implemented automatically for any small `Copy` enum deriving the usual
/// traits.
pub trait StateId: Copy + Eq + Hash + Debug + 'static {}

impl<T: Copy + Eq + Hash + Debug + 'static> StateId for T {}

/// Per-frame update, receives the frame context
pub type UpdateFn<C> = Rc<dyn Fn(&mut C)>;

/// Raw input handler
pub type InputFn<I> = Rc<dyn Fn(&I)>;

/// On-enter hook, also used for transition side effects
pub type HookFn = Rc<dyn Fn()>;

/// The three behaviours of one state
pub(crate) struct StateHandlers<C, I> {
    pub update: UpdateFn<C>,
    pub handle_event: InputFn<I>,
    pub on_enter: HookFn,
}

/// Decides from the event payload whether a bus emission applies to a machine
pub type GuardFn = Rc<dyn Fn(&Payload) -> bool>;

/// Target, optional side effect and optional guard of a transition
pub(crate) struct Transition<S> {
    pub target: S,
    pub side_effect: Option<HookFn>,
    pub guard: Option<GuardFn>,
}
