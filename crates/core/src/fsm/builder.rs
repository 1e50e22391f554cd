//! Declarative state machine construction

use std::collections::HashMap;
use std::rc::Rc;

use ecode_sdk::EcodeEvent;

use super::error::{FsmError, FsmResult};
use super::machine::FiniteStateMachine;
use super::{GuardFn, HookFn, StateHandlers, StateId, Transition};
use crate::events::{EventBus, Payload};

/// Builder for a [`FiniteStateMachine`]
///
/// States must be added before any transition that references them. Every
/// method validates immediately, so a malformed definition fails at the
/// line that introduces the mistake.
///
/// # Type Parameters
/// * `S` - State identifier
/// * `C` - Context passed to the per-frame update
/// * `I` - Raw input event type
pub struct FsmBuilder<S: StateId, C: 'static, I: 'static> {
    name: String,
    states: HashMap<S, StateHandlers<C, I>>,
    transitions: HashMap<(S, EcodeEvent), Transition<S>>,
    /// Declaration order, so bus subscriptions are registered deterministically
    order: Vec<(S, EcodeEvent)>,
}

impl<S: StateId, C: 'static, I: 'static> FsmBuilder<S, C, I> {
    /// Start an empty definition; `name` labels log lines and errors
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: HashMap::new(),
            transitions: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Add a state with no on-enter hook
    pub fn add_state<U, H>(self, state: S, update: U, handle_event: H) -> FsmResult<Self>
    where
        U: Fn(&mut C) + 'static,
        H: Fn(&I) + 'static,
    {
        self.add_state_with_enter(state, update, handle_event, || {})
    }

    /// Add a state with an on-enter hook
    ///
    /// # Errors
    /// [`FsmError::DuplicateState`] if `state` was already added
    pub fn add_state_with_enter<U, H, E>(
        mut self,
        state: S,
        update: U,
        handle_event: H,
        on_enter: E,
    ) -> FsmResult<Self>
    where
        U: Fn(&mut C) + 'static,
        H: Fn(&I) + 'static,
        E: Fn() + 'static,
    {
        if self.states.contains_key(&state) {
            return Err(FsmError::DuplicateState {
                machine: self.name,
                state: format!("{:?}", state),
            });
        }

        self.states.insert(
            state,
            StateHandlers {
                update: Rc::new(update),
                handle_event: Rc::new(handle_event),
                on_enter: Rc::new(on_enter),
            },
        );
        Ok(self)
    }

    /// Add a transition from `from` to `to`, fired by `event`
    pub fn add_transition(self, from: S, to: S, event: EcodeEvent) -> FsmResult<Self> {
        self.insert_transition(from, to, event, None, None)
    }

    /// Add a transition with a side effect that runs before the state changes
    pub fn add_transition_with<F>(self, from: S, to: S, event: EcodeEvent, side_effect: F) -> FsmResult<Self>
    where
        F: Fn() + 'static,
    {
        self.insert_transition(from, to, event, Some(Rc::new(side_effect)), None)
    }

    /// Add a transition that a bus emission only fires when `guard` accepts
    /// its payload
    ///
    /// [`FiniteStateMachine::trigger`] skips the guard, so the owner can
    /// still fire the transition directly.
    pub fn add_transition_when<G>(self, from: S, to: S, event: EcodeEvent, guard: G) -> FsmResult<Self>
    where
        G: Fn(&Payload) -> bool + 'static,
    {
        self.insert_transition(from, to, event, None, Some(Rc::new(guard)))
    }

    fn insert_transition(
        mut self,
        from: S,
        to: S,
        event: EcodeEvent,
        side_effect: Option<HookFn>,
        guard: Option<GuardFn>,
    ) -> FsmResult<Self> {
        if self.transitions.contains_key(&(from, event)) {
            return Err(FsmError::DuplicateTransition {
                machine: self.name,
                state: format!("{:?}", from),
                event,
            });
        }
        self.check_state(from)?;
        self.check_state(to)?;

        self.transitions.insert(
            (from, event),
            Transition {
                target: to,
                side_effect,
                guard,
            },
        );
        self.order.push((from, event));
        Ok(self)
    }

    fn check_state(&self, state: S) -> FsmResult<()> {
        if self.states.contains_key(&state) {
            Ok(())
        } else {
            Err(FsmError::UnknownState {
                machine: self.name.clone(),
                state: format!("{:?}", state),
            })
        }
    }

    /// Finish the definition and start the machine in `initial`
    ///
    /// Subscribes one listener per distinct transition event on `bus`, then enters
    /// `initial`, running its on-enter hook.
    ///
    /// # Errors
    /// [`FsmError::UnknownState`] if `initial` was never added
    pub fn build(self, bus: &EventBus, initial: S) -> FsmResult<FiniteStateMachine<S, C, I>> {
        self.check_state(initial)?;
        tracing::debug!(
            "Building state machine '{}' ({} states, {} transitions)",
            self.name,
            self.states.len(),
            self.transitions.len()
        );
        FiniteStateMachine::start(
            bus,
            self.name,
            self.states,
            self.transitions,
            self.order,
            initial,
        )
    }
}
