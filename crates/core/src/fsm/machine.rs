//! Running state machine

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use ecode_sdk::EcodeEvent;

use super::error::{FsmError, FsmResult};
use super::{StateHandlers, StateId, Transition};
use crate::events::{EventBus, Payload, Subscription};

/// Shared between the machine handle and its bus listeners
///
/// Tables are immutable after build. The only mutable pieces are cells, and
/// no borrow is held while user code runs, so handlers may call back into
/// the machine.
struct FsmCore<S: StateId, C: 'static, I: 'static> {
    name: String,
    states: HashMap<S, StateHandlers<C, I>>,
    transitions: HashMap<(S, EcodeEvent), Transition<S>>,
    current: Cell<S>,
    destroyed: Cell<bool>,
}

impl<S: StateId, C: 'static, I: 'static> FsmCore<S, C, I> {
    fn ensure_live(&self) -> FsmResult<()> {
        if self.destroyed.get() {
            Err(FsmError::Destroyed {
                machine: self.name.clone(),
            })
        } else {
            Ok(())
        }
    }

    fn handlers(&self, state: S) -> FsmResult<&StateHandlers<C, I>> {
        self.states.get(&state).ok_or_else(|| FsmError::UnknownState {
            machine: self.name.clone(),
            state: format!("{:?}", state),
        })
    }

    /// Run `state`'s on-enter hook, then make it current
    fn enter(&self, state: S) -> FsmResult<()> {
        self.ensure_live()?;
        let on_enter = Rc::clone(&self.handlers(state)?.on_enter);

        tracing::debug!(
            "{}: {:?} -> {:?}",
            self.name,
            self.current.get(),
            state
        );
        on_enter();
        self.current.set(state);
        Ok(())
    }

    /// Run the transition registered for (`source`, `event`)
    ///
    /// The side effect still observes `source` as the current state.
    fn fire(&self, source: S, event: EcodeEvent) -> FsmResult<bool> {
        let Some(transition) = self.transitions.get(&(source, event)) else {
            return Ok(false);
        };
        let target = transition.target;
        let side_effect = transition.side_effect.clone();

        tracing::debug!(
            "{}: transition {:?} -> {:?} on '{}'",
            self.name,
            source,
            target,
            event
        );
        if let Some(side_effect) = side_effect {
            side_effect();
        }
        self.enter(target)?;
        Ok(true)
    }

    /// Bus listener body for `event`
    ///
    /// Looks up the transition for the state current when the emission
    /// arrives and fires at most that one, so a single emission never
    /// chains through several transitions of the same machine.
    fn on_bus_event(&self, event: EcodeEvent, payload: &Payload) {
        if self.destroyed.get() {
            return;
        }
        let source = self.current.get();
        let Some(transition) = self.transitions.get(&(source, event)) else {
            tracing::trace!("{}: ignoring '{}' in state {:?}", self.name, event, source);
            return;
        };
        if let Some(guard) = transition.guard.clone() {
            if !guard(payload) {
                tracing::trace!("{}: guard rejected '{}' in state {:?}", self.name, event, source);
                return;
            }
        }
        if let Err(e) = self.fire(source, event) {
            tracing::error!("{}: transition on '{}' failed: {}", self.name, event, e);
        }
    }
}

/// An event-driven finite state machine
///
/// Created by [`FsmBuilder::build`](super::FsmBuilder::build). The owner
/// forwards its per-frame context to [`update`](Self::update) and raw input
/// to [`handle_event`](Self::handle_event); transitions arrive through the
/// event bus.
///
/// Dropping the machine tears down its bus listeners, as does an explicit
/// [`destroy`](Self::destroy).
pub struct FiniteStateMachine<S: StateId, C: 'static, I: 'static> {
    core: Rc<FsmCore<S, C, I>>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl<S: StateId, C: 'static, I: 'static> FiniteStateMachine<S, C, I> {
    pub(super) fn start(
        bus: &EventBus,
        name: String,
        states: HashMap<S, StateHandlers<C, I>>,
        transitions: HashMap<(S, EcodeEvent), Transition<S>>,
        order: Vec<(S, EcodeEvent)>,
        initial: S,
    ) -> FsmResult<Self> {
        let core = Rc::new(FsmCore {
            name,
            states,
            transitions,
            current: Cell::new(initial),
            destroyed: Cell::new(false),
        });

        let mut events: Vec<EcodeEvent> = Vec::new();
        for (_, event) in order {
            if !events.contains(&event) {
                events.push(event);
            }
        }

        let subscriptions = events
            .into_iter()
            .map(|event| {
                let key = bus.subscribe_weak(event, &core, move |core, payload| {
                    core.on_bus_event(event, payload)
                });
                bus.guard(event, key)
            })
            .collect();

        let machine = Self {
            core,
            subscriptions: RefCell::new(subscriptions),
        };
        machine.core.enter(initial)?;
        Ok(machine)
    }

    /// Name given at construction
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Current state
    pub fn state(&self) -> S {
        self.core.current.get()
    }

    /// Force the machine into `state`, running its on-enter hook
    ///
    /// This does not consult the transition table; any registered state may
    /// be entered from any other.
    ///
    /// # Errors
    /// [`FsmError::UnknownState`] if `state` was never added,
    /// [`FsmError::Destroyed`] after teardown
    pub fn set_state(&self, state: S) -> FsmResult<()> {
        self.core.enter(state)
    }

    /// Fire this machine's own transition for (current state, `event`)
    /// without broadcasting `event` on the bus
    ///
    /// Transition guards are not consulted.
    ///
    /// # Returns
    /// `true` if a transition was declared for the pair and ran
    pub fn trigger(&self, event: EcodeEvent) -> FsmResult<bool> {
        self.core.ensure_live()?;
        self.core.fire(self.state(), event)
    }

    /// Target of the transition declared for (`from`, `event`), if any
    pub fn transition_target(&self, from: S, event: EcodeEvent) -> Option<S> {
        self.core
            .transitions
            .get(&(from, event))
            .map(|transition| transition.target)
    }

    /// Run the current state's per-frame update
    pub fn update(&self, context: &mut C) -> FsmResult<()> {
        self.core.ensure_live()?;
        let update = Rc::clone(&self.core.handlers(self.state())?.update);
        update(context);
        Ok(())
    }

    /// Forward a raw input event to the current state's handler
    pub fn handle_event(&self, input: &I) -> FsmResult<()> {
        self.core.ensure_live()?;
        let handle_event = Rc::clone(&self.core.handlers(self.state())?.handle_event);
        handle_event(input);
        Ok(())
    }

    /// Remove every bus listener this machine registered
    ///
    /// Idempotent. Afterwards the state no longer changes and every other
    /// operation returns [`FsmError::Destroyed`].
    pub fn destroy(&self) {
        if self.core.destroyed.replace(true) {
            return;
        }
        let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
        tracing::debug!(
            "{}: destroyed in state {:?}, dropping {} listeners",
            self.core.name,
            self.state(),
            subscriptions.len()
        );
        drop(subscriptions);
    }

    /// True once `destroy` has run
    pub fn is_destroyed(&self) -> bool {
        self.core.destroyed.get()
    }
}

impl<S: StateId, C: 'static, I: 'static> Drop for FiniteStateMachine<S, C, I> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<S: StateId, C: 'static, I: 'static> fmt::Debug for FiniteStateMachine<S, C, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiniteStateMachine")
            .field("name", &self.core.name)
            .field("state", &self.state())
            .field("states", &self.core.states.len())
            .field("transitions", &self.core.transitions.len())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
