//! Event bus - registration, dispatch, and scheduling
//!
//! The bus is a single constructed object shared by handle. Cloning an
//! [`EventBus`] yields another handle onto the same registry; there is no
//! global instance.
//!
//! # Threading
//!
//! The bus is `!Send` and every callback runs on the thread that owns it.
//! Other threads go through [`EventBus::remote`].

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::time::Duration;

use ecode_engine::{Clock, MonotonicClock};
use ecode_sdk::EcodeEvent;
use slotmap::SlotMap;

use super::remote::{RemoteEmitter, RemoteQueue};
use super::schedule::Schedule;
use super::subscription::Subscription;
use super::typed::GameEvent;
use super::types::{EventCallback, ListenerEntry, Liveness, SubscriptionKey};
use super::Payload;

/// Listener table
#[derive(Default)]
struct Registry {
    listeners: SlotMap<SubscriptionKey, ListenerEntry>,
    /// Subscription order per event
    order: HashMap<EcodeEvent, Vec<SubscriptionKey>>,
}

impl Registry {
    fn insert(&mut self, entry: ListenerEntry) -> SubscriptionKey {
        let event = entry.event;
        let key = self.listeners.insert(entry);
        self.order.entry(event).or_default().push(key);
        key
    }

    fn remove(&mut self, event: EcodeEvent, key: SubscriptionKey) -> bool {
        match self.listeners.get(key) {
            Some(entry) if entry.event == event => {}
            _ => return false,
        }
        self.listeners.remove(key);
        if let Some(keys) = self.order.get_mut(&event) {
            keys.retain(|k| *k != key);
        }
        true
    }

    /// Drop listeners whose target is gone; returns how many were removed
    fn prune(&mut self, event: Option<EcodeEvent>) -> usize {
        let dead: Vec<(EcodeEvent, SubscriptionKey)> = self
            .listeners
            .iter()
            .filter(|(_, entry)| event.map_or(true, |e| e == entry.event))
            .filter(|(_, entry)| !entry.is_alive())
            .map(|(key, entry)| (entry.event, key))
            .collect();

        for (event, key) in &dead {
            self.remove(*event, *key);
        }
        dead.len()
    }
}

pub(crate) struct BusInner {
    clock: Box<dyn Clock>,
    registry: RefCell<Registry>,
    schedule: RefCell<Schedule>,
    remote: RemoteQueue,
}

/// Publish/subscribe registry with delayed delivery
///
/// # Example
///
/// ```
/// use ecode_core::events::{EventBus, Payload};
/// use ecode_sdk::EcodeEvent;
///
/// let bus = EventBus::new();
/// let key = bus.subscribe(EcodeEvent::GiveOrder, |payload| {
///     println!("New order: {}", payload.get_string("text", ""));
/// });
///
/// bus.emit(EcodeEvent::GiveOrder, Payload::new().with("text", "Find the bridge"));
/// bus.unsubscribe(EcodeEvent::GiveOrder, key);
/// ```
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

impl EventBus {
    /// Create a bus driven by the wall clock
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }

    /// Create a bus driven by the given clock
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            inner: Rc::new(BusInner {
                clock: Box::new(clock),
                registry: RefCell::new(Registry::default()),
                schedule: RefCell::new(Schedule::default()),
                remote: RemoteQueue::new(),
            }),
        }
    }

    /// Current time on the bus clock
    pub fn now(&self) -> Duration {
        self.inner.clock.now()
    }

    /// Register a callback for an event
    ///
    /// Registering the same callback twice makes it fire twice.
    ///
    /// # Returns
    /// A key that can be used to remove this registration via `unsubscribe`
    pub fn subscribe<F>(&self, event: EcodeEvent, callback: F) -> SubscriptionKey
    where
        F: Fn(&Payload) + 'static,
    {
        self.insert(event, Rc::new(callback), None)
    }

    /// Register a callback that only holds a weak reference to its target
    ///
    /// The bus never keeps `target` alive. Once it is dropped the callback is
    /// no longer invoked, and the registration is pruned the next time
    /// `event` fires or the bus is updated.
    pub fn subscribe_weak<T, F>(&self, event: EcodeEvent, target: &Rc<T>, callback: F) -> SubscriptionKey
    where
        T: 'static,
        F: Fn(&T, &Payload) + 'static,
    {
        let weak: Weak<T> = Rc::downgrade(target);
        let watched = weak.clone();
        let liveness: Liveness = Box::new(move || watched.strong_count() > 0);

        self.insert(
            event,
            Rc::new(move |payload: &Payload| {
                if let Some(target) = weak.upgrade() {
                    callback(&target, payload);
                }
            }),
            Some(liveness),
        )
    }

    /// Register a callback that receives a decoded payload
    ///
    /// A payload that does not decode into `E` is logged and that delivery
    /// is skipped.
    pub fn subscribe_typed<E, F>(&self, callback: F) -> SubscriptionKey
    where
        E: GameEvent + 'static,
        F: Fn(E) + 'static,
    {
        self.subscribe(E::EVENT, move |payload| match E::from_payload(payload) {
            Ok(typed) => callback(typed),
            Err(e) => tracing::error!("Dropping delivery: {}", e),
        })
    }

    /// Register a callback whose registration ends when the handle is dropped
    pub fn subscribe_guarded<F>(&self, event: EcodeEvent, callback: F) -> Subscription
    where
        F: Fn(&Payload) + 'static,
    {
        let key = self.subscribe(event, callback);
        self.guard(event, key)
    }

    /// Wrap an existing registration in a handle that unsubscribes on drop
    pub fn guard(&self, event: EcodeEvent, key: SubscriptionKey) -> Subscription {
        Subscription::new(Rc::downgrade(&self.inner), event, key)
    }

    fn insert(
        &self,
        event: EcodeEvent,
        callback: EventCallback,
        liveness: Option<Liveness>,
    ) -> SubscriptionKey {
        let mut registry = self.inner.registry.borrow_mut();
        let key = registry.insert(ListenerEntry {
            event,
            callback,
            liveness,
        });
        tracing::trace!(
            "Subscribed to '{}' (total: {})",
            event,
            registry.order.get(&event).map_or(0, Vec::len)
        );
        key
    }

    /// Remove one registration
    ///
    /// # Returns
    /// `true` if the registration was found. Removing an unknown key is a
    /// no-op.
    pub fn unsubscribe(&self, event: EcodeEvent, key: SubscriptionKey) -> bool {
        BusInner::unsubscribe(&self.inner, event, key)
    }

    /// Remove every registration for an event
    ///
    /// # Returns
    /// The number of registrations removed
    pub fn unsubscribe_all(&self, event: EcodeEvent) -> usize {
        let mut registry = self.inner.registry.borrow_mut();
        let keys = registry.order.remove(&event).unwrap_or_default();
        for key in &keys {
            registry.listeners.remove(*key);
        }
        if !keys.is_empty() {
            tracing::debug!("Unsubscribed all {} listeners for '{}'", keys.len(), event);
        }
        keys.len()
    }

    /// Number of registrations for an event, including dead ones not yet pruned
    pub fn listener_count(&self, event: EcodeEvent) -> usize {
        self.inner
            .registry
            .borrow()
            .order
            .get(&event)
            .map_or(0, Vec::len)
    }

    /// Number of emissions waiting for their trigger time
    pub fn scheduled_count(&self) -> usize {
        self.inner.schedule.borrow().len()
    }

    /// Number of emissions queued by other threads, not yet picked up
    pub fn remote_pending(&self) -> usize {
        self.inner.remote.len()
    }

    /// Handle for emitting from other threads
    pub fn remote(&self) -> RemoteEmitter {
        self.inner.remote.emitter()
    }

    /// Deliver an event to every live subscriber, in subscription order
    ///
    /// Subscribers added while this call runs are not invoked by it.
    /// If a subscriber panics the remaining subscribers still run, then the
    /// first panic is resumed.
    pub fn emit(&self, event: EcodeEvent, payload: Payload) {
        self.dispatch(event, &payload);
    }

    /// Deliver a typed event immediately
    pub fn emit_typed<E: GameEvent>(&self, event: &E) {
        self.dispatch(E::EVENT, &event.to_payload());
    }

    /// Deliver an event after `delay` has elapsed on the bus clock
    ///
    /// A zero delay delivers immediately. Otherwise the event is queued and
    /// fired by the first `update` at or past its trigger time.
    pub fn emit_delayed(&self, event: EcodeEvent, delay: Duration, payload: Payload) {
        if delay.is_zero() {
            self.dispatch(event, &payload);
            return;
        }

        let trigger_at = self.now() + delay;
        self.inner
            .schedule
            .borrow_mut()
            .push(event, trigger_at, payload);
        tracing::trace!(
            "Scheduled '{}' in {}ms (at {}ms)",
            event,
            delay.as_millis(),
            trigger_at.as_millis()
        );
    }

    /// Deliver a typed event after `delay`
    pub fn emit_typed_delayed<E: GameEvent>(&self, event: &E, delay: Duration) {
        self.emit_delayed(E::EVENT, delay, event.to_payload());
    }

    /// Drain the bus; call exactly once per frame
    ///
    /// Picks up emissions queued by other threads, prunes dead listeners,
    /// then fires every scheduled event that is due, earliest first. Events
    /// scheduled while draining wait for a later update.
    ///
    /// # Returns
    /// The number of scheduled events fired
    pub fn update(&self) -> usize {
        for (event, delay, payload) in self.inner.remote.drain() {
            tracing::trace!("Picked up remote emission of '{}'", event);
            self.emit_delayed(event, delay, payload);
        }

        let pruned = self.inner.registry.borrow_mut().prune(None);
        if pruned > 0 {
            tracing::trace!("Pruned {} dead listeners", pruned);
        }

        let now = self.now();
        let watermark = self.inner.schedule.borrow().watermark();
        let mut fired = 0;

        loop {
            let next = self.inner.schedule.borrow_mut().pop_due(now, watermark);
            let Some(scheduled) = next else {
                break;
            };
            tracing::trace!(
                "Firing scheduled '{}' (due {}ms, now {}ms)",
                scheduled.event,
                scheduled.trigger_at.as_millis(),
                now.as_millis()
            );
            self.dispatch(scheduled.event, &scheduled.payload);
            fired += 1;
        }

        fired
    }

    fn dispatch(&self, event: EcodeEvent, payload: &Payload) {
        let snapshot: Vec<(SubscriptionKey, EventCallback)> = {
            let registry = self.inner.registry.borrow();
            registry
                .order
                .get(&event)
                .map(|keys| {
                    keys.iter()
                        .filter_map(|key| {
                            registry
                                .listeners
                                .get(*key)
                                .map(|entry| (*key, Rc::clone(&entry.callback)))
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        tracing::trace!("Emitting '{}' to {} listeners", event, snapshot.len());

        let mut has_dead = false;
        let mut first_panic: Option<Box<dyn Any + Send>> = None;

        for (key, callback) in snapshot {
            let alive = match self.inner.registry.borrow().listeners.get(key) {
                // Removed by an earlier subscriber in this pass
                None => continue,
                Some(entry) => entry.is_alive(),
            };
            if !alive {
                has_dead = true;
                continue;
            }

            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| callback(payload))) {
                tracing::error!(
                    "Subscriber for '{}' panicked: {}",
                    event,
                    panic_message(panic.as_ref())
                );
                first_panic.get_or_insert(panic);
            }
        }

        if has_dead {
            let pruned = self.inner.registry.borrow_mut().prune(Some(event));
            tracing::trace!("Pruned {} dead listeners for '{}'", pruned, event);
        }

        if let Some(panic) = first_panic {
            panic::resume_unwind(panic);
        }
    }
}

impl BusInner {
    pub(crate) fn unsubscribe(this: &Rc<Self>, event: EcodeEvent, key: SubscriptionKey) -> bool {
        let removed = this.registry.borrow_mut().remove(event, key);
        if removed {
            tracing::trace!("Unsubscribed from '{}'", event);
        }
        removed
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.registry.borrow();
        f.debug_struct("EventBus")
            .field("listeners", &registry.listeners.len())
            .field("scheduled", &self.inner.schedule.borrow().len())
            .field("now", &self.now())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use ecode_engine::ManualClock;

    use crate::events::typed::{BossHack, GiveOrder};

    fn manual_bus() -> (EventBus, ManualClock) {
        let clock = ManualClock::new();
        (EventBus::with_clock(clock.clone()), clock)
    }

    fn recorder() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_subscribers_fire_in_order_with_payload() {
        let bus = EventBus::new();
        let log = recorder();

        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            bus.subscribe(EcodeEvent::GiveOrder, move |payload| {
                log.borrow_mut()
                    .push(format!("{}:{}", name, payload.get_string("text", "")));
            });
        }

        bus.emit(EcodeEvent::GiveOrder, Payload::new().with("text", "go"));

        assert_eq!(
            *log.borrow(),
            vec!["first:go", "second:go", "third:go"]
        );
    }

    #[test]
    fn test_other_events_not_delivered() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        bus.subscribe(EcodeEvent::OpenDoor, move |_| c.set(c.get() + 1));

        bus.emit(EcodeEvent::CloseDoors, Payload::new());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_duplicate_registration_fires_twice() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let callback = {
            let calls = Rc::clone(&calls);
            move |_: &Payload| calls.set(calls.get() + 1)
        };

        let first = bus.subscribe(EcodeEvent::HitBar, callback.clone());
        bus.subscribe(EcodeEvent::HitBar, callback);

        bus.emit(EcodeEvent::HitBar, Payload::new());
        assert_eq!(calls.get(), 2);

        assert!(bus.unsubscribe(EcodeEvent::HitBar, first));
        bus.emit(EcodeEvent::HitBar, Payload::new());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let key = bus.subscribe(EcodeEvent::PauseGame, move |_| c.set(c.get() + 1));

        assert!(bus.unsubscribe(EcodeEvent::PauseGame, key));
        bus.emit(EcodeEvent::PauseGame, Payload::new());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_unsubscribe_unknown_is_noop() {
        let bus = EventBus::new();
        let key = bus.subscribe(EcodeEvent::PauseGame, |_| {});

        assert!(!bus.unsubscribe(EcodeEvent::UnpauseGame, key));
        assert!(bus.unsubscribe(EcodeEvent::PauseGame, key));
        assert!(!bus.unsubscribe(EcodeEvent::PauseGame, key));
        assert_eq!(bus.listener_count(EcodeEvent::PauseGame), 0);
    }

    #[test]
    fn test_unsubscribe_all() {
        let bus = EventBus::new();
        bus.subscribe(EcodeEvent::OpenNote, |_| {});
        bus.subscribe(EcodeEvent::OpenNote, |_| {});
        bus.subscribe(EcodeEvent::OpenPin, |_| {});

        assert_eq!(bus.unsubscribe_all(EcodeEvent::OpenNote), 2);
        assert_eq!(bus.listener_count(EcodeEvent::OpenNote), 0);
        assert_eq!(bus.listener_count(EcodeEvent::OpenPin), 1);
    }

    #[test]
    fn test_weak_subscriber_pruned_after_drop() {
        struct Door {
            opened: Rc<Cell<u32>>,
        }

        let bus = EventBus::new();
        let opened = Rc::new(Cell::new(0));
        let door = Rc::new(Door {
            opened: Rc::clone(&opened),
        });
        bus.subscribe_weak(EcodeEvent::OpenDoor, &door, |door, _| {
            door.opened.set(door.opened.get() + 1);
        });
        bus.subscribe(EcodeEvent::OpenDoor, |_| {});

        bus.emit(EcodeEvent::OpenDoor, Payload::new());
        assert_eq!(opened.get(), 1);
        assert_eq!(bus.listener_count(EcodeEvent::OpenDoor), 2);

        drop(door);
        assert_eq!(bus.listener_count(EcodeEvent::OpenDoor), 2);

        bus.emit(EcodeEvent::OpenDoor, Payload::new());
        assert_eq!(opened.get(), 1);
        assert_eq!(bus.listener_count(EcodeEvent::OpenDoor), 1);
    }

    #[test]
    fn test_update_prunes_dead_listeners() {
        let bus = EventBus::new();
        let target = Rc::new(());
        bus.subscribe_weak(EcodeEvent::OpenPin, &target, |_, _| {});

        drop(target);
        bus.update();
        assert_eq!(bus.listener_count(EcodeEvent::OpenPin), 0);
    }

    #[test]
    fn test_guard_unsubscribes_on_drop() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let guard = bus.subscribe_guarded(EcodeEvent::NextLevel, move |_| c.set(c.get() + 1));

        bus.emit(EcodeEvent::NextLevel, Payload::new());
        drop(guard);
        bus.emit(EcodeEvent::NextLevel, Payload::new());

        assert_eq!(calls.get(), 1);
        assert_eq!(bus.listener_count(EcodeEvent::NextLevel), 0);
    }

    #[test]
    fn test_delayed_fires_earliest_trigger_first() {
        let (bus, clock) = manual_bus();
        let log = recorder();

        for event in [EcodeEvent::NextLevel, EcodeEvent::GiveOrder] {
            let log = Rc::clone(&log);
            bus.subscribe(event, move |_| log.borrow_mut().push(event.name().to_string()));
        }

        bus.emit_delayed(EcodeEvent::NextLevel, Duration::from_millis(100), Payload::new());
        bus.emit_delayed(EcodeEvent::GiveOrder, Duration::from_millis(50), Payload::new());
        assert!(log.borrow().is_empty());
        assert_eq!(bus.scheduled_count(), 2);

        clock.advance(Duration::from_millis(150));
        assert_eq!(bus.update(), 2);
        assert_eq!(*log.borrow(), vec!["give_order", "next_level"]);
        assert_eq!(bus.scheduled_count(), 0);
    }

    #[test]
    fn test_delayed_waits_for_trigger_time() {
        let (bus, clock) = manual_bus();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        bus.subscribe(EcodeEvent::NextLevel, move |_| c.set(c.get() + 1));

        bus.emit_delayed(EcodeEvent::NextLevel, Duration::from_millis(5000), Payload::new());

        clock.advance(Duration::from_millis(4999));
        assert_eq!(bus.update(), 0);
        assert_eq!(calls.get(), 0);

        clock.advance(Duration::from_millis(1));
        assert_eq!(bus.update(), 1);
        assert_eq!(bus.update(), 0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_zero_delay_is_immediate() {
        let (bus, _clock) = manual_bus();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        bus.subscribe(EcodeEvent::OpenWasd, move |_| c.set(c.get() + 1));

        bus.emit_delayed(EcodeEvent::OpenWasd, Duration::ZERO, Payload::new());
        assert_eq!(calls.get(), 1);
        assert_eq!(bus.scheduled_count(), 0);
    }

    #[test]
    fn test_emission_scheduled_during_drain_waits() {
        let (bus, clock) = manual_bus();
        let log = recorder();

        {
            let inner_bus = bus.clone();
            let log = Rc::clone(&log);
            bus.subscribe(EcodeEvent::LevelEnded, move |_| {
                log.borrow_mut().push("level_ended".into());
                inner_bus.emit_delayed(
                    EcodeEvent::NextLevel,
                    Duration::from_millis(1),
                    Payload::new(),
                );
            });
        }
        {
            let log = Rc::clone(&log);
            bus.subscribe(EcodeEvent::NextLevel, move |_| {
                log.borrow_mut().push("next_level".into())
            });
        }

        bus.emit_delayed(EcodeEvent::LevelEnded, Duration::from_millis(10), Payload::new());
        clock.advance(Duration::from_millis(100));
        assert_eq!(bus.update(), 1);
        assert_eq!(*log.borrow(), vec!["level_ended"]);

        clock.advance(Duration::from_millis(1));
        assert_eq!(bus.update(), 1);
        assert_eq!(*log.borrow(), vec!["level_ended", "next_level"]);

        // The handler above captured a bus clone; break the cycle
        bus.unsubscribe_all(EcodeEvent::LevelEnded);
    }

    #[test]
    fn test_subscriber_added_during_emit_not_called() {
        let bus = EventBus::new();
        let late_calls = Rc::new(Cell::new(0));

        {
            let inner_bus = bus.clone();
            let late_calls = Rc::clone(&late_calls);
            bus.subscribe(EcodeEvent::OpenBar, move |_| {
                let late_calls = Rc::clone(&late_calls);
                inner_bus.subscribe(EcodeEvent::OpenBar, move |_| {
                    late_calls.set(late_calls.get() + 1)
                });
            });
        }

        bus.emit(EcodeEvent::OpenBar, Payload::new());
        assert_eq!(late_calls.get(), 0);
        assert_eq!(bus.listener_count(EcodeEvent::OpenBar), 2);

        bus.unsubscribe_all(EcodeEvent::OpenBar);
    }

    #[test]
    fn test_subscriber_removed_during_emit_skipped() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let victim: Rc<Cell<Option<SubscriptionKey>>> = Rc::new(Cell::new(None));

        {
            let inner_bus = bus.clone();
            let victim = Rc::clone(&victim);
            bus.subscribe(EcodeEvent::OpenDownload, move |_| {
                if let Some(key) = victim.get() {
                    inner_bus.unsubscribe(EcodeEvent::OpenDownload, key);
                }
            });
        }
        let c = Rc::clone(&calls);
        let key = bus.subscribe(EcodeEvent::OpenDownload, move |_| c.set(c.get() + 1));
        victim.set(Some(key));

        bus.emit(EcodeEvent::OpenDownload, Payload::new());
        assert_eq!(calls.get(), 0);

        bus.unsubscribe_all(EcodeEvent::OpenDownload);
    }

    #[test]
    fn test_panicking_subscriber_does_not_block_others() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));

        bus.subscribe(EcodeEvent::CameraAlarm, |_| panic!("alarm subscriber broke"));
        let c = Rc::clone(&calls);
        bus.subscribe(EcodeEvent::CameraAlarm, move |_| c.set(c.get() + 1));

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            bus.emit(EcodeEvent::CameraAlarm, Payload::new());
        }));

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_typed_subscription() {
        let bus = EventBus::new();
        let slugs = recorder();
        {
            let slugs = Rc::clone(&slugs);
            bus.subscribe_typed::<BossHack, _>(move |hack| {
                slugs.borrow_mut().push(hack.problem_slug)
            });
        }

        bus.emit_typed(&BossHack {
            problem_slug: "two-sum".into(),
        });
        // Wrong shape: dropped, not delivered
        bus.emit(EcodeEvent::BossHack, Payload::new().with("problem_slug", 7));

        assert_eq!(*slugs.borrow(), vec!["two-sum"]);
    }

    #[test]
    fn test_typed_delayed() {
        let (bus, clock) = manual_bus();
        let texts = recorder();
        {
            let texts = Rc::clone(&texts);
            bus.subscribe_typed::<GiveOrder, _>(move |order| texts.borrow_mut().push(order.text));
        }

        bus.emit_typed_delayed(
            &GiveOrder {
                text: "ERR: Unable To Find Objective".into(),
            },
            Duration::from_secs(10),
        );
        clock.advance(Duration::from_secs(10));
        bus.update();

        assert_eq!(*texts.borrow(), vec!["ERR: Unable To Find Objective"]);
    }

    #[test]
    fn test_remote_delay_counts_from_pickup() {
        let (bus, clock) = manual_bus();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        bus.subscribe(EcodeEvent::NextLevel, move |_| c.set(c.get() + 1));

        bus.remote()
            .emit_delayed(EcodeEvent::NextLevel, Duration::from_millis(100), Payload::new())
            .unwrap();

        // Sent long ago, but the delay only starts when the bus picks it up
        clock.advance(Duration::from_millis(500));
        assert_eq!(bus.update(), 0);
        assert_eq!(bus.scheduled_count(), 1);

        clock.advance(Duration::from_millis(100));
        assert_eq!(bus.update(), 1);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_remote_emission_runs_on_update() {
        let bus = EventBus::new();
        let slugs = recorder();
        {
            let slugs = Rc::clone(&slugs);
            bus.subscribe(EcodeEvent::ProblemSolved, move |payload| {
                slugs
                    .borrow_mut()
                    .push(payload.get_string("problem_slug", ""))
            });
        }

        let remote = bus.remote();
        std::thread::spawn(move || {
            remote
                .emit(
                    EcodeEvent::ProblemSolved,
                    Payload::new().with("problem_slug", "valid-anagram"),
                )
                .unwrap();
        })
        .join()
        .unwrap();

        assert!(slugs.borrow().is_empty());
        assert_eq!(bus.remote_pending(), 1);

        bus.update();
        assert_eq!(*slugs.borrow(), vec!["valid-anagram"]);
    }
}
