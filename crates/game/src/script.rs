//! Scripted stand-in for the UI layer and the player
//!
//! Dialogs close on their own, the hack bar is hit as soon as it opens, and
//! solutions are judged on a worker thread that reports back through the
//! bus's remote emitter.

use std::cell::RefCell;
use std::rc::Rc;
use std::thread::JoinHandle;
use std::time::Duration;

use ecode_core::events::{BossHack, OpenDialog, ProblemSolved};
use ecode_core::sdk::{EcodeEvent, InputEvent, KeyCode};
use ecode_core::{EventBus, GameEvent, Payload, Subscription};

/// Frames the player holds D before trying the prompt key
const WALK_FRAMES: u64 = 60;

/// Simulated reading time per dialog line
const READ_TIME: Duration = Duration::from_millis(800);

pub struct Script {
    judges: Rc<RefCell<Vec<JoinHandle<()>>>>,
    _subscriptions: Vec<Subscription>,
}

impl Script {
    pub fn attach(bus: &EventBus) -> Self {
        let judges: Rc<RefCell<Vec<JoinHandle<()>>>> = Rc::new(RefCell::new(Vec::new()));
        let mut subscriptions = Vec::new();

        let remote = bus.remote();
        subscriptions.push(bus.subscribe_guarded(EcodeEvent::OpenDialog, move |payload| {
            let lines = OpenDialog::from_payload(payload)
                .map(|dialog| dialog.lines)
                .unwrap_or_default();
            for line in &lines {
                tracing::info!("Dialog: {}", line);
            }
            let delay = READ_TIME * lines.len().max(1) as u32;
            if let Err(e) = remote.emit_delayed(EcodeEvent::FinishedDialog, delay, Payload::new()) {
                tracing::warn!("Could not close dialog: {}", e);
            }
        }));

        let remote = bus.remote();
        subscriptions.push(bus.subscribe_guarded(EcodeEvent::BossCharge, move |_| {
            tracing::info!("Hack bar open, hitting it");
            if let Err(e) = remote.emit(EcodeEvent::HitBar, Payload::new()) {
                tracing::warn!("Could not hit bar: {}", e);
            }
        }));

        let remote = bus.remote();
        let spawned = Rc::clone(&judges);
        subscriptions.push(bus.subscribe_guarded(EcodeEvent::BossHack, move |payload| {
            let Ok(hack) = BossHack::from_payload(payload) else {
                return;
            };
            let remote = remote.clone();
            let judge = std::thread::spawn(move || {
                tracing::debug!("Judging '{}'", hack.problem_slug);
                let solved = ProblemSolved {
                    problem_slug: hack.problem_slug,
                };
                if let Err(e) = remote.emit(ProblemSolved::EVENT, solved.to_payload()) {
                    tracing::warn!("Verdict lost: {}", e);
                }
            });
            spawned.borrow_mut().push(judge);
        }));

        let remote = bus.remote();
        subscriptions.push(bus.subscribe_guarded(EcodeEvent::ProblemSolved, move |payload| {
            let slug = payload.get_string("problem_slug", "?");
            tracing::info!("Solved '{}'", slug);
            if let Err(e) = remote.emit(EcodeEvent::KillBoss, Payload::new()) {
                tracing::warn!("Could not kill boss: {}", e);
            }
        }));

        Self {
            judges,
            _subscriptions: subscriptions,
        }
    }

    /// Player input for the given frame of the current level
    pub fn inputs(&self, level_frame: u64) -> Vec<InputEvent> {
        match level_frame {
            1 => vec![InputEvent::KeyDown(KeyCode::D)],
            WALK_FRAMES => vec![InputEvent::KeyUp(KeyCode::D)],
            n if n > WALK_FRAMES && n % 30 == 0 => vec![InputEvent::KeyDown(KeyCode::T)],
            _ => Vec::new(),
        }
    }

    /// Wait for outstanding judge threads
    pub fn finish(self) {
        for judge in self.judges.borrow_mut().drain(..) {
            if judge.join().is_err() {
                tracing::error!("Judge thread panicked");
            }
        }
    }
}
