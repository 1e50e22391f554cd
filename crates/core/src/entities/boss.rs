//! Boss encounter
//!
//! A boss waits in its room until the player walks up and presses the prompt
//! key. After its intro dialog it alternates between charging and attacking
//! until the player hacks it during a charge, then plays its death lines and
//! removes itself.
//!
//! ```text
//! Waiting --StartBossFight--> StartDialog --FinishedDialog--> Charge <--timer--> Attack
//!                                                               |
//!                                                           KillBoss
//!                                                               v
//!                                                             Dying --timer--> (destroyed)
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use ecode_sdk::{EcodeEvent, InputEvent, KeyCode};

use super::{Entity, Player};
use crate::config::BossConfig;
use crate::events::{BossHack, EventBus, OpenDialog, Payload, Subscription};
use crate::fsm::{FiniteStateMachine, FsmBuilder, FsmResult};
use crate::geometry::{Rect, Vec2};

/// Key that starts the fight while the prompt is shown
///
/// The resulting `StartBossFight` names the boss in its `"boss"` field and
/// only that boss leaves `Waiting`.
pub const PROMPT_KEY: KeyCode = KeyCode::T;

/// How far past the room's left wall the player must walk before the doors close
const DOOR_DEPTH: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossState {
    Waiting,
    StartDialog,
    Charge,
    Attack,
    Dying,
}

/// Where the boss heads while attacking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttackPattern {
    /// Visit the room's corners in turn
    #[default]
    Wander,
    /// Run at the player
    Chase,
}

/// Per-boss content
#[derive(Debug, Clone)]
pub struct BossSpec {
    pub name: String,
    /// Bounds of the arena; the boss starts at its center
    pub room: Rect,
    /// Problem the player must solve to kill this boss
    pub problem_slug: String,
    pub pattern: AttackPattern,
    pub intro_lines: Vec<String>,
    pub death_lines: Vec<String>,
}

impl BossSpec {
    pub fn new(name: impl Into<String>, room: Rect, problem_slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            room,
            problem_slug: problem_slug.into(),
            pattern: AttackPattern::default(),
            intro_lines: vec![
                "So you found the server room.".to_string(),
                "Nobody gets past me without a passing test suite.".to_string(),
            ],
            death_lines: vec!["All tests... passing...".to_string()],
        }
    }

    pub fn with_pattern(mut self, pattern: AttackPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_intro(mut self, lines: Vec<String>) -> Self {
        self.intro_lines = lines;
        self
    }

    pub fn with_death_lines(mut self, lines: Vec<String>) -> Self {
        self.death_lines = lines;
        self
    }
}

/// State shared with the machine's handlers
///
/// Handlers never touch the machine directly. A timer-driven state change is
/// left in `pending` and applied by [`Boss`] once the current update returns.
struct BossBody {
    bus: EventBus,
    spec: BossSpec,
    config: BossConfig,
    rect: Cell<Rect>,
    prompt_shown: Cell<bool>,
    doors_closed: Cell<bool>,
    attacked_once: Cell<bool>,
    corner: Cell<usize>,
    target: Cell<Option<Vec2>>,
    state_since: Cell<Duration>,
    pending: Cell<Option<BossState>>,
    expired: Cell<bool>,
}

impl BossBody {
    fn elapsed(&self) -> Duration {
        self.bus.now().saturating_sub(self.state_since.get())
    }

    fn restart_timer(&self) {
        self.state_since.set(self.bus.now());
    }

    fn waiting_update(&self, player: &mut Player) {
        let margin = self.config.prompt_margin;
        self.prompt_shown
            .set(self.rect.get().inflate(margin, margin).intersects(&player.rect));

        let room = self.spec.room;
        if !self.doors_closed.get()
            && room.intersects(&player.rect)
            && player.rect.left() > room.left() + DOOR_DEPTH
        {
            self.doors_closed.set(true);
            tracing::debug!("{}: player entered the room", self.spec.name);
            self.bus.emit(EcodeEvent::CloseDoors, Payload::new());
        }
    }

    fn waiting_input(&self, input: &InputEvent) {
        if input.is_key_down(PROMPT_KEY) && self.prompt_shown.get() {
            self.prompt_shown.set(false);
            self.bus.emit(
                EcodeEvent::StartBossFight,
                Payload::new().with("boss", &self.spec.name),
            );
        }
    }

    fn start_dialog_enter(&self) {
        self.prompt_shown.set(false);
        self.bus.emit_typed(&OpenDialog {
            lines: self.spec.intro_lines.clone(),
            current_line: 0,
        });
    }

    fn charge_enter(&self) {
        self.restart_timer();
        // The first charge is not hackable
        if self.attacked_once.get() {
            self.bus.emit(
                EcodeEvent::BossCharge,
                Payload::new().with("problem_slug", &self.spec.problem_slug),
            );
        }
    }

    fn charge_update(&self, _player: &mut Player) {
        if self.elapsed() > self.config.charge() {
            self.pending.set(Some(BossState::Attack));
        }
    }

    fn attack_enter(&self) {
        self.restart_timer();
        self.attacked_once.set(true);
        self.target.set(None);
        self.bus.emit(EcodeEvent::BossAttack, Payload::new());
    }

    fn attack_update(&self, player: &mut Player) {
        if self.rect.get().intersects(&player.rect) {
            player.health.lose(1);
        }
        if self.elapsed() > self.config.attack() {
            self.pending.set(Some(BossState::Charge));
            return;
        }

        let target = match self.target.get() {
            Some(target) => target,
            None => self.next_target(player),
        };
        self.target.set(Some(target));
        if self.step_toward(target) {
            self.target.set(None);
        }
    }

    fn dying_enter(&self) {
        self.restart_timer();
        self.bus.emit_typed(&OpenDialog {
            lines: self.spec.death_lines.clone(),
            current_line: 0,
        });
    }

    fn dying_update(&self, _player: &mut Player) {
        if self.elapsed() > self.config.dying() {
            self.expired.set(true);
        }
    }

    fn hack(&self) {
        tracing::debug!("{}: hack attempt on '{}'", self.spec.name, self.spec.problem_slug);
        self.bus.emit_typed(&BossHack {
            problem_slug: self.spec.problem_slug.clone(),
        });
    }

    fn next_target(&self, player: &Player) -> Vec2 {
        match self.spec.pattern {
            AttackPattern::Chase => player.position(),
            AttackPattern::Wander => {
                let room = self.spec.room;
                let size = self.config.size;
                let corners = [
                    Vec2::new(room.left(), room.top()),
                    Vec2::new(room.right() - size, room.top()),
                    Vec2::new(room.right() - size, room.bottom() - size),
                    Vec2::new(room.left(), room.bottom() - size),
                ];
                let index = self.corner.get();
                self.corner.set((index + 1) % corners.len());
                corners[index]
            }
        }
    }

    /// Move at most one step toward `target`; true once it is reached
    fn step_toward(&self, target: Vec2) -> bool {
        let rect = self.rect.get();
        let movement = target - rect.top_left();
        let distance = movement.length();
        let speed = self.config.speed;

        if distance > speed {
            self.rect.set(rect.at(rect.top_left() + movement.normalize() * speed));
            false
        } else {
            self.rect.set(rect.at(target));
            true
        }
    }
}

fn on_update(body: &Weak<BossBody>, f: fn(&BossBody, &mut Player)) -> impl Fn(&mut Player) + 'static {
    let body = body.clone();
    move |player: &mut Player| {
        if let Some(body) = body.upgrade() {
            f(&body, player);
        }
    }
}

fn on_input(body: &Weak<BossBody>, f: fn(&BossBody, &InputEvent)) -> impl Fn(&InputEvent) + 'static {
    let body = body.clone();
    move |input: &InputEvent| {
        if let Some(body) = body.upgrade() {
            f(&body, input);
        }
    }
}

fn on_enter(body: &Weak<BossBody>, f: fn(&BossBody)) -> impl Fn() + 'static {
    let body = body.clone();
    move || {
        if let Some(body) = body.upgrade() {
            f(&body);
        }
    }
}

/// A boss driven by a [`FiniteStateMachine`]
pub struct Boss {
    body: Rc<BossBody>,
    fsm: FiniteStateMachine<BossState, Player, InputEvent>,
    hit_bar: RefCell<Option<Subscription>>,
}

impl Boss {
    /// Create a boss waiting in `spec.room`
    ///
    /// # Errors
    /// Only if the state table itself is malformed
    pub fn new(bus: &EventBus, spec: BossSpec, config: &BossConfig) -> FsmResult<Self> {
        let center = spec.room.center();
        let body = Rc::new(BossBody {
            bus: bus.clone(),
            rect: Cell::new(Rect::new(center.x, center.y, config.size, config.size)),
            spec,
            config: config.clone(),
            prompt_shown: Cell::new(false),
            doors_closed: Cell::new(false),
            attacked_once: Cell::new(false),
            corner: Cell::new(0),
            target: Cell::new(None),
            state_since: Cell::new(bus.now()),
            pending: Cell::new(None),
            expired: Cell::new(false),
        });
        let weak = Rc::downgrade(&body);

        let fsm = FsmBuilder::<BossState, Player, InputEvent>::new(body.spec.name.clone())
            .add_state(
                BossState::Waiting,
                on_update(&weak, BossBody::waiting_update),
                on_input(&weak, BossBody::waiting_input),
            )
            .and_then(|b| {
                b.add_state_with_enter(
                    BossState::StartDialog,
                    |_| {},
                    |_| {},
                    on_enter(&weak, BossBody::start_dialog_enter),
                )
            })
            .and_then(|b| {
                b.add_state_with_enter(
                    BossState::Charge,
                    on_update(&weak, BossBody::charge_update),
                    |_| {},
                    on_enter(&weak, BossBody::charge_enter),
                )
            })
            .and_then(|b| {
                b.add_state_with_enter(
                    BossState::Attack,
                    on_update(&weak, BossBody::attack_update),
                    |_| {},
                    on_enter(&weak, BossBody::attack_enter),
                )
            })
            .and_then(|b| {
                b.add_state_with_enter(
                    BossState::Dying,
                    on_update(&weak, BossBody::dying_update),
                    |_| {},
                    on_enter(&weak, BossBody::dying_enter),
                )
            })
            .and_then(|b| {
                let name = body.spec.name.clone();
                b.add_transition_when(
                    BossState::Waiting,
                    BossState::StartDialog,
                    EcodeEvent::StartBossFight,
                    move |payload| payload.get_string("boss", "") == name,
                )
            })
            .and_then(|b| {
                b.add_transition(BossState::StartDialog, BossState::Charge, EcodeEvent::FinishedDialog)
            })
            .and_then(|b| b.add_transition(BossState::Charge, BossState::Dying, EcodeEvent::KillBoss))
            .and_then(|b| b.build(bus, BossState::Waiting))?;

        let key = bus.subscribe_weak(EcodeEvent::HitBar, &body, |body, _| body.hack());
        let hit_bar = bus.guard(EcodeEvent::HitBar, key);

        tracing::debug!("Spawned boss '{}' in {:?}", body.spec.name, body.spec.room);
        Ok(Self {
            body,
            fsm,
            hit_bar: RefCell::new(Some(hit_bar)),
        })
    }

    pub fn state(&self) -> BossState {
        self.fsm.state()
    }

    pub fn rect(&self) -> Rect {
        self.body.rect.get()
    }

    pub fn problem_slug(&self) -> &str {
        &self.body.spec.problem_slug
    }

    /// True while the player is close enough to start the fight
    pub fn key_prompt_shown(&self) -> bool {
        self.body.prompt_shown.get()
    }

    /// Tear down the state machine and the hit-bar listener
    pub fn destroy(&self) {
        if self.fsm.is_destroyed() {
            return;
        }
        self.fsm.destroy();
        self.hit_bar.borrow_mut().take();
        tracing::info!("Boss '{}' destroyed", self.body.spec.name);
    }
}

impl Entity for Boss {
    fn name(&self) -> &str {
        &self.body.spec.name
    }

    fn update(&self, player: &mut Player) {
        if !self.is_alive() {
            return;
        }
        if let Err(e) = self.fsm.update(player) {
            tracing::error!("{}: update failed: {}", self.name(), e);
            return;
        }
        if let Some(next) = self.body.pending.take() {
            if let Err(e) = self.fsm.set_state(next) {
                tracing::error!("{}: could not enter {:?}: {}", self.name(), next, e);
            }
        }
        if self.body.expired.get() {
            self.destroy();
        }
    }

    fn handle_input(&self, input: &InputEvent) {
        if !self.is_alive() {
            return;
        }
        if let Err(e) = self.fsm.handle_event(input) {
            tracing::error!("{}: input failed: {}", self.name(), e);
        }
    }

    fn is_alive(&self) -> bool {
        !self.fsm.is_destroyed()
    }
}
