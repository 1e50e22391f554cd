//! Level flow and the per-frame loop
//!
//! [`World`] owns everything that lives in a level. Each call to
//! [`World::tick`] is one frame:
//!
//! 1. deliver due bus events
//! 2. apply a pending level change
//! 3. forward input and update entities, unless paused
//! 4. remove entities that are no longer alive

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use ecode_engine::FrameStats;
use ecode_sdk::{EcodeEvent, InputEvent};
use slotmap::{new_key_type, SlotMap};

use crate::config::GameConfig;
use crate::entities::{Entity, Player};
use crate::events::{CameraShake, EventBus, Payload, Subscription};
use crate::fsm::FsmResult;
use crate::geometry::Vec2;

new_key_type! {
    /// Handle to an entity in the world
    pub struct EntityKey;
}

/// Contents of a freshly loaded level
pub struct Level {
    pub spawn: Vec2,
    pub entities: Vec<Box<dyn Entity>>,
}

/// Builds a level from its name
pub type LevelLoader = Box<dyn Fn(&str, &EventBus, &GameConfig) -> FsmResult<Level>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelChange {
    Advance,
    Restart,
}

/// The part of the world bus callbacks can reach
struct Flow {
    bus: EventBus,
    camera_shake_ms: u64,
    paused: Cell<bool>,
    pending: Cell<Option<LevelChange>>,
}

impl Flow {
    fn pause(&self) {
        self.paused.set(true);
    }

    fn unpause(&self) {
        self.paused.set(false);
    }

    fn level_ended(&self) {
        tracing::info!("Level ended");
        self.bus.emit_typed(&CameraShake {
            duration_ms: self.camera_shake_ms,
            max_intensity: 10.0,
        });
        self.bus.emit_delayed(
            EcodeEvent::NextLevel,
            Duration::from_millis(self.camera_shake_ms),
            Payload::new(),
        );
    }

    fn next_level(&self) {
        self.pending.set(Some(LevelChange::Advance));
    }

    fn player_died(&self) {
        self.pending.set(Some(LevelChange::Restart));
    }
}

fn watch(bus: &EventBus, flow: &Rc<Flow>, event: EcodeEvent, handler: fn(&Flow)) -> Subscription {
    let key = bus.subscribe_weak(event, flow, move |flow, _| handler(flow));
    bus.guard(event, key)
}

pub struct World {
    bus: EventBus,
    config: GameConfig,
    loader: LevelLoader,
    player: Player,
    entities: SlotMap<EntityKey, Box<dyn Entity>>,
    level: Option<usize>,
    finished: bool,
    death_reported: bool,
    frames: FrameStats,
    flow: Rc<Flow>,
    _subscriptions: Vec<Subscription>,
}

impl World {
    /// Create the world and load the first level
    pub fn new(bus: EventBus, config: GameConfig, loader: LevelLoader) -> Self {
        let flow = Rc::new(Flow {
            bus: bus.clone(),
            camera_shake_ms: config.camera_shake_ms,
            paused: Cell::new(false),
            pending: Cell::new(None),
        });

        let handlers: [(EcodeEvent, fn(&Flow)); 5] = [
            (EcodeEvent::PauseGame, Flow::pause),
            (EcodeEvent::UnpauseGame, Flow::unpause),
            (EcodeEvent::LevelEnded, Flow::level_ended),
            (EcodeEvent::NextLevel, Flow::next_level),
            (EcodeEvent::PlayerDied, Flow::player_died),
        ];
        let subscriptions = handlers
            .into_iter()
            .map(|(event, handler)| watch(&bus, &flow, event, handler))
            .collect();

        let player = Player::new(Vec2::default(), config.player_health);
        let mut world = Self {
            bus,
            config,
            loader,
            player,
            entities: SlotMap::with_key(),
            level: None,
            finished: false,
            death_reported: false,
            frames: FrameStats::new(),
            flow,
            _subscriptions: subscriptions,
        };
        world.next_level();
        world
    }

    /// Run one frame
    pub fn tick(&mut self, inputs: &[InputEvent]) {
        self.frames.begin_frame();

        self.bus.update();
        self.apply_level_change();

        if !self.is_paused() && !self.finished {
            for input in inputs {
                self.player.handle_input(input);
                for entity in self.entities.values() {
                    entity.handle_input(input);
                }
            }

            self.player.update();
            for entity in self.entities.values() {
                entity.update(&mut self.player);
            }
            self.report_death();
        }

        self.reap();

        let elapsed = self.frames.end_frame();
        if elapsed > self.config.frame_budget() {
            tracing::warn!(
                "Frame {} took {}ms (budget {}ms)",
                self.frames.frame_count(),
                elapsed.as_millis(),
                self.config.frame_budget_ms
            );
        }
    }

    fn apply_level_change(&mut self) {
        match self.flow.pending.take() {
            Some(LevelChange::Advance) => self.next_level(),
            Some(LevelChange::Restart) => {
                if let Some(index) = self.level {
                    tracing::info!("Restarting level '{}'", self.config.levels[index]);
                    self.load_level(index);
                }
            }
            None => {}
        }
    }

    fn next_level(&mut self) {
        let next = self.level.map_or(0, |index| index + 1);
        if next >= self.config.levels.len() {
            tracing::info!("All levels complete");
            self.entities.clear();
            self.level = None;
            self.finished = true;
            return;
        }
        self.load_level(next);
    }

    fn load_level(&mut self, index: usize) {
        let name = self.config.levels[index].clone();
        self.entities.clear();

        match (self.loader)(&name, &self.bus, &self.config) {
            Ok(level) => {
                self.player = Player::new(level.spawn, self.config.player_health);
                for entity in level.entities {
                    self.entities.insert(entity);
                }
            }
            Err(e) => {
                tracing::error!("Failed to load level '{}': {}", name, e);
                self.player.respawn();
            }
        }

        self.level = Some(index);
        self.death_reported = false;
        tracing::info!("Loaded level '{}' with {} entities", name, self.entities.len());
        self.bus.emit(
            EcodeEvent::LoadLevel,
            Payload::new().with("level", &name).with("index", index),
        );
    }

    fn report_death(&mut self) {
        if self.player.health.is_dead() && !self.death_reported {
            self.death_reported = true;
            tracing::info!("Player died");
            self.bus.emit(EcodeEvent::PlayerDied, Payload::new());
        }
    }

    fn reap(&mut self) {
        self.entities.retain(|_, entity| {
            let alive = entity.is_alive();
            if !alive {
                tracing::debug!("Removing '{}'", entity.name());
            }
            alive
        });
    }

    /// Add an entity to the current level
    pub fn spawn(&mut self, entity: Box<dyn Entity>) -> EntityKey {
        self.entities.insert(entity)
    }

    /// Remove an entity, returning whether it was present
    pub fn despawn(&mut self, key: EntityKey) -> bool {
        self.entities.remove(key).is_some()
    }

    pub fn entity(&self, key: EntityKey) -> Option<&dyn Entity> {
        self.entities.get(key).map(|entity| entity.as_ref())
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Name of the level being played, `None` once every level is done
    pub fn current_level(&self) -> Option<&str> {
        self.level.map(|index| self.config.levels[index].as_str())
    }

    pub fn is_paused(&self) -> bool {
        self.flow.paused.get()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn frame_count(&self) -> u64 {
        self.frames.frame_count()
    }
}
