//! ecode headless runner
//!
//! Plays every configured level with a scripted player on a simulated clock.

mod levels;
mod script;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use ecode_core::engine::ManualClock;
use ecode_core::sdk::EcodeEvent;
use ecode_core::{EventBus, GameConfig, Payload, World};
use tracing_subscriber::EnvFilter;

use script::Script;

/// Simulated time per frame
const FRAME: Duration = Duration::from_millis(16);

/// Give up if the script has not finished by then
const MAX_FRAMES: u64 = 100_000;

fn main() {
    let (config, config_error) = match GameConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };

    let default_filter = if config.debug { "debug" } else { config.log_filter.as_str() };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init();

    if let Some(e) = config_error {
        tracing::warn!("Using default config: {}", e);
    }
    tracing::info!("ecode starting with {} levels", config.levels.len());

    let clock = ManualClock::new();
    let bus = EventBus::with_clock(clock.clone());
    let script = Script::attach(&bus);

    // Counts level loads, restarts included
    let loads = Rc::new(Cell::new(0u32));
    let _load_watch = {
        let loads = Rc::clone(&loads);
        bus.subscribe_guarded(EcodeEvent::LoadLevel, move |_| loads.set(loads.get() + 1))
    };
    let mut world = World::new(bus.clone(), config, Box::new(levels::load));

    let mut seen_loads = loads.get();
    let mut level_frame = 0;
    let mut level_end_sent = false;

    while !world.is_finished() && world.frame_count() < MAX_FRAMES {
        level_frame += 1;
        world.tick(&script.inputs(level_frame));
        clock.advance(FRAME);

        if loads.get() != seen_loads {
            seen_loads = loads.get();
            level_frame = 0;
            level_end_sent = false;
            continue;
        }

        if world.entity_count() == 0 && !level_end_sent {
            level_end_sent = true;
            bus.emit(EcodeEvent::LevelEnded, Payload::new());
        }
    }

    if !world.is_finished() {
        tracing::error!("Gave up after {} frames", world.frame_count());
    }
    ecode_core::shutdown(&world);
    script.finish();
}
