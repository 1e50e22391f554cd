//! Level layouts

use ecode_core::entities::{AttackPattern, Boss, BossSpec, Entity};
use ecode_core::geometry::{Rect, Vec2};
use ecode_core::{EventBus, FsmResult, GameConfig, Level};

/// Every level is a single boss room
pub const ROOM: Rect = Rect::new(0.0, 0.0, 640.0, 480.0);

/// Where the player starts, just inside the room's door
pub const SPAWN: Vec2 = Vec2::new(40.0, 224.0);

/// Build the named level
pub fn load(name: &str, bus: &EventBus, config: &GameConfig) -> FsmResult<Level> {
    let spec = match name {
        "tutorial" => BossSpec::new("Intern", ROOM, "two-sum").with_intro(vec![
            "Oh! A visitor.".to_string(),
            "Hit the bar while I'm charging and I'll show you a problem.".to_string(),
        ]),
        "level1" => BossSpec::new("Gatekeeper", ROOM, "valid-parentheses"),
        "level2" => BossSpec::new("Architect", ROOM, "merge-intervals"),
        _ => BossSpec::new("Overlord", ROOM, "lru-cache")
            .with_pattern(AttackPattern::Wander)
            .with_death_lines(vec!["I am overruled...".to_string()]),
    };

    let boss = Boss::new(bus, spec, &config.boss)?;
    Ok(Level {
        spawn: SPAWN,
        entities: vec![Box::new(boss) as Box<dyn Entity>],
    })
}
