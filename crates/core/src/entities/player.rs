//! The player character

use ecode_sdk::{InputEvent, KeyCode};

use crate::geometry::{Rect, Vec2};

/// Side length of the player sprite
pub const PLAYER_SIZE: f32 = 32.0;

/// Hit points with a fixed maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Remove `amount` hit points, stopping at zero
    pub fn lose(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }
}

/// Movement keys currently held
#[derive(Debug, Clone, Copy, Default)]
struct Held {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub rect: Rect,
    pub health: Health,
    /// Pixels per frame
    pub speed: f32,
    spawn: Vec2,
    held: Held,
}

impl Player {
    pub fn new(spawn: Vec2, max_health: u32) -> Self {
        Self {
            rect: Rect::new(spawn.x, spawn.y, PLAYER_SIZE, PLAYER_SIZE),
            health: Health::new(max_health),
            speed: 4.0,
            spawn,
            held: Held::default(),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.rect.top_left()
    }

    /// Step in `direction` at the player's speed
    pub fn walk(&mut self, direction: Vec2) {
        let step = direction.normalize() * self.speed;
        self.rect = self.rect.at(self.position() + step);
    }

    /// Track WASD presses and releases
    pub fn handle_input(&mut self, input: &InputEvent) {
        let (key, down) = match *input {
            InputEvent::KeyDown(key) => (key, true),
            InputEvent::KeyUp(key) => (key, false),
        };
        match key {
            KeyCode::W => self.held.up = down,
            KeyCode::S => self.held.down = down,
            KeyCode::A => self.held.left = down,
            KeyCode::D => self.held.right = down,
            _ => {}
        }
    }

    /// Direction of travel from the held keys
    pub fn heading(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
        Vec2::new(
            axis(self.held.left, self.held.right),
            axis(self.held.up, self.held.down),
        )
    }

    /// Walk one frame along the current heading
    pub fn update(&mut self) {
        let heading = self.heading();
        if heading != Vec2::default() {
            self.walk(heading);
        }
    }

    /// Back to the spawn point with full health, keys released
    pub fn respawn(&mut self) {
        self.rect = self.rect.at(self.spawn);
        self.health.restore();
        self.held = Held::default();
    }
}
