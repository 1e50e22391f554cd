//! Raw input events
//!
//! Discrete input delivered by the windowing layer. These are free-form
//! and distinct from [`EcodeEvent`](crate::EcodeEvent): entities receive them
//! through their state machine's input handler, not through the bus.

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    T,
    E,
    Space,
    Escape,
    Enter,
    Other(u32),
}

/// A single discrete input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
}

impl InputEvent {
    /// Returns the key if this is a key press of any key
    pub fn pressed(&self) -> Option<KeyCode> {
        match self {
            InputEvent::KeyDown(key) => Some(*key),
            InputEvent::KeyUp(_) => None,
        }
    }

    /// True when this is a press of `key`
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.pressed() == Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_matching() {
        let event = InputEvent::KeyDown(KeyCode::T);
        assert!(event.is_key_down(KeyCode::T));
        assert!(!event.is_key_down(KeyCode::E));
        assert!(!InputEvent::KeyUp(KeyCode::T).is_key_down(KeyCode::T));
    }
}
