//! Typed event payloads
//!
//! Provides strongly-typed views over the keyword payloads of common events.

use ecode_sdk::EcodeEvent;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{EventError, Payload};

/// Trait for typed game events
///
/// The struct's serde field names are the payload keys.
pub trait GameEvent: Serialize + DeserializeOwned {
    /// The event this payload belongs to
    const EVENT: EcodeEvent;

    /// Encode into a keyword payload
    fn to_payload(&self) -> Payload {
        serde_json::to_value(self)
            .ok()
            .and_then(Payload::from_value)
            .unwrap_or_default()
    }

    /// Decode from a keyword payload
    fn from_payload(payload: &Payload) -> Result<Self, EventError> {
        serde_json::from_value(payload.clone().into_value()).map_err(|source| {
            EventError::InvalidPayload {
                event: Self::EVENT,
                source,
            }
        })
    }
}

/// Open the dialog box with the given lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenDialog {
    pub lines: Vec<String>,
    #[serde(default)]
    pub current_line: usize,
}

impl GameEvent for OpenDialog {
    const EVENT: EcodeEvent = EcodeEvent::OpenDialog;
}

/// Show a new objective to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiveOrder {
    pub text: String,
}

impl GameEvent for GiveOrder {
    const EVENT: EcodeEvent = EcodeEvent::GiveOrder;
}

/// Shake the camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraShake {
    pub duration_ms: u64,
    #[serde(default = "default_intensity")]
    pub max_intensity: f32,
}

fn default_intensity() -> f32 {
    10.0
}

impl GameEvent for CameraShake {
    const EVENT: EcodeEvent = EcodeEvent::CameraShake;
}

/// Black the screen out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraBlackout {
    pub duration_ms: u64,
}

impl GameEvent for CameraBlackout {
    const EVENT: EcodeEvent = EcodeEvent::CameraBlackout;
}

/// Attempt to hack a boss; opens the boss's problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossHack {
    pub problem_slug: String,
}

impl GameEvent for BossHack {
    const EVENT: EcodeEvent = EcodeEvent::BossHack;
}

/// The judging service accepted a solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSolved {
    pub problem_slug: String,
}

impl GameEvent for ProblemSolved {
    const EVENT: EcodeEvent = EcodeEvent::ProblemSolved;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_dialog_keys() {
        let payload = OpenDialog {
            lines: vec!["first".into(), "second".into()],
            current_line: 0,
        }
        .to_payload();

        assert_eq!(payload.get_string_list("lines"), vec!["first", "second"]);
        assert_eq!(payload.get_int("current_line", -1), 0);
    }

    #[test]
    fn test_camera_shake_default_intensity() {
        let payload = Payload::new().with("duration_ms", 5000);
        let shake = CameraShake::from_payload(&payload).unwrap();
        assert_eq!(shake.duration_ms, 5000);
        assert_eq!(shake.max_intensity, 10.0);
    }

    #[test]
    fn test_mismatched_payload_is_an_error() {
        let payload = Payload::new().with("problem_slug", 42);
        let err = BossHack::from_payload(&payload).unwrap_err();
        assert!(matches!(
            err,
            EventError::InvalidPayload {
                event: EcodeEvent::BossHack,
                ..
            }
        ));
    }
}
