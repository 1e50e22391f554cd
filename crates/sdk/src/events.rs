//! Named game events
//!
//! Every occurrence the game announces on the event bus is one of these.
//! The set is closed: producers and consumers agree on the variant, and the
//! keyword payload each variant carries is a contract between them.

use std::fmt;

macro_rules! ecode_events {
    ($( $(#[$meta:meta])* $variant:ident => $name:literal, )*) => {
        /// A named game event
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum EcodeEvent {
            $( $(#[$meta])* $variant, )*
        }

        impl EcodeEvent {
            /// Every event in declaration order
            pub const ALL: &'static [EcodeEvent] = &[ $( EcodeEvent::$variant, )* ];

            /// Stable snake_case name, used in log output
            pub const fn name(self) -> &'static str {
                match self {
                    $( EcodeEvent::$variant => $name, )*
                }
            }

            /// Look up an event by its snake_case name
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $name => Some(EcodeEvent::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

ecode_events! {
    /// The player changed tile
    PlayerMoved => "player_moved",
    /// The current level is over; payload-free
    LevelEnded => "level_ended",
    EnteredDanceFloor => "entered_dance_floor",
    LeftDanceFloor => "left_dance_floor",
    /// Player health reached zero
    PlayerDied => "player_died",
    /// `problem_slug`
    OpenProblem => "open_problem",
    /// `problem_slug`
    ProblemSolved => "problem_solved",
    CheckProblems => "check_problems",
    CheckedProblems => "checked_problems",
    UserLogin => "user_login",
    /// `problem_slug`
    GetProblemDescription => "get_problem_description",
    PauseGame => "pause_game",
    PauseMenu => "pause_menu",
    UnpauseGame => "unpause_game",
    /// `lines`, `current_line`
    OpenDialog => "open_dialog",
    FinishedDialog => "finished_dialog",
    OpenNote => "open_note",
    OpenPseudocode => "open_pseudocode",
    OpenDownload => "open_download",
    OpenKeyPrompt => "open_key_prompt",
    OpenWasd => "open_wasd",
    OpenBar => "open_bar",
    /// The hack bar was hit while the boss is vulnerable
    HitBar => "hit_bar",
    OpenPin => "open_pin",
    OpenDoor => "open_door",
    CloseDoors => "close_doors",
    /// `text`
    GiveOrder => "give_order",
    /// `duration_ms`, `max_intensity`
    CameraShake => "camera_shake",
    /// `duration_ms`
    CameraBlackout => "camera_blackout",
    CameraAlarm => "camera_alarm",
    NextLevel => "next_level",
    LoadLevel => "load_level",
    StartBossFight => "start_boss_fight",
    BossCharge => "boss_charge",
    BossAttack => "boss_attack",
    /// `problem_slug`
    BossHack => "boss_hack",
    KillBoss => "kill_boss",
}

impl fmt::Display for EcodeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for event in EcodeEvent::ALL {
            assert_eq!(EcodeEvent::from_name(event.name()), Some(*event));
        }
        assert_eq!(EcodeEvent::from_name("not_an_event"), None);
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = EcodeEvent::ALL.iter().map(|e| e.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EcodeEvent::ALL.len());
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(EcodeEvent::KillBoss.to_string(), "kill_boss");
    }
}
