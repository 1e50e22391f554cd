//! Configuration system for ecode
//!
//! This module provides:
//! - Type-safe config structs via serde
//! - TOML file format
//! - Auto-generation of default configs
//! - Manual reload capability
//!
//! # Example
//!
//! ```ignore
//! use ecode_core::GameConfig;
//!
//! let config = GameConfig::load().unwrap_or_default();
//! println!("Charge phase lasts {}ms", config.boss.charge_ms);
//! ```

mod loader;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use loader::{configs_dir, ecode_base_dir, game_config_path, HOME_ENV};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Could not determine config directory from the executable location
    #[error("Config directory not available - could not resolve base path")]
    NoConfigDirectory,
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Game configuration.
///
/// Loaded from `{base}/configs/game.toml`. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,

    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Frames slower than this are reported
    pub frame_budget_ms: u64,

    /// How long the camera shakes before the next level loads
    pub camera_shake_ms: u64,

    /// Level names, played in order
    pub levels: Vec<String>,

    /// Player health at the start of each level
    pub player_health: u32,

    pub boss: BossConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
            log_filter: "info".to_string(),
            frame_budget_ms: 16,
            camera_shake_ms: 5000,
            levels: ["tutorial", "level1", "level2", "level3"]
                .into_iter()
                .map(String::from)
                .collect(),
            player_health: 100,
            boss: BossConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load config from the default location, creating it if missing.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&game_config_path()?)
    }

    /// Load config from `path`, creating a default file if missing.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("Loaded game config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save_to(path)?;
            tracing::info!("Created default game config at {:?}", path);
            Ok(default)
        }
    }

    /// Save config to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&game_config_path()?)
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved game config to {:?}", path);
        Ok(())
    }

    /// Reload config from the default location.
    pub fn reload(&mut self) -> ConfigResult<()> {
        self.reload_from(&game_config_path()?)
    }

    /// Reload config from `path`.
    pub fn reload_from(&mut self, path: &Path) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded game config from {:?}", path);
        Ok(())
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.frame_budget_ms)
    }

    pub fn camera_shake(&self) -> Duration {
        Duration::from_millis(self.camera_shake_ms)
    }
}

/// Boss fight tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    /// Time spent charging before each attack
    pub charge_ms: u64,
    /// Length of one attack phase
    pub attack_ms: u64,
    /// Length of the dying animation before the boss is removed
    pub dying_ms: u64,
    /// Pixels moved per frame while attacking
    pub speed: f32,
    /// How far around the boss the key prompt appears
    pub prompt_margin: f32,
    /// Side length of the boss sprite
    pub size: f32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            charge_ms: 3000,
            attack_ms: 3000,
            dying_ms: 3000,
            speed: 10.0,
            prompt_margin: 50.0,
            size: 64.0,
        }
    }
}

impl BossConfig {
    pub fn charge(&self) -> Duration {
        Duration::from_millis(self.charge_ms)
    }

    pub fn attack(&self) -> Duration {
        Duration::from_millis(self.attack_ms)
    }

    pub fn dying(&self) -> Duration {
        Duration::from_millis(self.dying_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("ecode-config-test-{}-{}", std::process::id(), name))
            .join("game.toml")
    }

    #[test]
    fn test_game_config_default() {
        let config = GameConfig::default();
        assert_eq!(config.version, 1);
        assert!(!config.debug);
        assert_eq!(config.levels.len(), 4);
        assert_eq!(config.boss.charge(), Duration::from_secs(3));
    }

    #[test]
    fn test_game_config_serialize() {
        let config = GameConfig {
            debug: true,
            camera_shake_ms: 1234,
            ..GameConfig::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("debug = true"));
        assert!(toml_str.contains("camera_shake_ms = 1234"));
        assert!(toml_str.contains("[boss]"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            levels = ["only"]

            [boss]
            attack_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.levels, vec!["only"]);
        assert_eq!(config.boss.attack_ms, 5000);
        assert_eq!(config.boss.charge_ms, 3000);
        assert_eq!(config.frame_budget_ms, 16);
    }

    #[test]
    fn test_load_creates_default_then_reads_back() {
        let path = scratch_path("create");
        let _ = std::fs::remove_file(&path);

        let created = GameConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created, GameConfig::default());

        let mut changed = created.clone();
        changed.player_health = 9;
        changed.save_to(&path).unwrap();

        let mut reloaded = GameConfig::default();
        reloaded.reload_from(&path).unwrap();
        assert_eq!(reloaded.player_health, 9);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let path = scratch_path("invalid");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "version = \"one\"").unwrap();

        assert!(matches!(
            GameConfig::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
