//! Config path resolution
//!
//! Handles resolving paths for configuration files based on the game's
//! install location.

use std::path::PathBuf;

use super::{ConfigError, ConfigResult};

/// Environment variable that overrides the base directory
pub const HOME_ENV: &str = "ECODE_HOME";

/// Returns the ecode base directory.
///
/// Uses `$ECODE_HOME` when set, otherwise the directory containing the
/// running executable.
pub fn ecode_base_dir() -> ConfigResult<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }

    let exe = std::env::current_exe().map_err(ConfigError::IoError)?;
    exe.parent()
        .map(PathBuf::from)
        .ok_or(ConfigError::NoConfigDirectory)
}

/// Returns the base configs directory.
///
/// Path: `{base}/configs/`
pub fn configs_dir() -> ConfigResult<PathBuf> {
    Ok(ecode_base_dir()?.join("configs"))
}

/// Returns the game config path.
///
/// Path: `{base}/configs/game.toml`
pub fn game_config_path() -> ConfigResult<PathBuf> {
    Ok(configs_dir()?.join("game.toml"))
}
