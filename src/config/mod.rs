pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

const CONFIG_FILE_NAME: &str = ".costpilot.toml";

/// Get the global config file path (~/.costpilot.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Load configuration.
///
/// An explicitly passed `--config` file must exist and parse; anything
/// else is an error. Discovered config files (project-local first, then
/// global) degrade gracefully: a broken one logs a warning and falls
/// through to defaults rather than aborting the run.
pub fn load_config(explicit: Option<&Path>) -> Result<types::Config> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config = toml::from_str(&content).map_err(|e| ConfigError::ParsingFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        return Ok(config);
    }

    for candidate in [Some(PathBuf::from(CONFIG_FILE_NAME)), global_config_path()]
        .into_iter()
        .flatten()
    {
        if !candidate.exists() {
            continue;
        }
        match fs::read_to_string(&candidate) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => return Ok(config),
                Err(e) => log::warn!(
                    "ignoring unparsable config '{}': {}",
                    candidate.display(),
                    e
                ),
            },
            Err(e) => log::warn!("ignoring unreadable config '{}': {}", candidate.display(), e),
        }
    }

    Ok(types::Config::default())
}
