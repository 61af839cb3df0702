use std::{
    error::Error,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use crate::models::Settings;

const SETTINGS_FILE_NAME: &str = "settings.json";

/// Default settings location: `<config dir>/apk-puller/settings.json`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("apk-puller").join(SETTINGS_FILE_NAME))
}

/// Loads settings from `path`, or from the default location when `path` is `None`.
///
/// A missing file yields the defaults. A file that cannot be read or parsed is
/// reported and the defaults are used instead.
#[instrument(level = "debug")]
pub fn load_settings(path: Option<&Path>) -> Settings {
    let Some(path) = path.map(Path::to_path_buf).or_else(default_settings_path) else {
        debug!("No config directory available, using default settings");
        return Settings::default();
    };
    if !path.exists() {
        debug!(path = %path.display(), "Settings file not found, using defaults");
        return Settings::default();
    }

    match read_settings(&path) {
        Ok(settings) => {
            debug!(?settings, "Loaded settings");
            settings
        }
        Err(e) => {
            warn!(
                error = e.as_ref() as &dyn Error,
                path = %path.display(),
                "Failed to load settings, using defaults"
            );
            Settings::default()
        }
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let content = fs_err::read_to_string(path)?;
    serde_json::from_str(&content).context("Failed to parse settings file")
}
