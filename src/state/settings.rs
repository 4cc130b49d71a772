//! Completion settings and their JSON persistence

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::SettingsError;

/// System sounds that can be picked for the completion chime
pub const AVAILABLE_SOUNDS: [&str; 14] = [
    "Basso", "Blow", "Bottle", "Frog", "Funk", "Glass", "Hero",
    "Morse", "Ping", "Pop", "Purr", "Sosumi", "Submarine", "Tink",
];

pub const DEFAULT_SOUND: &str = "Glass";

/// What happens when a timer completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sound_enabled: bool,
    pub notification_enabled: bool,
    pub flash_enabled: bool,
    pub sound_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            notification_enabled: true,
            flash_enabled: false,
            sound_name: DEFAULT_SOUND.to_string(),
        }
    }
}

/// Partial update where absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    pub sound_enabled: Option<bool>,
    pub notification_enabled: Option<bool>,
    pub flash_enabled: Option<bool>,
    pub sound_name: Option<String>,
}

/// Whether `name` is one of [`AVAILABLE_SOUNDS`]
pub fn is_available_sound(name: &str) -> bool {
    AVAILABLE_SOUNDS.contains(&name)
}

impl Settings {
    /// Merge a patch, rejecting it whole if it names an unknown sound
    pub fn apply(&mut self, patch: SettingsPatch) -> Result<(), SettingsError> {
        if let Some(name) = patch.sound_name.as_deref().filter(|n| !is_available_sound(n)) {
            return Err(SettingsError::UnknownSound(name.to_string()));
        }

        if let Some(v) = patch.sound_enabled {
            self.sound_enabled = v;
        }
        if let Some(v) = patch.notification_enabled {
            self.notification_enabled = v;
        }
        if let Some(v) = patch.flash_enabled {
            self.flash_enabled = v;
        }
        if let Some(v) = patch.sound_name {
            self.sound_name = v;
        }
        Ok(())
    }

    /// Replace an unknown sound name with the default
    fn normalized(mut self) -> Self {
        if !is_available_sound(&self.sound_name) {
            warn!("Unknown sound {:?} in settings, using {}", self.sound_name, DEFAULT_SOUND);
            self.sound_name = DEFAULT_SOUND.to_string();
        }
        self
    }
}

/// Settings file on disk
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, writing defaults on first launch
    ///
    /// A corrupt or unreadable file is logged and replaced by defaults in
    /// memory only; the file itself is not touched.
    pub fn load(&self) -> Settings {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<Settings>(&content) {
                Ok(settings) => settings.normalized(),
                Err(e) => {
                    warn!("Ignoring corrupt settings at {}: {}", self.path.display(), e);
                    Settings::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No settings at {}, writing defaults", self.path.display());
                let settings = Settings::default();
                if let Err(e) = self.save(&settings) {
                    warn!("Failed to write default settings: {}", e);
                }
                settings
            }
            Err(e) => {
                warn!("Failed to read settings at {}: {}", self.path.display(), e);
                Settings::default()
            }
        }
    }

    /// Atomically replace the settings file
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| SettingsError::NoParent(self.path.clone()))?;
        let io_err = |source| SettingsError::Io { path: self.path.clone(), source };

        fs::create_dir_all(dir).map_err(io_err)?;
        let content = serde_json::to_string_pretty(settings)?;

        let mut temp_file = NamedTempFile::new_in(dir).map_err(io_err)?;
        temp_file.write_all(content.as_bytes()).map_err(io_err)?;
        temp_file.as_file().sync_all().map_err(io_err)?;
        temp_file.persist(&self.path).map_err(|e| io_err(e.error))?;

        Ok(())
    }
}
