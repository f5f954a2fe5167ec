//! Preference store persisted to disk
//!
//! Holds the handful of user preference keys the app remembers between runs
//! (last loaded team, favourite players) as a JSON file in an XDG-compliant
//! config directory.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// File name used inside the preference directory
const PREFS_FILE: &str = "prefs.json";

/// Errors that can occur when saving preferences
#[derive(Debug, Error)]
pub enum PrefsError {
    /// Directory creation or file write failed
    #[error("Failed to write preferences: {0}")]
    Io(#[from] std::io::Error),

    /// Preferences could not be serialized
    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Stored user preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// FPL team id loaded most recently
    #[serde(default)]
    pub last_team_id: Option<u32>,
    /// Player ids marked as favourites
    #[serde(default)]
    pub favourite_players: Vec<u32>,
    /// When the preferences were last written
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Preferences {
    /// Toggles a favourite, returning whether the player is now a favourite
    pub fn toggle_favourite(&mut self, player_id: u32) -> bool {
        if let Some(index) = self.favourite_players.iter().position(|id| *id == player_id) {
            self.favourite_players.remove(index);
            false
        } else {
            self.favourite_players.push(player_id);
            true
        }
    }

    pub fn is_favourite(&self, player_id: u32) -> bool {
        self.favourite_players.contains(&player_id)
    }
}

/// Reads and writes [`Preferences`] to disk
///
/// Uses `~/.config/fplhelp/` on Linux, or the equivalent platform path.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    /// Directory holding the preference file
    dir: PathBuf,
}

impl PreferenceStore {
    /// Creates a store in the platform config directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "fplhelp")?;
        Some(Self {
            dir: project_dirs.config_dir().to_path_buf(),
        })
    }

    /// Creates a store rooted at a custom directory
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(PREFS_FILE)
    }

    /// Loads preferences, falling back to defaults when missing or unreadable
    pub fn load(&self) -> Preferences {
        fs::read_to_string(self.path())
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Writes preferences, creating the directory if needed
    pub fn save(&self, prefs: &Preferences) -> Result<(), PrefsError> {
        fs::create_dir_all(&self.dir)?;

        let mut prefs = prefs.clone();
        prefs.updated_at = Some(Utc::now());

        let json = serde_json::to_string_pretty(&prefs)?;
        fs::write(self.path(), json)?;
        Ok(())
    }
}
