//! Persisted people preferences.
//!
//! Favorites and a bounded most-recent-first list of people the user
//! assigned, stored as a small TOML file under the platform config
//! directory. Both lists only influence picker ordering; they never gate
//! any mutation.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use planboard_core::{Error, PersonId, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on the recently-used list.
const RECENT_LIMIT: usize = 12;

/// Favorite and recently used people for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeoplePrefs {
    /// Explicitly starred people.
    #[serde(default)]
    favorites: BTreeSet<PersonId>,
    /// Recently assigned people, most recent first.
    #[serde(default)]
    recent: Vec<PersonId>,
}

impl PeoplePrefs {
    /// Toggles a favorite; returns whether the person is now favorite.
    pub fn toggle_favorite(&mut self, person: PersonId) -> bool {
        if self.favorites.remove(&person) {
            false
        } else {
            self.favorites.insert(person);
            true
        }
    }

    /// Whether a person is starred.
    pub fn is_favorite(&self, person: PersonId) -> bool {
        self.favorites.contains(&person)
    }

    /// Starred people, sorted by id.
    pub fn favorites(&self) -> Vec<PersonId> {
        self.favorites.iter().copied().collect()
    }

    /// Moves a person to the front of the recently-used list.
    pub fn record_recent(&mut self, person: PersonId) {
        self.recent.retain(|existing| *existing != person);
        self.recent.insert(0, person);
        self.recent.truncate(RECENT_LIMIT);
    }

    /// Recently assigned people, most recent first.
    pub fn recent(&self) -> &[PersonId] {
        &self.recent
    }

    /// Loads preferences from disk; a missing file yields the default.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Writes preferences to disk, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Default location under the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform exposes no config directory.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|base| base.join("planboard").join("people.toml"))
            .ok_or_else(|| Error::Store("no config directory available".to_owned()))
    }
}
