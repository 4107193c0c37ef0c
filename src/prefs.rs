//! Persisted visitor preferences: audience targeting and display language.
//!
//! A small key-value document read once at startup and written back on every
//! change. The player core never touches it; hosts use it to pick copy and
//! to default their motion/data policy flags.

use std::path::{Path, PathBuf};

use crate::foundation::error::{FilmstripError, FilmstripResult};

/// Which visitor profile the surrounding copy is addressed to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Hiring-side visitor.
    #[default]
    Recruiter,
    /// Prospective client.
    Client,
}

/// Display language.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// French.
    Fr,
}

/// The persisted preference document.
///
/// Field names are the well-known storage keys; unknown keys in an existing
/// file are ignored on load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Audience choice, stored under its well-known key.
    #[serde(rename = "portfolio_audience_mode")]
    pub audience: Audience,
    /// Language choice, stored under its well-known key.
    #[serde(rename = "portfolio_language_mode")]
    pub language: Language,
}

/// File-backed preference store: read once, write-through on change.
#[derive(Clone, Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferenceStore {
    /// Load preferences from `path`.
    ///
    /// A missing or unreadable file yields defaults; so does a corrupt one,
    /// which will be overwritten on the next change.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::debug!(path = %path.display(), error = %err, "corrupt preferences, using defaults");
                Preferences::default()
            }),
            Err(_) => Preferences::default(),
        };
        Self { path, prefs }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current audience.
    pub fn audience(&self) -> Audience {
        self.prefs.audience
    }

    /// Current language.
    pub fn language(&self) -> Language {
        self.prefs.language
    }

    /// Current document.
    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    /// Set and persist the audience.
    pub fn set_audience(&mut self, audience: Audience) -> FilmstripResult<()> {
        self.prefs.audience = audience;
        self.persist()
    }

    /// Set and persist the language.
    pub fn set_language(&mut self, language: Language) -> FilmstripResult<()> {
        self.prefs.language = language;
        self.persist()
    }

    fn persist(&self) -> FilmstripResult<()> {
        let json = serde_json::to_string_pretty(&self.prefs)
            .map_err(|e| FilmstripError::validation(format!("serializing preferences: {e}")))?;
        std::fs::write(&self.path, json).map_err(|e| {
            FilmstripError::validation(format!(
                "writing preferences to '{}': {e}",
                self.path.display()
            ))
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/prefs.rs"]
mod tests;
