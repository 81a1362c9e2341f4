//! Durable user preferences, independent of authentication state.
//!
//! Two small JSON files under the platform data directory: the flat
//! settings map and the theme flag (kept separate so a corrupt settings
//! file cannot take the theme down with it). Writes are write-through;
//! loads merge stored values over hardcoded defaults key by key, so a
//! missing or mangled file silently yields the defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

const SETTINGS_FILE: &str = "settings.json";
const THEME_FILE: &str = "theme.json";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl Default for ThemeMode {
    fn default() -> Self {
        Self::Dark
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Choice(String),
}

enum SettingKind {
    Toggle {
        default: bool,
    },
    Choice {
        options: &'static [&'static str],
        default: &'static str,
    },
}

struct SettingSpec {
    key: &'static str,
    kind: SettingKind,
}

const SETTINGS: &[SettingSpec] = &[
    SettingSpec {
        key: "darkMode",
        kind: SettingKind::Toggle { default: true },
    },
    SettingSpec {
        key: "language",
        kind: SettingKind::Choice {
            options: &["English", "Spanish", "French", "German"],
            default: "English",
        },
    },
    SettingSpec {
        key: "defaultModel",
        kind: SettingKind::Choice {
            options: &["ChatGPT-5", "Claude", "Gemini", "Perplexity"],
            default: "ChatGPT-5",
        },
    },
    SettingSpec {
        key: "showModelSuggestions",
        kind: SettingKind::Toggle { default: true },
    },
    SettingSpec {
        key: "emailNotifications",
        kind: SettingKind::Toggle { default: false },
    },
    SettingSpec {
        key: "processCompleteNotifications",
        kind: SettingKind::Toggle { default: true },
    },
    SettingSpec {
        key: "saveChatHistory",
        kind: SettingKind::Toggle { default: true },
    },
    SettingSpec {
        key: "shareUsageData",
        kind: SettingKind::Toggle { default: false },
    },
];

fn spec_for(key: &str) -> Option<&'static SettingSpec> {
    SETTINGS.iter().find(|spec| spec.key == key)
}

fn default_value(spec: &SettingSpec) -> PrefValue {
    match spec.kind {
        SettingKind::Toggle { default } => PrefValue::Bool(default),
        SettingKind::Choice { default, .. } => PrefValue::Choice(default.to_string()),
    }
}

/// A stored value counts only when it matches the key's expected shape.
fn accepts(spec: &SettingSpec, value: &PrefValue) -> bool {
    match (&spec.kind, value) {
        (SettingKind::Toggle { .. }, PrefValue::Bool(_)) => true,
        (SettingKind::Choice { options, .. }, PrefValue::Choice(choice)) => {
            options.contains(&choice.as_str())
        }
        _ => false,
    }
}

pub struct PreferenceStore {
    dir: PathBuf,
    values: BTreeMap<String, PrefValue>,
    theme: ThemeMode,
}

impl PreferenceStore {
    /// Opens the store in the platform-local data directory.
    pub fn open_default() -> Self {
        let dir = dirs::data_local_dir()
            .map(|dir| dir.join("versepoint"))
            .unwrap_or_else(|| PathBuf::from("cache").join("versepoint"));
        Self::open(dir)
    }

    /// Opens the store rooted at an explicit directory.
    pub fn open(dir: PathBuf) -> Self {
        let values = load_settings(&dir);
        let theme = load_theme(&dir);
        Self { dir, values, theme }
    }

    pub fn keys() -> impl Iterator<Item = &'static str> {
        SETTINGS.iter().map(|spec| spec.key)
    }

    pub fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(PrefValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    /// Write-through set. Unknown keys and values outside the key's shape
    /// (wrong type, or a choice not in the list) change nothing.
    pub fn set(&mut self, key: &str, value: PrefValue) -> Result<(), ClientError> {
        let spec = spec_for(key).ok_or_else(|| invalid(key, &value))?;
        if !accepts(spec, &value) {
            return Err(invalid(key, &value));
        }
        self.values.insert(key.to_string(), value);
        self.persist_settings();
        Ok(())
    }

    /// Flips a toggle key and persists; a choice key cannot be toggled.
    pub fn toggle(&mut self, key: &str) -> Result<bool, ClientError> {
        let spec = spec_for(key).ok_or_else(|| ClientError::InvalidPreference {
            key: key.to_string(),
            value: "<toggle>".to_string(),
        })?;
        if !matches!(spec.kind, SettingKind::Toggle { .. }) {
            return Err(ClientError::InvalidPreference {
                key: key.to_string(),
                value: "<toggle>".to_string(),
            });
        }
        let flipped = !self.get_bool(key).unwrap_or_default();
        self.values.insert(key.to_string(), PrefValue::Bool(flipped));
        self.persist_settings();
        Ok(flipped)
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
        self.persist_theme();
    }

    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.set_theme(self.theme.toggled());
        self.theme
    }

    fn persist_settings(&self) {
        write_json(&self.dir, SETTINGS_FILE, &self.values);
    }

    fn persist_theme(&self) {
        write_json(&self.dir, THEME_FILE, &self.theme);
    }
}

fn invalid(key: &str, value: &PrefValue) -> ClientError {
    let rendered = match value {
        PrefValue::Bool(b) => b.to_string(),
        PrefValue::Choice(s) => s.clone(),
    };
    ClientError::InvalidPreference {
        key: key.to_string(),
        value: rendered,
    }
}

fn load_settings(dir: &Path) -> BTreeMap<String, PrefValue> {
    let mut values: BTreeMap<String, PrefValue> = SETTINGS
        .iter()
        .map(|spec| (spec.key.to_string(), default_value(spec)))
        .collect();

    let Ok(raw) = fs::read_to_string(dir.join(SETTINGS_FILE)) else {
        return values;
    };
    let Ok(stored) = serde_json::from_str::<BTreeMap<String, PrefValue>>(&raw) else {
        tracing::warn!("settings file unreadable, using defaults");
        return values;
    };

    for (key, value) in stored {
        match spec_for(&key) {
            Some(spec) if accepts(spec, &value) => {
                values.insert(key, value);
            }
            _ => tracing::debug!(%key, "ignoring stored setting"),
        }
    }
    values
}

fn load_theme(dir: &Path) -> ThemeMode {
    fs::read_to_string(dir.join(THEME_FILE))
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

fn write_json<T: Serialize>(dir: &Path, file: &str, value: &T) {
    if let Err(err) = fs::create_dir_all(dir) {
        tracing::warn!(%err, "failed to create preference directory");
        return;
    }
    let rendered = match serde_json::to_string_pretty(value) {
        Ok(rendered) => rendered,
        Err(err) => {
            tracing::warn!(%err, "failed to serialize preferences");
            return;
        }
    };
    if let Err(err) = fs::write(dir.join(file), rendered) {
        tracing::warn!(%err, file, "failed to persist preferences");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> PreferenceStore {
        PreferenceStore::open(dir.path().to_path_buf())
    }

    #[test]
    fn missing_storage_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.get_bool("darkMode"), Some(true));
        assert_eq!(store.get_bool("emailNotifications"), Some(false));
        assert_eq!(
            store.get("language"),
            Some(PrefValue::Choice("English".into()))
        );
        assert_eq!(store.theme(), ThemeMode::Dark);
    }

    #[test]
    fn corrupt_storage_yields_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();
        fs::write(dir.path().join(THEME_FILE), "nonsense").unwrap();
        let store = store_in(&dir);
        for key in PreferenceStore::keys() {
            assert!(store.get(key).is_some(), "missing default for {key}");
        }
        assert_eq!(store.theme(), ThemeMode::Dark);
    }

    #[test]
    fn stored_values_of_the_wrong_shape_are_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"darkMode":"yes","language":"Klingon","saveChatHistory":false}"#,
        )
        .unwrap();
        let store = store_in(&dir);
        assert_eq!(store.get_bool("darkMode"), Some(true)); // wrong type dropped
        assert_eq!(
            store.get("language"),
            Some(PrefValue::Choice("English".into())) // not in options
        );
        assert_eq!(store.get_bool("saveChatHistory"), Some(false)); // valid override
    }

    #[test]
    fn set_validates_choice_membership() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store
            .set("defaultModel", PrefValue::Choice("Claude".into()))
            .unwrap();
        let err = store
            .set("defaultModel", PrefValue::Choice("AlphaGo".into()))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidPreference { .. }));
        assert_eq!(
            store.get("defaultModel"),
            Some(PrefValue::Choice("Claude".into()))
        );
    }

    #[test]
    fn toggle_flips_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert_eq!(store.toggle("shareUsageData").unwrap(), true);
        assert!(store.toggle("language").is_err());

        // Reopen: the flip survived, the rejected toggle did not.
        let reopened = store_in(&dir);
        assert_eq!(reopened.get_bool("shareUsageData"), Some(true));
        assert_eq!(
            reopened.get("language"),
            Some(PrefValue::Choice("English".into()))
        );
    }

    #[test]
    fn theme_round_trips_independently_of_settings() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert_eq!(store.toggle_theme(), ThemeMode::Light);

        let reopened = store_in(&dir);
        assert_eq!(reopened.theme(), ThemeMode::Light);
        assert_eq!(reopened.get_bool("darkMode"), Some(true)); // separate records
    }
}
