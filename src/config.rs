use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app_dirs::AppDirs;
use crate::countdown::Countdown;
use crate::error::Result;

/// User preferences carried between runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Preferences {
    pub name: String,
    pub countdown: Countdown,
}

/// On-disk shape of the preferences file. `TesterName` is an older spelling
/// of `Name` that is still read but never written.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredPreferences {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "TesterName", skip_serializing)]
    tester_name: Option<String>,
    #[serde(rename = "TimerHours")]
    timer_hours: i64,
    #[serde(rename = "TimerMinutes")]
    timer_minutes: i64,
    #[serde(rename = "TimerSeconds")]
    timer_seconds: i64,
    #[serde(rename = "IsCountdownEnabled")]
    is_countdown_enabled: bool,
}

fn clamp_component(v: i64) -> u32 {
    u32::try_from(v.max(0)).unwrap_or(u32::MAX)
}

impl From<StoredPreferences> for Preferences {
    fn from(stored: StoredPreferences) -> Self {
        Self {
            name: stored.name.or(stored.tester_name).unwrap_or_default(),
            countdown: Countdown::new(
                stored.is_countdown_enabled,
                clamp_component(stored.timer_hours),
                clamp_component(stored.timer_minutes),
                clamp_component(stored.timer_seconds),
            ),
        }
    }
}

impl From<&Preferences> for StoredPreferences {
    fn from(prefs: &Preferences) -> Self {
        Self {
            name: Some(prefs.name.clone()),
            tester_name: None,
            timer_hours: prefs.countdown.hours.into(),
            timer_minutes: prefs.countdown.minutes.into(),
            timer_seconds: prefs.countdown.seconds.into(),
            is_countdown_enabled: prefs.countdown.enabled,
        }
    }
}

pub trait PreferencesStore {
    fn load(&self) -> Preferences;
    fn save(&self, prefs: &Preferences) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FilePreferencesStore {
    path: PathBuf,
}

impl FilePreferencesStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::preferences_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FilePreferencesStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferencesStore for FilePreferencesStore {
    /// Missing or malformed files yield defaults.
    fn load(&self) -> Preferences {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<StoredPreferences>(&bytes) {
                Ok(stored) => return stored.into(),
                Err(err) => debug!(path = %self.path.display(), %err, "ignoring malformed preferences"),
            }
        }
        Preferences::default()
    }

    fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&StoredPreferences::from(prefs))?;
        fs::write(&self.path, data)?;
        debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }
}

/// Keeps preferences in memory; nothing touches disk.
#[derive(Debug, Default)]
pub struct MemoryPreferencesStore {
    prefs: std::cell::RefCell<Preferences>,
}

impl MemoryPreferencesStore {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            prefs: std::cell::RefCell::new(prefs),
        }
    }
}

impl PreferencesStore for MemoryPreferencesStore {
    fn load(&self) -> Preferences {
        self.prefs.borrow().clone()
    }

    fn save(&self, prefs: &Preferences) -> Result<()> {
        *self.prefs.borrow_mut() = prefs.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_with(contents: &str) -> (tempfile::TempDir, FilePreferencesStore) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, contents).unwrap();
        (dir, FilePreferencesStore::with_path(path))
    }

    #[test]
    fn roundtrip_default_preferences() {
        let dir = tempdir().unwrap();
        let store = FilePreferencesStore::with_path(dir.path().join("preferences.json"));
        let prefs = Preferences::default();
        store.save(&prefs).unwrap();
        assert_eq!(store.load(), prefs);
    }

    #[test]
    fn save_and_load_custom_preferences() {
        let dir = tempdir().unwrap();
        let store = FilePreferencesStore::with_path(dir.path().join("nested/preferences.json"));
        let prefs = Preferences {
            name: "Lin".into(),
            countdown: Countdown::new(true, 0, 5, 30),
        };
        store.save(&prefs).unwrap();
        assert_eq!(store.load(), prefs);
    }

    #[test]
    fn writes_expected_field_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let store = FilePreferencesStore::with_path(&path);
        store
            .save(&Preferences {
                name: "Ada".into(),
                countdown: Countdown::new(true, 1, 2, 3),
            })
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["Name"], "Ada");
        assert_eq!(value["TimerHours"], 1);
        assert_eq!(value["TimerMinutes"], 2);
        assert_eq!(value["TimerSeconds"], 3);
        assert_eq!(value["IsCountdownEnabled"], true);
        assert!(value.get("TesterName").is_none());
    }

    #[test]
    fn legacy_tester_name_is_a_fallback() {
        let (_dir, store) = store_with(r#"{"TesterName": "Old"}"#);
        assert_eq!(store.load().name, "Old");

        let (_dir, store) = store_with(r#"{"Name": "New", "TesterName": "Old"}"#);
        assert_eq!(store.load().name, "New");
    }

    #[test]
    fn missing_fields_default() {
        let (_dir, store) = store_with(r#"{"Name": "Only"}"#);
        let prefs = store.load();
        assert_eq!(prefs.name, "Only");
        assert_eq!(prefs.countdown, Countdown::disabled());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let (_dir, store) = store_with("{ not json");
        assert_eq!(store.load(), Preferences::default());

        let (_dir, store) = store_with(r#"{"TimerHours": "two"}"#);
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let store = FilePreferencesStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn timer_values_are_normalized_on_load() {
        let (_dir, store) = store_with(
            r#"{"TimerHours": -1, "TimerMinutes": 0, "TimerSeconds": 125, "IsCountdownEnabled": true}"#,
        );
        let cd = store.load().countdown;
        assert_eq!((cd.hours, cd.minutes, cd.seconds), (0, 2, 5));
        assert!(cd.enabled);
    }

    #[test]
    fn memory_store_keeps_last_save() {
        let store = MemoryPreferencesStore::default();
        let prefs = Preferences {
            name: "Mem".into(),
            countdown: Countdown::disabled(),
        };
        store.save(&prefs).unwrap();
        assert_eq!(store.load(), prefs);
    }
}
