// Global preferences for the rain (not tied to a session)
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::rain::render_loop::{
    LoopTuning, DEFAULT_FADE_ALPHA, DEFAULT_GLYPHS, DEFAULT_RESET_CHANCE,
};
use crate::state::AppResult;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GlobalPrefs {
    /// `None` leaves the decision to the environment.
    pub reduced_motion: Option<bool>,
    pub low_end: Option<bool>,
    pub reset_chance: f64,
    pub fade_alpha: f32,
    pub glyphs: String,
    pub seed: Option<u64>,
}

impl Default for GlobalPrefs {
    fn default() -> Self {
        Self {
            reduced_motion: None,
            low_end: None,
            reset_chance: DEFAULT_RESET_CHANCE,
            fade_alpha: DEFAULT_FADE_ALPHA,
            glyphs: DEFAULT_GLYPHS.to_string(),
            seed: None,
        }
    }
}

impl GlobalPrefs {
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".hackrain_prefs.json")
    }

    /// Reads prefs from `path`; a missing or broken file yields defaults.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring malformed preferences");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "no preferences file, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn tuning(&self) -> LoopTuning {
        LoopTuning {
            reset_chance: self.reset_chance,
            fade_alpha: self.fade_alpha,
            glyphs: self.glyphs.chars().filter(|c| !c.is_whitespace()).collect(),
            seed: self.seed,
        }
        .sanitized()
    }
}

struct PrefsCell {
    path: PathBuf,
    prefs: RwLock<GlobalPrefs>,
}

static GLOBAL_PREFS: OnceCell<PrefsCell> = OnceCell::new();

/// Loads prefs from `path` (or the default location). Later calls keep the
/// first load.
pub fn init_global_prefs(path: Option<PathBuf>) {
    GLOBAL_PREFS.get_or_init(|| {
        let path = path.unwrap_or_else(GlobalPrefs::default_path);
        let prefs = GlobalPrefs::load(&path);
        PrefsCell {
            path,
            prefs: RwLock::new(prefs),
        }
    });
}

fn cell() -> &'static PrefsCell {
    GLOBAL_PREFS.get_or_init(|| {
        let path = GlobalPrefs::default_path();
        PrefsCell {
            prefs: RwLock::new(GlobalPrefs::load(&path)),
            path,
        }
    })
}

pub fn global_prefs() -> RwLockReadGuard<'static, GlobalPrefs> {
    cell().prefs.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn global_prefs_mut() -> RwLockWriteGuard<'static, GlobalPrefs> {
    cell().prefs.write().unwrap_or_else(PoisonError::into_inner)
}

/// Writes the current prefs back to where they were loaded from.
pub fn save_global_prefs() -> AppResult<()> {
    let cell = cell();
    let prefs = cell.prefs.read().unwrap_or_else(PoisonError::into_inner);
    prefs.save(&cell.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = GlobalPrefs::load(&dir.path().join("absent.json"));
        assert_eq!(prefs, GlobalPrefs::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let prefs = GlobalPrefs {
            reduced_motion: Some(true),
            seed: Some(9),
            ..GlobalPrefs::default()
        };
        prefs.save(&path).unwrap();
        assert_eq!(GlobalPrefs::load(&path), prefs);
    }

    #[test]
    fn test_partial_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{ "low_end": true }"#).unwrap();
        let prefs = GlobalPrefs::load(&path);
        assert_eq!(prefs.low_end, Some(true));
        assert_eq!(prefs.reset_chance, DEFAULT_RESET_CHANCE);

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(GlobalPrefs::load(&path), GlobalPrefs::default());
    }

    #[test]
    fn test_tuning_from_prefs() {
        let prefs = GlobalPrefs {
            reset_chance: 5.0,
            glyphs: "0 1".to_string(),
            ..GlobalPrefs::default()
        };
        let tuning = prefs.tuning();
        assert_eq!(tuning.reset_chance, 1.0);
        assert_eq!(tuning.glyphs, vec!['0', '1']);
    }
}
