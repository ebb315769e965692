use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Set once at startup by main() from the --data-dir argument.
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Call this from main() before any load/save operations.
pub fn set_data_dir(path: PathBuf) {
    let _ = DATA_DIR.set(path);
}

pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(dir) = DATA_DIR.get() {
        return Ok(dir.clone());
    }
    // Fallback when running tests or if set_data_dir was not called
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    Ok(cwd.join("config"))
}

/// A record stored as one JSON or YAML file in the data directory.
/// A missing file loads as `Default`.
pub trait Persistable: Sized + Default + Serialize + for<'de> Deserialize<'de> {
    fn filename() -> &'static str;
    fn is_json() -> bool;

    fn load() -> Result<Self> {
        Self::load_from(&get_data_dir()?)
    }

    fn save(&self) -> Result<()> {
        self.save_to(&get_data_dir()?)
    }

    /// Load from an explicit directory, bypassing the global `DATA_DIR`.
    fn load_from(dir: &Path) -> Result<Self> {
        let path = dir.join(Self::filename());
        if !path.exists() {
            debug!(path = %path.display(), "no file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::decode(&contents, &path)
    }

    /// Save to an explicit directory, bypassing the global `DATA_DIR`.
    fn save_to(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create dir {}", dir.display()))?;
        let path = dir.join(Self::filename());
        fs::write(&path, self.encode()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(path = %path.display(), "saved");
        Ok(())
    }

    fn decode(contents: &str, path: &Path) -> Result<Self> {
        if Self::is_json() {
            serde_json::from_str(contents)
                .with_context(|| format!("failed to parse JSON from {}", path.display()))
        } else {
            serde_norway::from_str(contents)
                .with_context(|| format!("failed to parse YAML from {}", path.display()))
        }
    }

    fn encode(&self) -> Result<String> {
        if Self::is_json() {
            serde_json::to_string_pretty(self).context("failed to serialize JSON")
        } else {
            serde_norway::to_string(self).context("failed to serialize YAML")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CardConfig, EntityState, HostState, TrackedEntity};
    use tempfile::TempDir;

    #[test]
    fn test_get_data_dir_returns_a_path() {
        // Either the fallback (cwd/config) or whatever a prior test set.
        assert!(get_data_dir().is_ok());
    }

    #[test]
    fn test_load_from_returns_default_when_file_missing() {
        let tmp = TempDir::new().unwrap();
        let loaded = HostState::load_from(tmp.path()).unwrap();
        assert_eq!(loaded, HostState::default());
        let loaded = CardConfig::load_from(tmp.path()).unwrap();
        assert_eq!(loaded, CardConfig::default());
    }

    #[test]
    fn test_host_state_save_to_load_from() {
        let tmp = TempDir::new().unwrap();
        let mut h = HostState::default();
        h.insert(
            "input_datetime.filter",
            EntityState::new("2025-06-01").with_attribute("friendly_name", "Filter"),
        );
        h.save_to(tmp.path()).unwrap();
        assert!(tmp.path().join("states.json").exists());
        let loaded = HostState::load_from(tmp.path()).unwrap();
        assert_eq!(loaded, h);
    }

    #[test]
    fn test_card_config_save_to_load_from() {
        let tmp = TempDir::new().unwrap();
        let c = CardConfig {
            title: "Chores".to_string(),
            entities: vec![TrackedEntity {
                frequency_days: Some(30),
                ..TrackedEntity::new("input_datetime.filter")
            }],
            show_months: true,
            ..Default::default()
        };
        c.save_to(tmp.path()).unwrap();
        let yaml = fs::read_to_string(tmp.path().join("config.yaml")).unwrap();
        assert!(yaml.contains("title: Chores"));
        assert_eq!(CardConfig::load_from(tmp.path()).unwrap(), c);
    }

    #[test]
    fn test_load_from_reports_parse_errors_with_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("states.json"), "{ not json").unwrap();
        let err = HostState::load_from(tmp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("states.json"));
    }

    #[test]
    fn test_save_to_creates_directory_if_missing() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        CardConfig::default().save_to(&nested).unwrap();
        assert_eq!(CardConfig::load_from(&nested).unwrap(), CardConfig::default());
    }
}
