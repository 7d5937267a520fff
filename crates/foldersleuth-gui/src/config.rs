/// Configuration persistence — recent directories and the last used root.
///
/// Stored as a small JSON file in the user's home directory. Load and
/// save failures are logged and otherwise ignored: a missing or corrupt
/// config must never stop the application from starting.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Maximum entries kept in the recent-directories list.
const MAX_RECENT: usize = 10;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Most recently used first.
    #[serde(default)]
    pub recent_directories: Vec<String>,
    #[serde(default)]
    pub last_directory: Option<String>,

    /// Where this config is persisted. `None` (the default) disables
    /// persistence, which is what tests construct.
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl AppConfig {
    /// Load the persisted config, falling back to defaults on any error.
    pub fn load() -> Self {
        let path = config_path();
        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<AppConfig>(&text) {
                Ok(config) => config,
                Err(err) => {
                    warn!("ignoring corrupt config {}: {err}", path.display());
                    AppConfig::default()
                }
            },
            // Missing file on first run is the normal case.
            Err(_) => AppConfig::default(),
        };
        config.path = Some(path);
        config
    }

    /// Persist the config. Failures are logged, never fatal.
    pub fn save(&self) {
        let Some(ref path) = self.path else {
            return;
        };
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = std::fs::write(path, json) {
                    warn!("could not save config {}: {err}", path.display());
                }
            }
            Err(err) => warn!("could not serialise config: {err}"),
        }
    }

    /// Record `path` as the most recently used directory: deduplicated,
    /// moved to the front, list capped at [`MAX_RECENT`].
    pub fn add_recent(&mut self, path: &str) {
        self.recent_directories.retain(|p| p != path);
        self.recent_directories.insert(0, path.to_string());
        self.recent_directories.truncate(MAX_RECENT);
        self.last_directory = Some(path.to_string());
    }

    #[cfg(test)]
    fn with_path(path: &std::path::Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
            ..Self::default()
        }
    }
}

fn config_path() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".foldersleuth.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn add_recent_moves_existing_to_front() {
        let mut config = AppConfig::default();
        config.add_recent("/data/a");
        config.add_recent("/data/b");
        config.add_recent("/data/a");
        assert_eq!(config.recent_directories, vec!["/data/a", "/data/b"]);
        assert_eq!(config.last_directory.as_deref(), Some("/data/a"));
    }

    #[test]
    fn recent_list_is_capped() {
        let mut config = AppConfig::default();
        for i in 0..15 {
            config.add_recent(&format!("/data/{i}"));
        }
        assert_eq!(config.recent_directories.len(), 10);
        assert_eq!(config.recent_directories[0], "/data/14");
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");

        let mut config = AppConfig::with_path(&path);
        config.add_recent("/data/projects");
        config.save();

        let text = std::fs::read_to_string(&path).unwrap();
        let loaded: AppConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded.recent_directories, vec!["/data/projects"]);
        assert_eq!(loaded.last_directory.as_deref(), Some("/data/projects"));
    }

    #[test]
    fn default_config_save_is_a_noop() {
        // No path set — must not panic or write anywhere.
        let config = AppConfig::default();
        config.save();
    }
}
