//! Seating configuration.
//!
//! Loaded from `~/.seating/config.toml`. A missing file means defaults.
//!
//! ```toml
//! seed = 7
//!
//! [weights]
//! department-mix = 0.8
//! interest-affinity = 0.3
//! job-level-diversity = 0.5
//! goal-compatibility = 0.4
//! repeat-avoidance = 0.9
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::MatchingWeights;

/// Seating configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Weights used for events that have none of their own.
    pub weights: MatchingWeights,

    /// Fixed shuffle seed, for reproducible runs.
    pub seed: Option<u64>,
}

impl Config {
    /// Load config from `~/.seating/config.toml`.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults if it doesn't exist.
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.seating/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".seating").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config.weights, MatchingWeights::default());
        assert_eq!(config.seed, None);
    }

    #[test]
    fn partial_weights_keep_remaining_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "seed = 7\n\n[weights]\nrepeat-avoidance = 2.5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.seed, Some(7));
        assert!((config.weights.repeat_avoidance - 2.5).abs() < f64::EPSILON);
        assert!((config.weights.department_mix - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_weight_key_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[weights]\nrepeatAvoidance = 0.0\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn invalid_file_names_the_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "seed = \"soon\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("config.toml"));
    }
}
