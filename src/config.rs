//! Lorekeeper configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main Lorekeeper configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LorekeeperConfig {
    /// Insight engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Numeric leak guard configuration
    #[serde(default)]
    pub guard: GuardConfig,
}

impl LorekeeperConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Render the configuration as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Insight engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound for a single store lookup, in milliseconds
    pub lookup_timeout_ms: u64,

    /// Number of most recent events the support tone treats as "recent"
    pub recent_event_window: usize,

    /// Role tags counted as supportive by the support tone
    pub supporter_roles: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: 2000,
            recent_event_window: 10,
            supporter_roles: vec![
                "supporter".to_string(),
                "helper".to_string(),
                "mentor".to_string(),
                "ally".to_string(),
            ],
        }
    }
}

impl EngineConfig {
    /// Per-lookup timeout as a `Duration`
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// Reject settings that would make every lookup degrade.
    pub fn validate(&self) -> Result<()> {
        if self.lookup_timeout_ms == 0 {
            return Err(Error::Config(
                "engine.lookup_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.recent_event_window == 0 {
            return Err(Error::Config(
                "engine.recent_event_window must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Numeric leak guard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Scan finished insight records before returning them
    pub enabled: bool,

    /// Reject any digit run, not only runs reproducing source values
    pub strict_digits: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strict_digits: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LorekeeperConfig::default();
        assert_eq!(config.engine.lookup_timeout_ms, 2000);
        assert_eq!(config.engine.recent_event_window, 10);
        assert_eq!(config.engine.supporter_roles.len(), 4);
        assert!(config.guard.enabled);
        assert!(!config.guard.strict_digits);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: LorekeeperConfig = toml::from_str(
            r#"
            [engine]
            lookup_timeout_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.lookup_timeout_ms, 500);
        assert_eq!(config.engine.recent_event_window, 10);
        assert!(config.guard.enabled);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[engine]\nrecent_event_window = 5\nsupporter_roles = [\"guide\"]\n\n[guard]\nstrict_digits = true"
        )
        .unwrap();

        let config = LorekeeperConfig::from_file(file.path()).unwrap();
        assert_eq!(config.engine.recent_event_window, 5);
        assert_eq!(config.engine.supporter_roles, vec!["guide"]);
        assert!(config.guard.strict_digits);
    }

    #[test]
    fn test_from_file_rejects_zero_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\nlookup_timeout_ms = 0").unwrap();

        let err = LorekeeperConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file_missing() {
        let err = LorekeeperConfig::from_file("/nonexistent/lorekeeper.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = LorekeeperConfig::default();
        let rendered = config.to_toml_string().unwrap();
        assert!(rendered.contains("lookup_timeout_ms"));
        let parsed: LorekeeperConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.engine.supporter_roles, config.engine.supporter_roles);
    }

    #[test]
    fn test_lookup_timeout_duration() {
        let config = EngineConfig {
            lookup_timeout_ms: 750,
            ..Default::default()
        };
        assert_eq!(config.lookup_timeout(), Duration::from_millis(750));
    }
}
