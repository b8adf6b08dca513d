use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_URL: &str = "https://www.iqair.com/ru/uzbekistan/toshkent-shahri/tashkent";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub url: Url,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub stats_path: PathBuf,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            url: Url::parse(DEFAULT_URL).unwrap_or_else(|e| panic!("bad default url: {}", e)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 25,
            stats_path: PathBuf::from("air_bot_stats.json"),
        }
    }
}

impl Config {
    /// Reads a TOML file; a file that does not exist means all defaults.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no config at {}, using defaults", path.display());
                return Ok(Config::default());
            },
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            },
        };
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.url.as_str(), DEFAULT_URL);
        assert_eq!(config.timeout(), Duration::from_secs(25));
        assert_eq!(config.stats_path, PathBuf::from("air_bot_stats.json"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("airq.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "url = \"http://localhost:8080/tashkent\"").unwrap();
        writeln!(file, "timeout_secs = 3").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.url.as_str(), "http://localhost:8080/tashkent");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = \"soon\"").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse { .. })));
    }
}
