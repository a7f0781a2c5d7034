use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::store::DEFAULT_HISTORY_FILE;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_REFERRER: &str = "https://github.com/routerchat/routerchat";
pub const DEFAULT_TITLE: &str = "routerchat";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_API_URL: &str = "OPENROUTER_API_URL";
pub const ENV_REFERRER: &str = "OPENROUTER_REFERRER";
pub const ENV_TITLE: &str = "OPENROUTER_TITLE";
pub const ENV_TIMEOUT_SECS: &str = "OPENROUTER_TIMEOUT_SECS";
pub const ENV_HISTORY_PATH: &str = "ROUTERCHAT_HISTORY";

/// Optional settings file at `<config_dir>/routerchat/config.json`.
///
/// Every field is optional; environment variables take precedence.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub referrer: Option<String>,
    pub title: Option<String>,
    pub timeout_secs: Option<u64>,
    pub history_path: Option<PathBuf>,
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&config_content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("routerchat").join("config.json"))
    }
}

/// Resolved startup settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: String,
    pub api_url: String,
    pub referrer: String,
    pub title: String,
    pub timeout: Duration,
    pub history_path: PathBuf,
}

impl Settings {
    /// Reads the process environment on top of the config file.
    ///
    /// An absent config file, or no config directory at all, means defaults.
    /// A config file that exists but cannot be read or parsed is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config_path = Config::get_config_path().ok();
        Self::load(config_path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Loads the config file at `config_path`, if any, and resolves `env`
    /// over it.
    pub fn load<F>(config_path: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match config_path {
            Some(path) => Config::load_from(path)?,
            None => {
                tracing::debug!("no config directory; using defaults");
                Config::default()
            }
        };
        Self::resolve(config, env)
    }

    /// Merges `env` over `config` over the built-in defaults. Empty values
    /// count as unset.
    pub fn resolve<F>(config: Config, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let api_key = lookup(ENV_API_KEY)
            .or(config.api_key.filter(|key| !key.trim().is_empty()))
            .ok_or(ConfigError::MissingApiKey)?;

        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) => secs,
                Err(_) => return Err(ConfigError::InvalidTimeout { value }),
            },
            None => config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        // A zero timeout would fail every request immediately
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                value: timeout_secs.to_string(),
            });
        }

        Ok(Self {
            api_key,
            api_url: lookup(ENV_API_URL)
                .or(config.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            referrer: lookup(ENV_REFERRER)
                .or(config.referrer)
                .unwrap_or_else(|| DEFAULT_REFERRER.to_string()),
            title: lookup(ENV_TITLE)
                .or(config.title)
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            history_path: lookup(ENV_HISTORY_PATH)
                .map(PathBuf::from)
                .or(config.history_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = Settings::resolve(Config::default(), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));

        let err = Settings::resolve(Config::default(), env_of(&[(ENV_API_KEY, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let settings =
            Settings::resolve(Config::default(), env_of(&[(ENV_API_KEY, "sk-test")])).unwrap();

        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.referrer, DEFAULT_REFERRER);
        assert_eq!(settings.title, DEFAULT_TITLE);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(settings.history_path, PathBuf::from("chat_history.json"));
    }

    #[test]
    fn env_overrides_config_file() {
        let config = Config {
            api_key: Some("from-file".to_string()),
            api_url: Some("https://file.example/v1".to_string()),
            title: Some("File Title".to_string()),
            timeout_secs: Some(30),
            ..Config::default()
        };
        let env = env_of(&[
            (ENV_API_URL, "https://env.example/v1"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_HISTORY_PATH, "/tmp/history.json"),
        ]);

        let settings = Settings::resolve(config, env).unwrap();

        assert_eq!(settings.api_key, "from-file");
        assert_eq!(settings.api_url, "https://env.example/v1");
        assert_eq!(settings.title, "File Title");
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.history_path, PathBuf::from("/tmp/history.json"));
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let env = env_of(&[(ENV_API_KEY, "k"), (ENV_TIMEOUT_SECS, "soon")]);
        let err = Settings::resolve(Config::default(), env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { value } if value == "soon"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let env = env_of(&[(ENV_API_KEY, "k"), (ENV_TIMEOUT_SECS, "0")]);
        let err = Settings::resolve(Config::default(), env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { value } if value == "0"));

        let config = Config {
            timeout_secs: Some(0),
            ..Config::default()
        };
        let err = Settings::resolve(config, env_of(&[(ENV_API_KEY, "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { value } if value == "0"));
    }

    #[test]
    fn malformed_config_file_is_not_mistaken_for_missing_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "api_key": "sk-real", }"#).unwrap();

        let err = Settings::load(Some(&path), env_of(&[])).unwrap_err();

        assert!(matches!(&err, ConfigError::Parse { path: p, .. } if *p == path));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn config_file_supplies_api_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "api_key": "sk-real" }"#).unwrap();

        let settings = Settings::load(Some(&path), env_of(&[])).unwrap();
        assert_eq!(settings.api_key, "sk-real");

        let absent = dir.path().join("absent.json");
        let err = Settings::load(Some(&absent), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn config_file_loads_partial_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "referrer": "https://me.example" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.referrer.as_deref(), Some("https://me.example"));
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn absent_config_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config, Config::default());
    }
}
