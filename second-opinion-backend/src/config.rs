use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
    /// SQLite file holding the notes. A leading `file:` (libsql-style URL) is accepted.
    pub const DB_FILE_NAME: &str = "DB_FILE_NAME";
    /// Base URL of an OpenAI-compatible API, without the `/chat/completions` suffix.
    pub const LLM_BASE_URL: &str = "LLM_BASE_URL";
    pub const LLM_API_KEY: &str = "LLM_API_KEY";
    pub const LLM_MODEL: &str = "LLM_MODEL";
    /// Optional upper bound on a whole generation request. Unset = no timeout.
    pub const LLM_TIMEOUT_SECS: &str = "LLM_TIMEOUT_SECS";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const BIND_ADDRESS: &str = "0.0.0.0";
    pub const DB_FILE_NAME: &str = "local.db";
    pub const LLM_BASE_URL: &str = "http://localhost:11434/v1";
    pub const LLM_API_KEY: &str = "not-needed";
    pub const LLM_MODEL: &str = "deepseek-r1:7b";
}

/// Connection settings for the inference endpoint
#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub db_path: PathBuf,
    pub llm: LlmConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get(env_vars::PORT) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("{} is not a valid port ({:?}), using {}", env_vars::PORT, raw, defaults::PORT);
                defaults::PORT
            }),
            None => defaults::PORT,
        };

        let timeout = get(env_vars::LLM_TIMEOUT_SECS).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(0) => None,
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(_) => {
                log::warn!("Ignoring invalid {} value {:?}", env_vars::LLM_TIMEOUT_SECS, raw);
                None
            }
        });

        let db_file = get(env_vars::DB_FILE_NAME).unwrap_or_else(|| defaults::DB_FILE_NAME.to_string());

        Self {
            port,
            bind_address: get(env_vars::BIND_ADDRESS)
                .unwrap_or_else(|| defaults::BIND_ADDRESS.to_string()),
            db_path: db_path_from_setting(&db_file),
            llm: LlmConfig {
                base_url: get(env_vars::LLM_BASE_URL)
                    .unwrap_or_else(|| defaults::LLM_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                api_key: get(env_vars::LLM_API_KEY).unwrap_or_else(|| defaults::LLM_API_KEY.to_string()),
                model: get(env_vars::LLM_MODEL).unwrap_or_else(|| defaults::LLM_MODEL.to_string()),
                timeout,
            },
        }
    }
}

/// `file:local.db` and `local.db` both name the same file.
fn db_path_from_setting(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let path = trimmed.strip_prefix("file:").unwrap_or(trimmed);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.port, defaults::PORT);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.db_path, PathBuf::from("local.db"));
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(config.llm.api_key, "not-needed");
        assert_eq!(config.llm.model, "deepseek-r1:7b");
        assert!(config.llm.timeout.is_none());
    }

    #[test]
    fn test_overrides_and_file_prefix() {
        let config = config_from(&[
            ("PORT", "3000"),
            ("DB_FILE_NAME", "file:data/notes.db"),
            ("LLM_BASE_URL", "http://gpu-box:8000/v1/"),
            ("LLM_MODEL", "llama3.2"),
            ("LLM_TIMEOUT_SECS", "90"),
        ]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path, PathBuf::from("data/notes.db"));
        assert_eq!(config.llm.base_url, "http://gpu-box:8000/v1");
        assert_eq!(config.llm.model, "llama3.2");
        assert_eq!(config.llm.timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("LLM_TIMEOUT_SECS", "soon"), ("LLM_MODEL", "  ")]);
        assert_eq!(config.port, defaults::PORT);
        assert!(config.llm.timeout.is_none());
        assert_eq!(config.llm.model, defaults::LLM_MODEL);
    }
}
