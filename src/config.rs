use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::chat::completion::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, GROQ_ENDPOINT};
use crate::feedback::DEFAULT_TABLE;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub content_dir: PathBuf,
    /// Sqlite file for dialogue state; in-memory storage when unset.
    pub dialogue_db: Option<String>,
    pub chat_api_key: Option<String>,
    pub chat_api_url: String,
    pub chat_model: String,
    pub chat_temperature: f32,
    pub chat_timeout: Duration,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub feedback_table: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("data"),
            dialogue_db: None,
            chat_api_key: None,
            chat_api_url: GROQ_ENDPOINT.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
            chat_temperature: DEFAULT_TEMPERATURE,
            chat_timeout: Duration::from_secs(30),
            supabase_url: None,
            supabase_anon_key: None,
            feedback_table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let chat_temperature = match var("CHAT_TEMPERATURE") {
            Some(value) => parse_checked(value, "CHAT_TEMPERATURE", |t: &f32| {
                t.is_finite() && *t >= 0.0
            })?,
            None => defaults.chat_temperature,
        };
        let chat_timeout = match var("CHAT_TIMEOUT_SECS") {
            Some(value) => {
                Duration::from_secs(parse_checked(value, "CHAT_TIMEOUT_SECS", |s: &u64| *s > 0)?)
            }
            None => defaults.chat_timeout,
        };

        Ok(Self {
            content_dir: var("CONTENT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.content_dir),
            dialogue_db: var("DIALOGUE_DB"),
            chat_api_key: var("GROQ_API_KEY"),
            chat_api_url: var("CHAT_API_URL").unwrap_or(defaults.chat_api_url),
            chat_model: var("CHAT_MODEL").unwrap_or(defaults.chat_model),
            chat_temperature,
            chat_timeout,
            supabase_url: var("SUPABASE_URL"),
            supabase_anon_key: var("SUPABASE_ANON_KEY"),
            feedback_table: var("FEEDBACK_TABLE").unwrap_or(defaults.feedback_table),
        })
    }
}

fn parse_checked<T, F>(value: String, name: &'static str, valid: F) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&T) -> bool,
{
    match value.trim().parse() {
        Ok(parsed) if valid(&parsed) => Ok(parsed),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(config_from(&[]).unwrap(), Config::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("CONTENT_DIR", "/srv/content"),
            ("DIALOGUE_DB", "db.sqlite"),
            ("GROQ_API_KEY", "gsk_test"),
            ("CHAT_MODEL", "llama-3.3-70b-versatile"),
            ("CHAT_TEMPERATURE", "0.2"),
            ("CHAT_TIMEOUT_SECS", "5"),
            ("FEEDBACK_TABLE", "responses"),
        ])
        .unwrap();
        assert_eq!(config.content_dir, PathBuf::from("/srv/content"));
        assert_eq!(config.dialogue_db.as_deref(), Some("db.sqlite"));
        assert_eq!(config.chat_api_key.as_deref(), Some("gsk_test"));
        assert_eq!(config.chat_model, "llama-3.3-70b-versatile");
        assert_eq!(config.chat_temperature, 0.2);
        assert_eq!(config.chat_timeout, Duration::from_secs(5));
        assert_eq!(config.feedback_table, "responses");
    }

    #[test]
    fn blank_values_are_unset() {
        let config = config_from(&[("GROQ_API_KEY", "  "), ("SUPABASE_URL", "")]).unwrap();
        assert_eq!(config.chat_api_key, None);
        assert_eq!(config.supabase_url, None);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert_eq!(
            config_from(&[("CHAT_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::Invalid {
                name: "CHAT_TIMEOUT_SECS",
                value: "soon".to_string()
            })
        );
        assert!(config_from(&[("CHAT_TEMPERATURE", "warm")]).is_err());
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        assert_eq!(
            config_from(&[("CHAT_TIMEOUT_SECS", "0")]),
            Err(ConfigError::Invalid {
                name: "CHAT_TIMEOUT_SECS",
                value: "0".to_string()
            })
        );
        for value in ["NaN", "-0.5", "inf"] {
            assert_eq!(
                config_from(&[("CHAT_TEMPERATURE", value)]),
                Err(ConfigError::Invalid {
                    name: "CHAT_TEMPERATURE",
                    value: value.to_string()
                })
            );
        }
        assert_eq!(config_from(&[("CHAT_TEMPERATURE", "0")]).unwrap().chat_temperature, 0.0);
    }
}
