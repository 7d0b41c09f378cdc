use anyhow::{Context, Result};

use crate::scores::sample_prompts::DEFAULT_SAMPLE_PROMPT_COUNT;

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is set but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Without a key, `/thresholds/analyze` answers 503; every other route works.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Default for requests that do not say whether a directive value of 0 applies.
    pub zero_is_value: bool,
    pub sample_prompt_count: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            zero_is_value: optional_env("DIRECTIVE_ZERO_IS_VALUE")
                .map(|v| parse_bool(&v))
                .transpose()
                .context("DIRECTIVE_ZERO_IS_VALUE must be true or false")?
                .unwrap_or(false),
            sample_prompt_count: optional_env("SAMPLE_PROMPT_COUNT")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("SAMPLE_PROMPT_COUNT must be a non-negative integer")?
                .unwrap_or(DEFAULT_SAMPLE_PROMPT_COUNT),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            port: 8080,
            rust_log: "info".to_string(),
            zero_is_value: false,
            sample_prompt_count: DEFAULT_SAMPLE_PROMPT_COUNT,
        }
    }
}

/// Unset and blank variables are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("invalid boolean '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool(" yes ").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_default_matches_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert!(!config.zero_is_value);
        assert_eq!(config.sample_prompt_count, 5);
        assert!(config.anthropic_api_key.is_none());
    }
}
