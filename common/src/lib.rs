/*!
common/src/lib.rs

Shared configuration types for NewsBrief.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader for a TOML config file, with default/override merging
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP server bind configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind, e.g. "0.0.0.0"
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Feed source configuration: the single fixed RSS/Atom endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed endpoint URL (RSS 2.0 or Atom)
    pub url: String,
    /// Trailing recency window in whole days (default 7)
    pub window_days: Option<i64>,
    /// How long a fetched feed body may be reused, in seconds (default 3600)
    pub cache_seconds: Option<u64>,
    pub fetch_timeout_seconds: Option<u64>,
}

/// Remote LLM config (OpenAI-compatible chat completions endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    pub api_url: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
}

/// LLM top-level config grouping adapter specifics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub adapter: Option<String>, // "remote", "none"
    pub remote: Option<RemoteLlmConfig>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: Option<ServerConfig>,
    pub feed: FeedConfig,
    pub llm: Option<LlmConfig>,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(
        default_path: Option<&Path>,
        override_path: Option<&Path>,
    ) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value =
                    toml::from_str(&data).context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value =
                    toml::from_str(&data).context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value
            .try_into()
            .context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_string() {
        // Minimal TOML to test parsing
        let toml = r#"
            [server]
            bind = "127.0.0.1"
            port = 8000

            [feed]
            url = "https://example.com/rss.xml"
            window_days = 7

            [llm]
            adapter = "remote"

            [llm.remote]
            api_url = "https://api.openai.com/v1/chat/completions"
            api_key_env = "OPENAI_API_KEY"
            model = "gpt-4o-mini"
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.feed.url, "https://example.com/rss.xml");
        assert_eq!(cfg.feed.window_days, Some(7));
        let remote = cfg.llm.and_then(|l| l.remote).expect("remote llm config");
        assert_eq!(remote.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn defaults_merged_with_override() {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_millis();
        let dir = std::env::temp_dir().join(format!("newsbrief_test_{}", now));
        std::fs::create_dir_all(&dir).expect("create temp dir");

        let default_path = dir.join("config.default.toml");
        std::fs::write(
            &default_path,
            r#"
            [feed]
            url = "https://default.example/rss.xml"
            window_days = 7
            cache_seconds = 3600
            "#,
        )
        .expect("write default");

        let override_path = dir.join("config.toml");
        std::fs::write(
            &override_path,
            r#"
            [feed]
            url = "https://override.example/atom.xml"
            "#,
        )
        .expect("write override");

        let cfg = Config::load_with_defaults(Some(&default_path), Some(&override_path))
            .await
            .expect("load merged config");

        // Override wins for url, defaults survive for the rest
        assert_eq!(cfg.feed.url, "https://override.example/atom.xml");
        assert_eq!(cfg.feed.window_days, Some(7));
        assert_eq!(cfg.feed.cache_seconds, Some(3600));
    }
}
