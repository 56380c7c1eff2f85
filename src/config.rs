use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub dadata: DadataConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DadataConfig {
    pub api_key: String,
    pub secret_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upper bound on lookups in flight across all chats.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl DadataConfig {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }

    /// Full URL of the `findById/party` method.
    pub fn find_party_url(&self) -> String {
        format!("{}/findById/party", self.base_url.trim_end_matches('/'))
    }
}

fn default_base_url() -> String {
    "https://suggestions.dadata.ru/suggestions/api/4_1/rs".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent_requests() -> usize {
    4
}

/// `appsettings.json` layout used by earlier deployments of the bot.
#[derive(Deserialize)]
struct LegacyConfig {
    #[serde(rename = "BotConfiguration")]
    bot: LegacyBotConfiguration,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyBotConfiguration {
    bot_token: String,
    #[serde(rename = "DaDataApiKey")]
    dadata_api_key: String,
    #[serde(rename = "DaDataSecretKey")]
    dadata_secret_key: String,
}

impl From<LegacyConfig> for Config {
    fn from(legacy: LegacyConfig) -> Self {
        Config {
            telegram: TelegramConfig {
                bot_token: legacy.bot.bot_token,
            },
            dadata: DadataConfig::new(legacy.bot.dadata_api_key, legacy.bot.dadata_secret_key),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_legacy_json(&content)?
        } else {
            Self::from_toml_str(&content)?
        };

        if config.dadata.max_concurrent_requests == 0 {
            anyhow::bail!("dadata.max_concurrent_requests must be at least 1");
        }

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML config")
    }

    pub fn from_legacy_json(content: &str) -> Result<Self> {
        let legacy: LegacyConfig =
            serde_json::from_str(content).context("Failed to parse legacy appsettings.json")?;
        Ok(legacy.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL_TOML: &str = r#"
[telegram]
bot_token = "123:abc"

[dadata]
api_key = "key"
secret_key = "secret"
base_url = "http://localhost:8080/rs/"
timeout_secs = 3
max_concurrent_requests = 2
"#;

    #[test]
    fn test_parse_full_toml() {
        let config = Config::from_toml_str(FULL_TOML).unwrap();
        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.dadata.api_key, "key");
        assert_eq!(config.dadata.secret_key, "secret");
        assert_eq!(config.dadata.timeout_secs, 3);
        assert_eq!(config.dadata.max_concurrent_requests, 2);
        assert_eq!(
            config.dadata.find_party_url(),
            "http://localhost:8080/rs/findById/party"
        );
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_toml_str(
            r#"
[telegram]
bot_token = "t"

[dadata]
api_key = "k"
secret_key = "s"
"#,
        )
        .unwrap();
        assert_eq!(config.dadata.timeout_secs, 10);
        assert_eq!(config.dadata.max_concurrent_requests, 4);
        assert_eq!(
            config.dadata.find_party_url(),
            "https://suggestions.dadata.ru/suggestions/api/4_1/rs/findById/party"
        );
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let result = Config::from_toml_str(
            r#"
[telegram]
bot_token = "t"

[dadata]
api_key = "k"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_legacy_json_layout() {
        let config = Config::from_legacy_json(
            r#"{
                "BotConfiguration": {
                    "BotToken": "42:xyz",
                    "DaDataApiKey": "api",
                    "DaDataSecretKey": "sec"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.telegram.bot_token, "42:xyz");
        assert_eq!(config.dadata.api_key, "api");
        assert_eq!(config.dadata.secret_key, "sec");
        assert_eq!(config.dadata.timeout_secs, 10);
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("config.toml");
        std::fs::File::create(&toml_path)
            .unwrap()
            .write_all(FULL_TOML.as_bytes())
            .unwrap();
        assert_eq!(Config::load(&toml_path).unwrap().dadata.api_key, "key");

        let json_path = dir.path().join("appsettings.json");
        std::fs::write(
            &json_path,
            r#"{"BotConfiguration":{"BotToken":"t","DaDataApiKey":"a","DaDataSecretKey":"s"}}"#,
        )
        .unwrap();
        assert_eq!(Config::load(&json_path).unwrap().dadata.api_key, "a");
    }

    #[test]
    fn test_load_rejects_zero_concurrency() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[telegram]\nbot_token = \"t\"\n\n[dadata]\napi_key = \"k\"\nsecret_key = \"s\"\nmax_concurrent_requests = 0\n",
        )
        .unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/innbot.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }
}
