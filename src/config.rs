use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const TOKEN_ENV: &str = "TELEGRAM_APITOKEN";
pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    /// May be left empty in the file and supplied through `TELEGRAM_APITOKEN`.
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            webhook_path: default_webhook_path(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_webhook_path() -> String {
    "/bot".to_string()
}

impl Config {
    /// Load the config file if it exists, then apply environment overrides.
    /// A missing file is fine: the bot can run on environment variables alone.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// File values only, or defaults when the file doesn't exist.
    pub fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay the token and listen port from the environment. `lookup` is
    /// injected so tests don't have to touch the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.apply_token_override(&lookup);
        self.apply_port_override(&lookup)
    }

    pub fn apply_token_override<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_ENV) {
            self.telegram.bot_token = token;
        }
    }

    /// Only meaningful for the process that owns its listener.
    pub fn apply_port_override<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV).filter(|p| !p.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid {} value: {}", PORT_ENV, port))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !self.server.webhook_path.starts_with('/') {
            bail!(
                "webhook_path must start with '/': {}",
                self.server.webhook_path
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file() {
        let mut config = Config::read_file(Path::new("/nonexistent/timebot/config.toml")).unwrap();
        config.apply_env_overrides(env(&[])).unwrap();
        assert!(config.telegram.bot_token.is_empty());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.webhook_path, "/bot");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_token_override_ignores_port() {
        let mut config = Config::default();
        config.apply_token_override(env(&[(TOKEN_ENV, "333:abc"), (PORT_ENV, "eighty")]));
        assert_eq!(config.telegram.bot_token, "333:abc");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_parse_full_file() {
        let config = Config::parse(
            r#"
[telegram]
bot_token = "123:abc"

[server]
port = 9000
webhook_path = "/hook"
"#,
        )
        .unwrap();
        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.webhook_path, "/hook");
    }

    #[test]
    fn test_parse_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.telegram.bot_token.is_empty());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.webhook_path, "/bot");
    }

    #[test]
    fn test_parse_rejects_malformed_toml() {
        assert!(Config::parse("[server\nport = ").is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::parse(
            r#"
[telegram]
bot_token = "111:from-file"

[server]
port = 9000
"#,
        )
        .unwrap();
        config
            .apply_env_overrides(env(&[(TOKEN_ENV, "222:from-env"), (PORT_ENV, "3000")]))
            .unwrap();
        assert_eq!(config.telegram.bot_token, "222:from-env");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_empty_port_keeps_default() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[(PORT_ENV, "")])).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_invalid_port_is_error() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(env(&[(PORT_ENV, "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("Invalid PORT"));
    }

    #[test]
    fn test_webhook_path_must_be_absolute() {
        let mut config = Config::default();
        config.server.webhook_path = "bot".to_string();
        assert!(config.validate().is_err());
    }
}
