use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_address")]
    pub address: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// Allow cross-origin requests from the dashboard
    #[serde(default = "default_true")]
    pub cors: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DataConfig {
    /// JSON dataset loaded into the store at startup. Empty store if unset.
    pub seed_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LeaderboardConfig {
    #[serde(default = "default_leaderboard_limit")]
    pub default_limit: usize,
    /// Hard cap on `?limit=`
    #[serde(default = "default_leaderboard_max")]
    pub max_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            address: default_web_address(),
            port: default_web_port(),
            cors: true,
        }
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            default_limit: default_leaderboard_limit(),
            max_limit: default_leaderboard_max(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_web_address() -> String { "0.0.0.0".to_string() }
fn default_web_port() -> u16 { 8087 }
fn default_leaderboard_limit() -> usize { 50 }
fn default_leaderboard_max() -> usize { 500 }
fn default_log_filter() -> String { "tiker_trust=info".to_string() }

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config '{}': {}", path, e))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.leaderboard.default_limit == 0 {
            anyhow::bail!("leaderboard.default_limit must be at least 1");
        }
        if config.leaderboard.default_limit > config.leaderboard.max_limit {
            anyhow::bail!(
                "leaderboard.default_limit ({}) exceeds leaderboard.max_limit ({})",
                config.leaderboard.default_limit,
                config.leaderboard.max_limit
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.web.port, 8087);
        assert!(config.web.cors);
        assert!(config.data.seed_path.is_none());
        assert_eq!(config.leaderboard.default_limit, 50);
        assert_eq!(config.logging.filter, "tiker_trust=info");
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            [web]
            address = "127.0.0.1"
            port = 9000
            cors = false

            [data]
            seed_path = "data/agents.json"

            [leaderboard]
            default_limit = 10
            max_limit = 100

            [logging]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.web.address, "127.0.0.1");
        assert_eq!(config.web.port, 9000);
        assert!(!config.web.cors);
        assert_eq!(config.data.seed_path.as_deref(), Some("data/agents.json"));
        assert_eq!(config.leaderboard.max_limit, 100);
        assert!(config.logging.json);
    }

    #[test]
    fn test_limit_above_max_is_rejected() {
        let err = Config::parse("[leaderboard]\ndefault_limit = 600\nmax_limit = 500\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::load("/nonexistent/tiker-trust.toml").is_err());
    }
}
