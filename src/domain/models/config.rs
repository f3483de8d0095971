//! Application configuration model.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loaded hierarchically by the config loader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub alerts: AlertConfig,
}

/// SQLite database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the database file
    pub path: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: ".moldflow/moldflow.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of: trace, debug, info, warn, error
    pub level: String,
    /// One of: json, pretty
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Alert dispatcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Rolling window within which duplicate unread notifications are suppressed
    pub dedup_window_hours: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { dedup_window_hours: 24 }
    }
}

impl Config {
    /// Database URL in the form sqlx expects.
    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.database.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.alerts.dedup_window_hours, 24);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.database_url(), "sqlite:.moldflow/moldflow.db");
    }
}
