//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml`, then overridden by `TRIPSPLIT__*` environment
//! variables (e.g. `TRIPSPLIT__TOKEN__SYMMETRIC_KEY`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_ACCESS_TOKEN_SECS: i64 = 15 * 60;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Token {
    pub symmetric_key: String,
    #[serde(default = "default_access_token_secs")]
    pub access_token_duration_secs: i64,
}

fn default_access_token_secs() -> i64 {
    DEFAULT_ACCESS_TOKEN_SECS
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    pub token: Token,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("TRIPSPLIT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn full_file_is_parsed() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080
            database = { sqlite = "tripsplit.db" }

            [token]
            symmetric_key = "0123456789abcdef0123456789abcdef"
            access_token_duration_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.server.port, 8080);
        assert_eq!(
            settings.server.database,
            Database::Sqlite("tripsplit.db".to_string())
        );
        assert_eq!(settings.token.access_token_duration_secs, 60);
    }

    #[test]
    fn defaults_apply() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"

            [token]
            symmetric_key = "0123456789abcdef0123456789abcdef"
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.bind, None);
        assert_eq!(settings.server.database, Database::Memory);
        assert_eq!(
            settings.token.access_token_duration_secs,
            DEFAULT_ACCESS_TOKEN_SECS
        );
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            "#,
        );
        assert!(err.is_err());
    }
}
