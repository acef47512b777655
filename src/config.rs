use std::env;
use std::str::FromStr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    /// None selects the in-process memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,

    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    /// None selects the built-in keyword flow engine.
    pub flow_engine_url: Option<String>,
    /// None means the remote flow engine call is never cut short.
    pub flow_engine_timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: optional_var("DATABASE_URL"),
            db_max_connections: parsed_var("DB_MAX_CONNECTIONS", 20)?,
            db_acquire_timeout_secs: parsed_var("DB_ACQUIRE_TIMEOUT_SECS", 5)?,

            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_var("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or_default(),

            flow_engine_url: optional_var("FLOW_ENGINE_URL"),
            flow_engine_timeout_secs: optional_var("FLOW_ENGINE_TIMEOUT_SECS")
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .with_context(|| "FLOW_ENGINE_TIMEOUT_SECS must be a number")
                })
                .transpose()?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Unset and empty variables are both treated as absent.
fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn parsed_var<T: FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match optional_var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} must be a number, got {raw:?}")),
        None => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
impl Config {
    /// Defaults used by handler tests: memory store, keyword flow engine.
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            db_max_connections: 1,
            db_acquire_timeout_secs: 1,
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            cors_extra_origins: Vec::new(),
            flow_engine_url: None,
            flow_engine_timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_origins_trims_and_drops_empty() {
        let origins = split_origins(" http://a.local , ,http://b.local,");
        assert_eq!(origins, vec!["http://a.local", "http://b.local"]);
    }

    #[test]
    fn test_listen_addr() {
        let mut config = Config::for_tests();
        config.host = "0.0.0.0".into();
        config.port = 9000;
        assert_eq!(config.listen_addr(), "0.0.0.0:9000");
    }
}
