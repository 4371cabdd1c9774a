// src/config.rs

use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    /// Без DATABASE_URL сервер работает без персистентности.
    pub database_url: Option<String>,
    pub port: u16,
    pub max_sessions: usize,
    pub max_users_per_session: usize,
    pub snapshot_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            port: 3000,
            max_sessions: 5,
            max_users_per_session: 10,
            snapshot_interval_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            port: env_or("PORT", defaults.port),
            max_sessions: env_or("MAX_SESSIONS", defaults.max_sessions),
            max_users_per_session: env_or("MAX_USERS_PER_SESSION", defaults.max_users_per_session),
            snapshot_interval_secs: env_or("SNAPSHOT_INTERVAL_SECS", defaults.snapshot_interval_secs),
        }
    }
}

// Непарсящееся значение — предупреждение и default, сервер не падает.
fn env_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("invalid {} value {:?} — falling back to {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
