use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub tokens: TokenConfig,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let max_connections = parse_or("DB_MAX_CONNECTIONS", 10);
        Ok(Self {
            port,
            database_url,
            host,
            max_connections,
            tokens: TokenConfig::from_env()?,
        })
    }
}

impl TokenConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            access_secret: env::var("ACCESS_TOKEN_SECRET")
                .context("ACCESS_TOKEN_SECRET is not set")?,
            refresh_secret: env::var("REFRESH_TOKEN_SECRET")
                .context("REFRESH_TOKEN_SECRET is not set")?,
            access_ttl_minutes: parse_or("ACCESS_TOKEN_LIFE_MINUTES", 15),
            refresh_ttl_minutes: parse_or("REFRESH_TOKEN_LIFE_MINUTES", 60 * 24 * 7),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
