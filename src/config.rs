// config.rs
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root of the listings API. Endpoints are joined onto it.
    pub api_url: String,
    pub bind_addr: SocketAddr,
    pub page_size: usize,
    /// `field,direction` passed as the `sort` query parameter.
    pub sort: String,
    pub request_timeout: Duration,
    /// Idle grid sessions older than this are evicted.
    pub session_ttl: Duration,
    pub placeholder_image: String,
    pub max_workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            page_size: 8,
            sort: "id,desc".to_string(),
            request_timeout: Duration::from_secs(30),
            session_ttl: Duration::from_secs(30 * 60),
            placeholder_image: "/static/img/placeholder.png".to_string(),
            max_workers: 8,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable source, for tests.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(url) = lookup("IMOVEIS_API_URL") {
            cfg.api_url = url;
        }
        if let Some(raw) = lookup("IMOVEIS_BIND_ADDR") {
            cfg.bind_addr = parse("IMOVEIS_BIND_ADDR", &raw)?;
        }
        if let Some(raw) = lookup("IMOVEIS_PAGE_SIZE") {
            cfg.page_size = parse_positive("IMOVEIS_PAGE_SIZE", &raw)?;
        }
        if let Some(sort) = lookup("IMOVEIS_SORT") {
            cfg.sort = sort;
        }
        if let Some(raw) = lookup("IMOVEIS_TIMEOUT_SECS") {
            cfg.request_timeout =
                Duration::from_secs(parse_positive::<u64>("IMOVEIS_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = lookup("IMOVEIS_SESSION_TTL_SECS") {
            cfg.session_ttl =
                Duration::from_secs(parse_positive::<u64>("IMOVEIS_SESSION_TTL_SECS", &raw)?);
        }
        if let Some(img) = lookup("IMOVEIS_PLACEHOLDER_IMG") {
            cfg.placeholder_image = img;
        }
        if let Some(raw) = lookup("IMOVEIS_MAX_WORKERS") {
            cfg.max_workers = parse_positive("IMOVEIS_MAX_WORKERS", &raw)?;
        }

        Ok(cfg)
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let value: T = parse(key, raw)?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
