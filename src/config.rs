use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

/// Vocabulary scanned in review comments when `REVIEW_KEYWORDS` is not set.
pub const DEFAULT_REVIEW_KEYWORDS: &[&str] = &[
    "clean",
    "friendly",
    "caring",
    "safe",
    "spacious",
    "affordable",
    "expensive",
    "teachers",
    "english",
    "mandarin",
    "bahasa",
    "playground",
    "facilities",
    "transport",
    "food",
    "parking",
    "communication",
    "activities",
    "homework",
    "art",
    "music",
    "swimming",
    "montessori",
    "small class",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Postgres connection string; in-memory stores are used when absent.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub log_dir: PathBuf,
    pub default_page_size: i64,
    pub max_page_size: i64,
    /// Normalized (trimmed, lowercase, deduplicated) keyword vocabulary.
    pub review_keywords: Vec<String>,
}

impl Config {
    /// ✅ Load environment variables and set defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let default_page_size: i64 = try_load("REVIEW_PAGE_SIZE", "10")?;
        let max_page_size: i64 = try_load("REVIEW_MAX_PAGE_SIZE", "50")?;
        if default_page_size < 1 || default_page_size > max_page_size {
            return Err(ConfigError::Invalid {
                key: "REVIEW_PAGE_SIZE",
                value: default_page_size.to_string(),
                reason: format!("must be between 1 and {max_page_size}"),
            });
        }

        let review_keywords = match env::var("REVIEW_KEYWORDS") {
            Ok(raw) => normalize_keywords(raw.split(',')),
            Err(_) => normalize_keywords(DEFAULT_REVIEW_KEYWORDS.iter().copied()),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: try_load("BIND_ADDR", "127.0.0.1:3000")?,
            log_dir: log_dir_from_env(),
            default_page_size,
            max_page_size,
            review_keywords,
        })
    }
}

/// `LOG_DIR`, default `logs`. Read on its own so logging can start before
/// the rest of the configuration is loaded.
pub fn log_dir_from_env() -> PathBuf {
    env::var("LOG_DIR")
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map_or_else(|| PathBuf::from("logs"), PathBuf::from)
}

/// Lowercases and trims candidate keywords, dropping blanks and repeats
/// while keeping the configured order.
pub fn normalize_keywords<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for keyword in raw {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }
    keywords
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
