//! Runtime configuration read from the environment

use std::env;

/// Essential platforms backfilled at startup when `ESSENTIAL_PLATFORMS` is unset
pub const DEFAULT_ESSENTIALS: &str = "instagram,facebook,tiktok,youtube";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Port to listen on (`PORT`)
    pub port: u16,

    /// Path of the redb file (`DATABASE_URL`)
    pub database_url: String,

    /// Platform slugs that must always exist (`ESSENTIAL_PLATFORMS`)
    pub essential_platforms: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: "data.db".to_string(),
            essential_platforms: parse_slugs(DEFAULT_ESSENTIALS),
        }
    }
}

/// Splits a comma list into lowercase slugs, skipping blanks
pub fn parse_slugs(list: &str) -> Vec<String> {
    list.split(',')
        .map(|slug| slug.trim().to_lowercase())
        .filter(|slug| !slug.is_empty())
        .collect()
}

impl Config {
    /// Reads configuration, falling back to defaults for missing or bad values
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(defaults.port);
        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let essential_platforms = env::var("ESSENTIAL_PLATFORMS")
            .map(|list| parse_slugs(&list))
            .unwrap_or(defaults.essential_platforms);

        Self {
            port,
            database_url,
            essential_platforms,
        }
    }
}
