/// Configuration Module
///
/// Connection parameters, the Overpass endpoint and the query scope, lifted
/// out of the code into one structure. Values come from the environment
/// (optionally a `.env` file) and can be overridden from the command line.
use anyhow::{Context, Result};
use std::{env, fmt, time::Duration};

use crate::cli::Cli;

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_OVERPASS_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "postgres";

/// Postgres connection parameters
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Geographic bounding box in Overpass order (south, west, north, east)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self { south: 46.5, west: 9.0, north: 47.0, east: 10.0 }
    }
}

/// A `key=value` tag selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    pub fn new(key: &str, value: &str) -> Self {
        Self { key: key.to_string(), value: value.to_string() }
    }
}

/// Playgrounds, museums, libraries and swimming pools
pub fn default_tag_filters() -> Vec<TagFilter> {
    vec![
        TagFilter::new("leisure", "playground"),
        TagFilter::new("amenity", "museum"),
        TagFilter::new("amenity", "library"),
        TagFilter::new("leisure", "swimming_pool"),
    ]
}

/// Overpass endpoint and query scope
#[derive(Debug, Clone)]
pub struct OverpassConfig {
    pub url: String,
    pub timeout: Duration,
    pub bbox: BoundingBox,
    pub filters: Vec<TagFilter>,
}

/// Full job configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub overpass: OverpassConfig,
}

impl Settings {
    /// Build settings from environment variables, then apply CLI overrides
    pub fn load(cli: &Cli) -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok(), cli)
    }

    fn from_lookup<F>(lookup: F, cli: &Cli) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key).with_context(|| format!("{} not found in environment. Please check your .env file", key))
        };

        let host = match &cli.db_host {
            Some(host) => host.clone(),
            None => required("DB_HOST")?,
        };
        let port = match cli.db_port {
            Some(port) => port,
            None => match lookup("DB_PORT") {
                Some(raw) => raw.parse().with_context(|| format!("DB_PORT is not a valid port: {}", raw))?,
                None => DEFAULT_DB_PORT,
            },
        };
        let database =
            cli.db_name.clone().or_else(|| lookup("DB_NAME")).unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
        let user = match &cli.db_user {
            Some(user) => user.clone(),
            None => required("DB_USER")?,
        };
        let password = match &cli.db_password {
            Some(password) => password.clone(),
            None => required("DB_PASSWORD")?,
        };

        let url =
            cli.overpass_url.clone().or_else(|| lookup("OVERPASS_URL")).unwrap_or_else(|| DEFAULT_OVERPASS_URL.into());
        let timeout_secs = match lookup("OVERPASS_TIMEOUT_SECS") {
            Some(raw) => {
                raw.parse().with_context(|| format!("OVERPASS_TIMEOUT_SECS is not a number of seconds: {}", raw))?
            }
            None => DEFAULT_OVERPASS_TIMEOUT_SECS,
        };

        let settings = Self {
            database: DatabaseConfig { host, port, database, user, password },
            overpass: OverpassConfig {
                url,
                timeout: Duration::from_secs(timeout_secs),
                bbox: BoundingBox::default(),
                filters: default_tag_filters(),
            },
        };

        tracing::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}
