/// CLI Module
///
/// Command-line interface configuration using clap.
use clap::Parser;

/// OSM Activity Sync - ETL Job
///
/// Fetch playgrounds, museums, libraries and swimming pools from the
/// Overpass API and upsert them into the PostGIS `activities` table.
/// Every flag is optional; values default to the environment.
#[derive(Parser, Debug)]
#[command(name = "osm-activity-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database host (overrides DB_HOST env var)
    #[arg(long, value_name = "HOST")]
    pub db_host: Option<String>,

    /// Database port (overrides DB_PORT env var)
    #[arg(long, value_name = "PORT")]
    pub db_port: Option<u16>,

    /// Database name (overrides DB_NAME env var)
    #[arg(long, value_name = "NAME")]
    pub db_name: Option<String>,

    /// Database user (overrides DB_USER env var)
    #[arg(long, value_name = "USER")]
    pub db_user: Option<String>,

    /// Database password (overrides DB_PASSWORD env var)
    #[arg(long, value_name = "PASSWORD")]
    pub db_password: Option<String>,

    /// Overpass interpreter URL (overrides OVERPASS_URL env var)
    #[arg(long, value_name = "URL")]
    pub overpass_url: Option<String>,
}

impl Cli {
    /// Validate CLI arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.db_port == Some(0) {
            anyhow::bail!("Database port must be greater than 0");
        }

        if let Some(url) = &self.overpass_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("Overpass URL must be an http(s) URL: {}", url);
            }
        }

        Ok(())
    }
}
