/// Database Module
///
/// This module owns the single PostgreSQL session used for a sync run:
/// - Opening the connection from explicit parameters
/// - Connectivity and PostGIS checks
/// - Closing the session once the run is finished
use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgConnection},
    Connection,
};

use crate::config::DatabaseConfig;

pub struct Database {
    conn: PgConnection,
}

impl Database {
    /// Open one session to the target database
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password);

        let conn = PgConnection::connect_with(&options)
            .await
            .with_context(|| format!("Failed to connect to PostgreSQL at {}:{}", config.host, config.port))?;

        tracing::info!("Connected to PostgreSQL at {}:{}/{}", config.host, config.port, config.database);
        Ok(Self { conn })
    }

    /// Get a mutable handle to the underlying session
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    /// Test the database connection
    pub async fn test_connection(&mut self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&mut self.conn).await.context("Database connection test failed")?;

        Ok(())
    }

    /// Report the installed PostGIS version, if any
    pub async fn postgis_version(&mut self) -> Result<Option<String>> {
        let version = sqlx::query_scalar::<_, String>(
            "SELECT extversion FROM pg_extension WHERE extname = 'postgis'",
        )
        .fetch_optional(&mut self.conn)
        .await
        .context("Failed to query PostGIS extension")?;

        Ok(version)
    }

    /// Close the session
    pub async fn close(self) -> Result<()> {
        self.conn.close().await.context("Failed to close database connection")?;

        tracing::info!("Database connection closed");
        Ok(())
    }
}
