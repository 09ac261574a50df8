/// OSM Activity Sync
///
/// A one-shot ETL job that loads playgrounds, museums, libraries and swimming
/// pools from OpenStreetMap into a PostGIS `activities` table.
mod cli;
mod config;
mod db;
mod etl;
mod models;
mod overpass;
mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::Settings;
use db::Database;
use overpass::{OverpassClient, OverpassQuery};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    cli.validate()?;

    let settings = Settings::load(&cli).context("Failed to load configuration")?;

    println!("🚀 Starting OSM Activity Sync...");

    // Initialize database connection; nothing else runs without it
    println!("\n💾 Connecting to PostgreSQL database...");
    let mut database = Database::connect(&settings.database).await.context("Failed to connect to PostgreSQL database")?;

    database.test_connection().await.context("Database connection test failed")?;

    println!("✅ Database connected successfully!");

    match database.postgis_version().await {
        Ok(Some(version)) => println!("🌍 PostGIS version: {}", version),
        Ok(None) => tracing::warn!("PostGIS extension not found, geometry writes will fail"),
        Err(e) => tracing::warn!("Could not determine PostGIS version: {:#}", e),
    }

    // Initialize Overpass client
    let client = OverpassClient::new(&settings.overpass).context("Failed to create Overpass client")?;
    let query = OverpassQuery::new(settings.overpass.bbox, settings.overpass.filters.clone());

    tracing::info!("OSM Activity Sync initialized successfully");

    let mut pipeline = pipeline::Pipeline::new(database);
    let stats = pipeline.run(&client, &query).await.context("Sync run failed")?;

    pipeline.into_store().close().await?;

    tracing::info!(
        fetched = stats.fetched,
        succeeded = stats.succeeded,
        failed = stats.failed,
        "Sync finished"
    );
    println!("\n✨ Sync execution complete!");

    Ok(())
}
