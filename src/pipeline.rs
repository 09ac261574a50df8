/// Pipeline Module
///
/// Orchestrates a sync run: Extract → (Transform → Load) per record,
/// collecting one outcome per node and reducing them into run statistics.
/// A failing record is rolled back and counted; it never stops the run.
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

use crate::etl::{
    extract,
    load::ActivityStore,
    transform::{self, TransformError},
};
use crate::models::OsmNode;
use crate::overpass::{OverpassClient, OverpassQuery};

/// Stage at which a record failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Transform,
    Load,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Transform => write!(f, "Transform"),
            PipelineStage::Load => write!(f, "Load"),
        }
    }
}

/// Why a single record could not be stored
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("database write failed: {0}")]
    Load(#[from] sqlx::Error),
}

impl RecordError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            RecordError::Transform(_) => PipelineStage::Transform,
            RecordError::Load(_) => PipelineStage::Load,
        }
    }
}

/// Result of processing one fetched node
#[derive(Debug)]
pub struct RecordOutcome {
    pub osm_id: i64,
    pub result: Result<(), RecordError>,
}

/// A failed record, kept for the final report
#[derive(Debug, Clone)]
pub struct RecordFailure {
    pub osm_id: i64,
    pub stage: PipelineStage,
    pub message: String,
}

/// Sync run statistics
#[derive(Debug, Clone)]
pub struct SyncStats {
    pub started_at: DateTime<Utc>,
    pub fetched: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed_time: Duration,
    pub failures: Vec<RecordFailure>,
}

impl SyncStats {
    /// Reduce per-record outcomes into totals
    pub fn from_outcomes(started_at: DateTime<Utc>, outcomes: &[RecordOutcome], elapsed_time: Duration) -> Self {
        let failures: Vec<RecordFailure> = outcomes
            .iter()
            .filter_map(|outcome| match &outcome.result {
                Ok(()) => None,
                Err(e) => Some(RecordFailure { osm_id: outcome.osm_id, stage: e.stage(), message: e.to_string() }),
            })
            .collect();

        Self {
            started_at,
            fetched: outcomes.len(),
            succeeded: outcomes.len() - failures.len(),
            failed: failures.len(),
            elapsed_time,
            failures,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.fetched == 0 {
            0.0
        } else {
            (self.succeeded as f64 / self.fetched as f64) * 100.0
        }
    }
}

/// Main sync pipeline
pub struct Pipeline<S: ActivityStore> {
    store: S,
}

impl<S: ActivityStore> Pipeline<S> {
    /// Create a new pipeline writing into `store`
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Release the store, e.g. to close the database session
    pub fn into_store(self) -> S {
        self.store
    }

    /// Fetch once from Overpass, then transform and load every node
    pub async fn run(&mut self, client: &OverpassClient, query: &OverpassQuery) -> Result<SyncStats> {
        let nodes = extract::extract_nodes_from_api(client, query).await?;

        let stats = self.process(&nodes).await;
        self.print_final_stats(&stats);

        Ok(stats)
    }

    /// Transform and load each node in order
    pub async fn process(&mut self, nodes: &[OsmNode]) -> SyncStats {
        let started_at = Utc::now();
        let start_time = Instant::now();

        tracing::info!("Processing {} nodes", nodes.len());
        println!("\n🚀 Writing {} activities...", nodes.len());

        let mut outcomes = Vec::with_capacity(nodes.len());
        for node in nodes {
            let result = self.process_record(node).await;

            match &result {
                Ok(()) => println!("   ✅ Activity {} inserted or updated", node.id),
                Err(e) => {
                    tracing::warn!("{} failed for node {}: {}", e.stage(), node.id, e);
                    println!("   ❌ Activity {} failed: {}", node.id, e);
                }
            }

            outcomes.push(RecordOutcome { osm_id: node.id, result });
        }

        SyncStats::from_outcomes(started_at, &outcomes, start_time.elapsed())
    }

    async fn process_record(&mut self, node: &OsmNode) -> Result<(), RecordError> {
        let activity = transform::transform_node(node)?;
        self.store.upsert(&activity).await?;
        Ok(())
    }

    /// Print final statistics
    fn print_final_stats(&self, stats: &SyncStats) {
        println!("\n📊 Sync Statistics:");
        println!("   🕐 Started: {}", stats.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
        println!("   ⏱️  Total time: {:.2}s", stats.elapsed_time.as_secs_f64());
        println!("   ✅ Success rate: {:.1}%", stats.success_rate());

        if !stats.failures.is_empty() {
            println!("\n❌ Failed records: {}", stats.failures.len());
            for (i, failure) in stats.failures.iter().take(5).enumerate() {
                println!("   {}. [{}] Node {}: {}", i + 1, failure.stage, failure.osm_id, failure.message);
            }
            if stats.failures.len() > 5 {
                println!("   ... and {} more failures", stats.failures.len() - 5);
            }
        }

        println!(
            "\n📦 Sync complete: {} fetched, {} inserted or updated, {} failed",
            stats.fetched, stats.succeeded, stats.failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Activity;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};

    /// Keyed by osm_id like the `activities` table, with injectable write failures
    #[derive(Default)]
    struct InMemoryStore {
        rows: HashMap<i64, Activity>,
        fail_on: HashSet<i64>,
        writes: usize,
    }

    #[async_trait]
    impl ActivityStore for InMemoryStore {
        async fn upsert(&mut self, activity: &Activity) -> Result<(), sqlx::Error> {
            self.writes += 1;
            if self.fail_on.contains(&activity.osm_id) {
                return Err(sqlx::Error::Protocol(format!("constraint violated for {}", activity.osm_id)));
            }
            self.rows.insert(activity.osm_id, activity.clone());
            Ok(())
        }
    }

    fn node(id: i64, tags: &[(&str, &str)]) -> OsmNode {
        OsmNode {
            id,
            lat: 46.85,
            lon: 9.53,
            tags: tags.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[tokio::test]
    async fn test_empty_result_set() {
        let mut pipeline = Pipeline::new(InMemoryStore::default());

        let stats = pipeline.process(&[]).await;
        assert_eq!(stats.fetched, 0);
        assert_eq!(stats.succeeded, 0);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.success_rate(), 0.0);
        assert_eq!(pipeline.into_store().writes, 0);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_and_last_write_wins() {
        let mut pipeline = Pipeline::new(InMemoryStore::default());

        let first = node(7, &[("amenity", "library"), ("name", "Kantonsbibliothek")]);
        let second = node(7, &[("amenity", "library"), ("name", "Kantonsbibliothek Graubünden"), ("opening_hours", "Mo-Fr 10:00-18:00")]);

        pipeline.process(&[first]).await;
        let stats = pipeline.process(&[second]).await;
        assert_eq!(stats.succeeded, 1);

        let store = pipeline.into_store();
        assert_eq!(store.rows.len(), 1);
        let row = &store.rows[&7];
        assert_eq!(row.name, "Kantonsbibliothek Graubünden");
        assert_eq!(row.opening_hours.as_deref(), Some("Mo-Fr 10:00-18:00"));
    }

    #[tokio::test]
    async fn test_failed_write_does_not_stop_the_run() {
        let mut store = InMemoryStore::default();
        store.fail_on.insert(2);
        let mut pipeline = Pipeline::new(store);

        let nodes = vec![
            node(1, &[("leisure", "playground")]),
            node(2, &[("amenity", "museum")]),
            node(3, &[("leisure", "swimming_pool")]),
        ];

        let stats = pipeline.process(&nodes).await;
        assert_eq!(stats.fetched, 3);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.failures[0].osm_id, 2);
        assert_eq!(stats.failures[0].stage, PipelineStage::Load);

        let store = pipeline.into_store();
        assert_eq!(store.writes, 3);
        assert!(store.rows.contains_key(&1));
        assert!(!store.rows.contains_key(&2));
        assert!(store.rows.contains_key(&3));
    }

    #[tokio::test]
    async fn test_transform_failure_skips_the_write() {
        let mut pipeline = Pipeline::new(InMemoryStore::default());

        let nodes = vec![node(10, &[("name", "Ohne Kategorie")]), node(11, &[("amenity", "library")])];

        let stats = pipeline.process(&nodes).await;
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.failures[0].stage, PipelineStage::Transform);
        assert_eq!(pipeline.into_store().writes, 1);
    }

    #[test]
    fn test_stats_from_outcomes() {
        let outcomes = vec![
            RecordOutcome { osm_id: 1, result: Ok(()) },
            RecordOutcome { osm_id: 2, result: Err(TransformError::MissingCategory(2).into()) },
            RecordOutcome { osm_id: 3, result: Ok(()) },
            RecordOutcome { osm_id: 4, result: Ok(()) },
        ];

        let stats = SyncStats::from_outcomes(Utc::now(), &outcomes, Duration::from_secs(1));
        assert_eq!(stats.fetched, 4);
        assert_eq!(stats.succeeded, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.success_rate(), 75.0);
        assert_eq!(stats.failures[0].message, "node 2 has neither a leisure nor an amenity tag");
    }
}
