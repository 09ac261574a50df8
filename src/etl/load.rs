/// Load Module
///
/// Handles storing activities into the PostgreSQL `activities` table.
use async_trait::async_trait;
use sqlx::{Connection, PgConnection};

use crate::db::Database;
use crate::models::{Activity, WGS84_SRID};

const UPSERT_ACTIVITY: &str = r#"
    INSERT INTO activities (osm_id, osm_type, type, name, description, address, opening_hours, age_range, location)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, ST_GeomFromText($9, $10))
    ON CONFLICT (osm_id)
    DO UPDATE SET
        osm_type = EXCLUDED.osm_type,
        type = EXCLUDED.type,
        name = EXCLUDED.name,
        description = EXCLUDED.description,
        address = EXCLUDED.address,
        opening_hours = EXCLUDED.opening_hours,
        age_range = EXCLUDED.age_range,
        location = EXCLUDED.location
"#;

/// Destination for normalized activities
#[async_trait]
pub trait ActivityStore: Send {
    /// Insert or overwrite the row keyed by `activity.osm_id`, committed on return
    async fn upsert(&mut self, activity: &Activity) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl ActivityStore for Database {
    async fn upsert(&mut self, activity: &Activity) -> Result<(), sqlx::Error> {
        upsert_activity(self.connection(), activity).await
    }
}

/// Upsert one activity in its own transaction
///
/// Uses UPSERT logic (ON CONFLICT DO UPDATE): every non-key column is
/// overwritten with the incoming values. The transaction is committed on
/// success and rolled back on failure, so a bad record never leaves the
/// session in an aborted state for the next one.
pub async fn upsert_activity(conn: &mut PgConnection, activity: &Activity) -> Result<(), sqlx::Error> {
    let mut tx = conn.begin().await?;

    let result = sqlx::query(UPSERT_ACTIVITY)
        .bind(activity.osm_id)
        .bind(activity.osm_type.as_str())
        .bind(&activity.activity_type)
        .bind(&activity.name)
        .bind(&activity.description)
        .bind(&activity.address)
        .bind(&activity.opening_hours)
        .bind(&activity.age_range)
        .bind(activity.location_wkt())
        .bind(WGS84_SRID)
        .execute(&mut *tx)
        .await;

    match result {
        Ok(_) => {
            tx.commit().await?;
            tracing::debug!("Upserted activity {}", activity.osm_id);
            Ok(())
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!("Rollback failed for activity {}: {}", activity.osm_id, rollback_err);
            }
            Err(e)
        }
    }
}
