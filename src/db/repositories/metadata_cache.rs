use crate::domain::SeriesId;
use crate::entities::{metadata_cache, prelude::*};
use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

pub struct MetadataCacheRepository {
    conn: DatabaseConnection,
}

impl MetadataCacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Cached payload for `series`, unless it has expired.
    pub async fn get_fresh(&self, series: SeriesId) -> Result<Option<String>> {
        let now = timestamp(chrono::Utc::now());

        let entry = MetadataCache::find()
            .filter(metadata_cache::Column::SeriesId.eq(series_key(series)?))
            .filter(metadata_cache::Column::ExpiresAt.gt(now))
            .one(&self.conn)
            .await?;

        Ok(entry.map(|e| e.payload_json))
    }

    pub async fn put(&self, series: SeriesId, payload_json: &str, ttl: chrono::Duration) -> Result<()> {
        let now = chrono::Utc::now();

        let active_model = metadata_cache::ActiveModel {
            series_id: Set(series_key(series)?),
            payload_json: Set(payload_json.to_string()),
            fetched_at: Set(timestamp(now)),
            expires_at: Set(timestamp(now + ttl)),
        };

        MetadataCache::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(metadata_cache::Column::SeriesId)
                    .update_columns([
                        metadata_cache::Column::PayloadJson,
                        metadata_cache::Column::FetchedAt,
                        metadata_cache::Column::ExpiresAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}

/// Fixed-width so stored timestamps compare correctly as strings.
fn timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

fn series_key(series: SeriesId) -> Result<i64> {
    i64::try_from(series.value()).with_context(|| format!("series id {series} out of range"))
}
