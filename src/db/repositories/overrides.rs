use crate::db::OverrideDocument;
use crate::domain::{EpisodeRef, SeriesId};
use crate::entities::{override_episodes, prelude::*};
use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::warn;

pub struct OverrideRepository {
    conn: DatabaseConnection,
}

impl OverrideRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(
        &self,
        series: SeriesId,
        episode: EpisodeRef,
    ) -> Result<Option<OverrideDocument>> {
        let row = OverrideEpisodes::find()
            .filter(override_episodes::Column::SeriesId.eq(series_column(series)?))
            .filter(override_episodes::Column::Season.eq(i32_column(episode.season())?))
            .filter(override_episodes::Column::Episode.eq(i32_column(episode.episode())?))
            .one(&self.conn)
            .await?;

        row.map(to_document).transpose()
    }

    /// Every override document; rows whose path is not a valid episode are skipped.
    pub async fn list_all(&self) -> Result<Vec<OverrideDocument>> {
        let rows = OverrideEpisodes::find()
            .order_by_asc(override_episodes::Column::SeriesId)
            .order_by_asc(override_episodes::Column::Season)
            .order_by_asc(override_episodes::Column::Episode)
            .all(&self.conn)
            .await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            match to_document(row) {
                Ok(doc) => documents.push(doc),
                Err(e) => warn!(row = id, error = %e, "Skipping malformed override document"),
            }
        }
        Ok(documents)
    }

    pub async fn upsert(&self, series: SeriesId, episode: EpisodeRef, links: &[String]) -> Result<()> {
        let active_model = override_episodes::ActiveModel {
            series_id: Set(series_column(series)?),
            season: Set(i32_column(episode.season())?),
            episode: Set(i32_column(episode.episode())?),
            links_json: Set(serde_json::to_string(links)?),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        OverrideEpisodes::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    override_episodes::Column::SeriesId,
                    override_episodes::Column::Season,
                    override_episodes::Column::Episode,
                ])
                .update_columns([
                    override_episodes::Column::LinksJson,
                    override_episodes::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, series: SeriesId, episode: EpisodeRef) -> Result<bool> {
        let result = OverrideEpisodes::delete_many()
            .filter(override_episodes::Column::SeriesId.eq(series_column(series)?))
            .filter(override_episodes::Column::Season.eq(i32_column(episode.season())?))
            .filter(override_episodes::Column::Episode.eq(i32_column(episode.episode())?))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

fn to_document(row: override_episodes::Model) -> Result<OverrideDocument> {
    let series = u64::try_from(row.series_id)
        .map(SeriesId::new)
        .with_context(|| format!("negative series id {}", row.series_id))?;
    let season = u32::try_from(row.season).context("negative season")?;
    let number = u32::try_from(row.episode).context("negative episode")?;
    let episode = EpisodeRef::new(season, number)?;
    let links: Vec<String> = serde_json::from_str(&row.links_json)?;

    Ok(OverrideDocument {
        series,
        episode,
        links,
    })
}

fn series_column(series: SeriesId) -> Result<i64> {
    i64::try_from(series.value()).with_context(|| format!("series id {series} out of range"))
}

fn i32_column(value: u32) -> Result<i32> {
    i32::try_from(value).with_context(|| format!("{value} out of range"))
}
