use crate::entities::{local_state, prelude::*};
use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

pub struct StateRepository {
    conn: DatabaseConnection,
}

impl StateRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = LocalState::find_by_id(key.to_string())
            .one(&self.conn)
            .await?;
        Ok(row.map(|m| m.value))
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        let active_model = local_state::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        LocalState::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(local_state::Column::Key)
                    .update_columns([local_state::Column::Value, local_state::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}
