use sea_orm::entity::prelude::*;

/// Operator-curated override document for one episode
/// (`series/{series_id}/seasons/{season}/episodes/{episode}`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "override_episodes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub series_id: i64,
    pub season: i32,
    pub episode: i32,
    /// JSON array of alternate stream URIs.
    #[sea_orm(column_type = "Text")]
    pub links_json: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
