use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(LocalState)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(OverrideEpisodes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(MetadataCache)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One override document per episode path.
        manager
            .create_index(
                Index::create()
                    .name("idx_override_episodes_path")
                    .table(OverrideEpisodesIden::Table)
                    .col(OverrideEpisodesIden::SeriesId)
                    .col(OverrideEpisodesIden::Season)
                    .col(OverrideEpisodesIden::Episode)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MetadataCacheIden::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OverrideEpisodesIden::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LocalStateIden::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OverrideEpisodesIden {
    #[sea_orm(iden = "override_episodes")]
    Table,
    SeriesId,
    Season,
    Episode,
}

#[derive(DeriveIden)]
enum LocalStateIden {
    #[sea_orm(iden = "local_state")]
    Table,
}

#[derive(DeriveIden)]
enum MetadataCacheIden {
    #[sea_orm(iden = "metadata_cache")]
    Table,
}
