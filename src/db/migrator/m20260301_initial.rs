use crate::entities::prelude::*;
use crate::entities::{destination_features, destination_tags, features, tags};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Owner table first, then the owned tables, then the link tables.
        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AuthTokens)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Tags)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Features)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Destinations)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(DestinationTags)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(DestinationFeatures)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Label names are unique per owner; this is what closes the
        // get-or-create race window under concurrent identical requests.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-tags-user-name")
                    .table(Tags)
                    .col(tags::Column::UserId)
                    .col(tags::Column::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-features-user-name")
                    .table(Features)
                    .col(features::Column::UserId)
                    .col(features::Column::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-destination-tags-link")
                    .table(DestinationTags)
                    .col(destination_tags::Column::DestinationId)
                    .col(destination_tags::Column::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-destination-features-link")
                    .table(DestinationFeatures)
                    .col(destination_features::Column::DestinationId)
                    .col(destination_features::Column::FeatureId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DestinationFeatures).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DestinationTags).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Destinations).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Features).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthTokens).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
