use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entities::features;
use crate::entities::prelude::*;

pub struct FeatureRepository {
    conn: DatabaseConnection,
}

impl FeatureRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Same contract as `TagRepository::list`, over the features table.
    pub async fn list(&self, user_id: i32, attached_only: bool) -> Result<Vec<features::Model>> {
        let mut query = Features::find().filter(features::Column::UserId.eq(user_id));

        if attached_only {
            query = query
                .join(
                    JoinType::InnerJoin,
                    features::Relation::DestinationFeatures.def(),
                )
                .distinct();
        }

        query
            .order_by_desc(features::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list features")
    }

    pub async fn get(&self, user_id: i32, id: i32) -> Result<Option<features::Model>> {
        Features::find_by_id(id)
            .filter(features::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query feature")
    }

    pub async fn name_taken(&self, user_id: i32, name: &str, exclude_id: i32) -> Result<bool> {
        let existing = Features::find()
            .filter(features::Column::UserId.eq(user_id))
            .filter(features::Column::Name.eq(name))
            .filter(features::Column::Id.ne(exclude_id))
            .one(&self.conn)
            .await
            .context("Failed to check feature name")?;

        Ok(existing.is_some())
    }

    pub async fn rename(
        &self,
        user_id: i32,
        id: i32,
        name: &str,
    ) -> Result<Option<features::Model>> {
        let Some(feature) = self.get(user_id, id).await? else {
            return Ok(None);
        };

        let mut active: features::ActiveModel = feature.into();
        active.name = Set(name.to_string());
        let updated = active.update(&self.conn).await?;

        Ok(Some(updated))
    }

    pub async fn remove(&self, user_id: i32, id: i32) -> Result<bool> {
        let res = Features::delete_many()
            .filter(features::Column::Id.eq(id))
            .filter(features::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete feature")?;

        Ok(res.rows_affected > 0)
    }
}
