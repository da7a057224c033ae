use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entities::prelude::*;
use crate::entities::tags;

pub struct TagRepository {
    conn: DatabaseConnection,
}

impl TagRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// List the user's tags, name descending. With `attached_only`, keep
    /// only tags linked to at least one destination, each exactly once.
    pub async fn list(&self, user_id: i32, attached_only: bool) -> Result<Vec<tags::Model>> {
        let mut query = Tags::find().filter(tags::Column::UserId.eq(user_id));

        if attached_only {
            query = query
                .join(JoinType::InnerJoin, tags::Relation::DestinationTags.def())
                .distinct();
        }

        query
            .order_by_desc(tags::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list tags")
    }

    pub async fn get(&self, user_id: i32, id: i32) -> Result<Option<tags::Model>> {
        Tags::find_by_id(id)
            .filter(tags::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query tag")
    }

    /// True if the user already has another tag with this name.
    pub async fn name_taken(&self, user_id: i32, name: &str, exclude_id: i32) -> Result<bool> {
        let existing = Tags::find()
            .filter(tags::Column::UserId.eq(user_id))
            .filter(tags::Column::Name.eq(name))
            .filter(tags::Column::Id.ne(exclude_id))
            .one(&self.conn)
            .await
            .context("Failed to check tag name")?;

        Ok(existing.is_some())
    }

    pub async fn rename(&self, user_id: i32, id: i32, name: &str) -> Result<Option<tags::Model>> {
        let Some(tag) = self.get(user_id, id).await? else {
            return Ok(None);
        };

        let mut active: tags::ActiveModel = tag.into();
        active.name = Set(name.to_string());
        let updated = active.update(&self.conn).await?;

        Ok(Some(updated))
    }

    pub async fn remove(&self, user_id: i32, id: i32) -> Result<bool> {
        let res = Tags::delete_many()
            .filter(tags::Column::Id.eq(id))
            .filter(tags::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete tag")?;

        Ok(res.rows_affected > 0)
    }
}
