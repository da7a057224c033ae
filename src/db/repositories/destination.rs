use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use crate::entities::prelude::*;
use crate::entities::{destination_features, destination_tags, destinations, features, tags};

/// Payload for creating a destination. The label lists are already popped
/// out of the request body; the row itself never sees them.
pub struct NewDestination {
    pub name: String,
    pub description: Option<String>,
    pub country: String,
    pub city: String,
    pub rating: f64,
    pub tags: Vec<String>,
    pub features: Vec<String>,
}

/// Field-wise changes for an update. Scalar `None`s leave the column
/// untouched. For the label lists, `Some` (even an empty vec) is
/// authoritative and replaces the whole relation set; `None` keeps it.
#[derive(Default)]
pub struct DestinationChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub rating: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
}

/// Optional any-of ID filters for the list operation. When both are given,
/// each narrows independently.
#[derive(Default)]
pub struct DestinationFilter {
    pub tag_ids: Option<Vec<i32>>,
    pub feature_ids: Option<Vec<i32>>,
}

pub struct DestinationRepository {
    conn: DatabaseConnection,
}

impl DestinationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// List the user's destinations, id descending. A destination matching
    /// several of the given label IDs still appears once.
    pub async fn list(
        &self,
        user_id: i32,
        filter: &DestinationFilter,
    ) -> Result<Vec<destinations::Model>> {
        let mut query = Destinations::find().filter(destinations::Column::UserId.eq(user_id));

        if let Some(tag_ids) = &filter.tag_ids {
            query = query
                .join(
                    JoinType::InnerJoin,
                    destinations::Relation::DestinationTags.def(),
                )
                .filter(destination_tags::Column::TagId.is_in(tag_ids.iter().copied()));
        }

        if let Some(feature_ids) = &filter.feature_ids {
            query = query
                .join(
                    JoinType::InnerJoin,
                    destinations::Relation::DestinationFeatures.def(),
                )
                .filter(destination_features::Column::FeatureId.is_in(feature_ids.iter().copied()));
        }

        query
            .distinct()
            .order_by_desc(destinations::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list destinations")
    }

    pub async fn get(&self, user_id: i32, id: i32) -> Result<Option<destinations::Model>> {
        Destinations::find_by_id(id)
            .filter(destinations::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query destination")
    }

    /// Create the row, then get-or-create and attach each named label in
    /// input order, all inside one transaction.
    pub async fn create(&self, user_id: i32, data: NewDestination) -> Result<destinations::Model> {
        let txn = self.conn.begin().await?;
        let now = chrono::Utc::now().to_rfc3339();

        let res = Destinations::insert(destinations::ActiveModel {
            user_id: Set(user_id),
            name: Set(data.name),
            description: Set(data.description),
            country: Set(data.country),
            city: Set(data.city),
            rating: Set(data.rating),
            image: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        })
        .exec(&txn)
        .await
        .context("Failed to insert destination")?;

        let destination_id = res.last_insert_id;

        attach_tags(&txn, user_id, destination_id, &data.tags).await?;
        attach_features(&txn, user_id, destination_id, &data.features).await?;

        let model = Destinations::find_by_id(destination_id)
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created destination"))?;

        txn.commit().await?;
        Ok(model)
    }

    /// Apply scalar changes, then reconcile any label list that is present
    /// by clearing the existing links and re-attaching from scratch. Either
    /// everything lands or nothing does.
    pub async fn update(
        &self,
        user_id: i32,
        id: i32,
        changes: DestinationChanges,
    ) -> Result<Option<destinations::Model>> {
        let txn = self.conn.begin().await?;

        let Some(existing) = Destinations::find_by_id(id)
            .filter(destinations::Column::UserId.eq(user_id))
            .one(&txn)
            .await
            .context("Failed to query destination for update")?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: destinations::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(country) = changes.country {
            active.country = Set(country);
        }
        if let Some(city) = changes.city {
            active.city = Set(city);
        }
        if let Some(rating) = changes.rating {
            active.rating = Set(rating);
        }
        active.updated_at = Set(now);
        let model = active.update(&txn).await?;

        if let Some(names) = changes.tags {
            DestinationTags::delete_many()
                .filter(destination_tags::Column::DestinationId.eq(id))
                .exec(&txn)
                .await?;
            attach_tags(&txn, user_id, id, &names).await?;
        }

        if let Some(names) = changes.features {
            DestinationFeatures::delete_many()
                .filter(destination_features::Column::DestinationId.eq(id))
                .exec(&txn)
                .await?;
            attach_features(&txn, user_id, id, &names).await?;
        }

        txn.commit().await?;
        Ok(Some(model))
    }

    pub async fn remove(&self, user_id: i32, id: i32) -> Result<bool> {
        let res = Destinations::delete_many()
            .filter(destinations::Column::Id.eq(id))
            .filter(destinations::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete destination")?;

        Ok(res.rows_affected > 0)
    }

    /// Persist the stored filename of an uploaded image. The previous file,
    /// if any, stays on disk.
    pub async fn set_image(
        &self,
        user_id: i32,
        id: i32,
        filename: &str,
    ) -> Result<Option<destinations::Model>> {
        let Some(existing) = self.get(user_id, id).await? else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: destinations::ActiveModel = existing.into();
        active.image = Set(Some(filename.to_string()));
        active.updated_at = Set(now);
        let updated = active.update(&self.conn).await?;

        Ok(Some(updated))
    }

    /// Tags attached to one destination, in attachment order.
    pub async fn tags_for(&self, destination_id: i32) -> Result<Vec<tags::Model>> {
        let rows = DestinationTags::find()
            .filter(destination_tags::Column::DestinationId.eq(destination_id))
            .order_by_asc(destination_tags::Column::Id)
            .find_also_related(Tags)
            .all(&self.conn)
            .await
            .context("Failed to load tags for destination")?;

        Ok(rows.into_iter().filter_map(|(_, tag)| tag).collect())
    }

    pub async fn features_for(&self, destination_id: i32) -> Result<Vec<features::Model>> {
        let rows = DestinationFeatures::find()
            .filter(destination_features::Column::DestinationId.eq(destination_id))
            .order_by_asc(destination_features::Column::Id)
            .find_also_related(Features)
            .all(&self.conn)
            .await
            .context("Failed to load features for destination")?;

        Ok(rows.into_iter().filter_map(|(_, feature)| feature).collect())
    }

    /// Batched variant of `tags_for` for the list endpoint.
    pub async fn tags_for_many(&self, ids: &[i32]) -> Result<HashMap<i32, Vec<tags::Model>>> {
        let rows = DestinationTags::find()
            .filter(destination_tags::Column::DestinationId.is_in(ids.iter().copied()))
            .order_by_asc(destination_tags::Column::Id)
            .find_also_related(Tags)
            .all(&self.conn)
            .await
            .context("Failed to load tags for destinations")?;

        let mut map: HashMap<i32, Vec<tags::Model>> = HashMap::new();
        for (link, tag) in rows {
            if let Some(tag) = tag {
                map.entry(link.destination_id).or_default().push(tag);
            }
        }

        Ok(map)
    }

    pub async fn features_for_many(
        &self,
        ids: &[i32],
    ) -> Result<HashMap<i32, Vec<features::Model>>> {
        let rows = DestinationFeatures::find()
            .filter(destination_features::Column::DestinationId.is_in(ids.iter().copied()))
            .order_by_asc(destination_features::Column::Id)
            .find_also_related(Features)
            .all(&self.conn)
            .await
            .context("Failed to load features for destinations")?;

        let mut map: HashMap<i32, Vec<features::Model>> = HashMap::new();
        for (link, feature) in rows {
            if let Some(feature) = feature {
                map.entry(link.destination_id).or_default().push(feature);
            }
        }

        Ok(map)
    }
}

/// Get-or-create each named tag for the user and link it to the
/// destination. Names are deduplicated first-seen-first, so a repeated name
/// attaches once and keeps its original position.
async fn attach_tags<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    destination_id: i32,
    names: &[String],
) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();

    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }

        let tag = get_or_create_tag(conn, user_id, name).await?;

        DestinationTags::insert(destination_tags::ActiveModel {
            destination_id: Set(destination_id),
            tag_id: Set(tag.id),
            ..Default::default()
        })
        .exec(conn)
        .await
        .context("Failed to link tag to destination")?;
    }

    Ok(())
}

async fn attach_features<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    destination_id: i32,
    names: &[String],
) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();

    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }

        let feature = get_or_create_feature(conn, user_id, name).await?;

        DestinationFeatures::insert(destination_features::ActiveModel {
            destination_id: Set(destination_id),
            feature_id: Set(feature.id),
            ..Default::default()
        })
        .exec(conn)
        .await
        .context("Failed to link feature to destination")?;
    }

    Ok(())
}

async fn get_or_create_tag<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    name: &str,
) -> Result<tags::Model> {
    let existing = Tags::find()
        .filter(tags::Column::UserId.eq(user_id))
        .filter(tags::Column::Name.eq(name))
        .one(conn)
        .await
        .context("Failed to query tag for get-or-create")?;

    if let Some(tag) = existing {
        return Ok(tag);
    }

    let res = Tags::insert(tags::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        ..Default::default()
    })
    .exec(conn)
    .await
    .context("Failed to insert tag")?;

    Tags::find_by_id(res.last_insert_id)
        .one(conn)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created tag"))
}

async fn get_or_create_feature<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    name: &str,
) -> Result<features::Model> {
    let existing = Features::find()
        .filter(features::Column::UserId.eq(user_id))
        .filter(features::Column::Name.eq(name))
        .one(conn)
        .await
        .context("Failed to query feature for get-or-create")?;

    if let Some(feature) = existing {
        return Ok(feature);
    }

    let res = Features::insert(features::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        ..Default::default()
    })
    .exec(conn)
    .await
    .context("Failed to insert feature")?;

    Features::find_by_id(res.last_insert_id)
        .one(conn)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created feature"))
}
