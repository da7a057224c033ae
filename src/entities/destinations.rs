use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "destinations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub name: String,

    pub description: Option<String>,

    pub country: String,

    pub city: String,

    /// Validated at the API boundary to one fractional digit in -9.9..=9.9
    pub rating: f64,

    /// Stored upload filename, served under /media
    pub image: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::destination_tags::Entity")]
    DestinationTags,
    #[sea_orm(has_many = "super::destination_features::Entity")]
    DestinationFeatures,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::destination_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DestinationTags.def()
    }
}

impl Related<super::destination_features::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DestinationFeatures.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
