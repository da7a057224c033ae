use sea_orm::entity::prelude::*;

/// Per-user label. (user_id, name) is UNIQUE at the schema level, which is
/// what makes get-or-create safe under concurrent identical requests.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub name: String,
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

impl ActiveModelBehavior for ActiveModel {}
