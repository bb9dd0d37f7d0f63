//! Profile entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::blog::Entity")]
    Blog,
}

impl Related<super::blog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Profile.
impl From<Model> for blogify_core::domain::Profile {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            username: model.username,
            display_name: model.display_name,
            created_at: model.created_at.into(),
        }
    }
}

/// Conversion from Domain Profile to SeaORM ActiveModel.
impl From<blogify_core::domain::Profile> for ActiveModel {
    fn from(profile: blogify_core::domain::Profile) -> Self {
        Self {
            user_id: Set(profile.user_id),
            username: Set(profile.username),
            display_name: Set(profile.display_name),
            created_at: Set(profile.created_at.into()),
        }
    }
}
