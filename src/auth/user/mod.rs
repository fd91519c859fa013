use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Database entity for storefront accounts
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub first_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Staff accounts get the `admin` role
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Model {
    pub fn roles(&self) -> Vec<String> {
        let mut roles = vec!["customer".to_string()];
        if self.is_staff {
            roles.push("admin".to_string());
        }
        roles
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "crate::entities::profile::Entity")]
    Profile,
    #[sea_orm(has_one = "crate::entities::commerce::basket::Entity")]
    Basket,
    #[sea_orm(has_many = "crate::entities::commerce::review::Entity")]
    Reviews,
}

impl Related<crate::entities::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<crate::entities::commerce::basket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Basket.def()
    }
}

impl Related<crate::entities::commerce::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
