use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Basket line; `count` is always at least 1
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "basket_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub basket_id: i32,
    pub product_id: i32,
    pub count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::basket::Entity",
        from = "Column::BasketId",
        to = "super::basket::Column::Id",
        on_delete = "Cascade"
    )]
    Basket,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::basket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Basket.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
