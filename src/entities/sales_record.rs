use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "sales_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub sales_id: i32,
    pub product_variant_id: i32,
    pub qty: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price_each: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::entities::sales::Entity",
        from = "Column::SalesId",
        to = "crate::entities::sales::Column::Id",
        on_delete = "Cascade"
    )]
    Sales,
    #[sea_orm(
        belongs_to = "crate::entities::product_variant::Entity",
        from = "Column::ProductVariantId",
        to = "crate::entities::product_variant::Column::Id"
    )]
    ProductVariant,
}

impl Related<crate::entities::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl Related<crate::entities::product_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductVariant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
