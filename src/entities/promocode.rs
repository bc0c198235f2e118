use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum DiscountType {
    /// Fixed amount, applied only above `order_limit_price`.
    #[sea_orm(string_value = "FLAT")]
    Flat,
    /// Percentage of the order sum, applied unconditionally.
    #[sea_orm(string_value = "PERCENT")]
    Percent,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "promocodes")]
#[schema(as = Promocode)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub promocode_id: i32,
    #[sea_orm(unique)]
    pub promocode_name: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub discount: Decimal,
    pub discount_type: DiscountType,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub order_limit_price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
