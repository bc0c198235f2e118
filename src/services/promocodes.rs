use crate::{
    db::DbPool,
    entities::promocode::{self, DiscountType, Entity as PromocodeEntity},
    errors::ServiceError,
    services::{contains_ci, equals_ci, validate_money, ListRequest, ListResponse},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_percent"))]
pub struct PromocodeInput {
    #[validate(length(min = 1, max = 255, message = "promocode_name is required"))]
    pub promocode_name: String,
    #[validate(custom = "validate_money")]
    #[schema(value_type = String, example = "10")]
    pub discount: Decimal,
    pub discount_type: DiscountType,
    #[serde(default)]
    #[validate(custom = "validate_money")]
    #[schema(value_type = String, example = "50")]
    pub order_limit_price: Decimal,
}

fn validate_percent(input: &PromocodeInput) -> Result<(), ValidationError> {
    if input.discount_type == DiscountType::Percent
        && (input.discount <= Decimal::ZERO || input.discount > Decimal::ONE_HUNDRED)
    {
        let mut err = ValidationError::new("discount");
        err.message = Some("a PERCENT discount must be within (0, 100]".into());
        return Err(err);
    }
    Ok(())
}

/// Promocodes are created and deleted, never edited.
#[derive(Clone)]
pub struct PromocodeService {
    db_pool: Arc<DbPool>,
}

impl PromocodeService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input), fields(promocode_name = %input.promocode_name))]
    pub async fn create(&self, input: PromocodeInput) -> Result<promocode::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;
        let name = input.promocode_name.trim().to_string();

        let duplicate = PromocodeEntity::find()
            .filter(equals_ci(promocode::Column::PromocodeName, &name))
            .one(db)
            .await
            .map_err(|e| ServiceError::db("find_promocode", e))?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Promocode {} already exists",
                name
            )));
        }

        let model = promocode::ActiveModel {
            promocode_name: Set(name),
            discount: Set(input.discount),
            discount_type: Set(input.discount_type),
            order_limit_price: Set(input.order_limit_price),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| ServiceError::db("create_promocode", e))?;

        info!(promocode_id = model.promocode_id, "Promocode created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, promocode_id: i32) -> Result<promocode::Model, ServiceError> {
        PromocodeEntity::find_by_id(promocode_id)
            .one(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("get_promocode", e))?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Promocode {} not found", promocode_id))
            })
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        request: &ListRequest,
    ) -> Result<ListResponse<promocode::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = PromocodeEntity::find();
        if let Some(search) = request.search() {
            query = query.filter(contains_ci(promocode::Column::PromocodeName, search));
        }

        let total = query
            .clone()
            .count(db)
            .await
            .map_err(|e| ServiceError::db("count_promocodes", e))?;
        let items = query
            .order_by_asc(promocode::Column::PromocodeId)
            .offset(request.offset)
            .limit(request.limit)
            .all(db)
            .await
            .map_err(|e| ServiceError::db("list_promocodes", e))?;

        Ok(ListResponse::new(items, total, request))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, promocode_id: i32) -> Result<(), ServiceError> {
        let result = PromocodeEntity::delete_by_id(promocode_id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("delete_promocode", e))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Promocode {} not found",
                promocode_id
            )));
        }
        info!(promocode_id, "Promocode deleted");
        Ok(())
    }
}
