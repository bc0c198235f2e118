use crate::{
    db::DbPool,
    entities::brand::{self, Entity as BrandEntity},
    errors::ServiceError,
    services::{contains_ci, ListRequest, ListResponse},
};
use sea_orm::{
    ActiveModelTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BrandInput {
    #[validate(length(min = 1, max = 255, message = "brand_name is required"))]
    pub brand_name: String,
}

#[derive(Clone)]
pub struct BrandService {
    db_pool: Arc<DbPool>,
}

impl BrandService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: BrandInput) -> Result<brand::Model, ServiceError> {
        input.validate()?;
        let model = brand::ActiveModel {
            brand_name: Set(input.brand_name),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::db("create_brand", e))?;

        info!(brand_id = model.brand_id, "Brand created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, brand_id: i32) -> Result<brand::Model, ServiceError> {
        BrandEntity::find_by_id(brand_id)
            .one(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("get_brand", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("Brand {} not found", brand_id)))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        request: &ListRequest,
    ) -> Result<ListResponse<brand::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = BrandEntity::find();
        if let Some(search) = request.search() {
            query = query.filter(contains_ci(brand::Column::BrandName, search));
        }

        let total = query
            .clone()
            .count(db)
            .await
            .map_err(|e| ServiceError::db("count_brands", e))?;
        let items = query
            .order_by_asc(brand::Column::BrandId)
            .offset(request.offset)
            .limit(request.limit)
            .all(db)
            .await
            .map_err(|e| ServiceError::db("list_brands", e))?;

        Ok(ListResponse::new(items, total, request))
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, brand_id: i32, input: BrandInput) -> Result<brand::Model, ServiceError> {
        input.validate()?;
        let mut active: brand::ActiveModel = self.get(brand_id).await?.into();
        active.brand_name = Set(input.brand_name);
        active
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("update_brand", e))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, brand_id: i32) -> Result<(), ServiceError> {
        let result = BrandEntity::delete_by_id(brand_id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("delete_brand", e))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Brand {} not found", brand_id)));
        }
        info!(brand_id, "Brand deleted");
        Ok(())
    }
}
