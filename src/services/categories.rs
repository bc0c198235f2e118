use crate::{
    db::DbPool,
    entities::category::{self, Entity as CategoryEntity},
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
pub struct CategoryInput {
    #[validate(length(min = 1, max = 255, message = "category_name is required"))]
    pub category_name: String,
}

#[derive(Clone)]
pub struct CategoryService {
    db_pool: Arc<DbPool>,
}

impl CategoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CategoryInput) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let model = category::ActiveModel {
            category_name: Set(input.category_name),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::db("create_category", e))?;

        info!(category_id = model.category_id, "Category created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, category_id: i32) -> Result<category::Model, ServiceError> {
        CategoryEntity::find_by_id(category_id)
            .one(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("get_category", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", category_id)))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        request: &ListRequest,
    ) -> Result<ListResponse<category::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = CategoryEntity::find();
        if let Some(search) = request.search() {
            query = query.filter(contains_ci(category::Column::CategoryName, search));
        }

        let total = query
            .clone()
            .count(db)
            .await
            .map_err(|e| ServiceError::db("count_categories", e))?;
        let items = query
            .order_by_asc(category::Column::CategoryId)
            .offset(request.offset)
            .limit(request.limit)
            .all(db)
            .await
            .map_err(|e| ServiceError::db("list_categories", e))?;

        Ok(ListResponse::new(items, total, request))
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, category_id: i32, input: CategoryInput) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let mut active: category::ActiveModel = self.get(category_id).await?.into();
        active.category_name = Set(input.category_name);
        active
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("update_category", e))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, category_id: i32) -> Result<(), ServiceError> {
        let result = CategoryEntity::delete_by_id(category_id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("delete_category", e))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Category {} not found", category_id)));
        }
        info!(category_id, "Category deleted");
        Ok(())
    }
}
