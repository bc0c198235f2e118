use crate::{
    db::DbPool,
    entities::store::{self, Entity as StoreEntity},
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
pub struct StoreInput {
    #[validate(length(min = 1, max = 255, message = "store_name is required"))]
    pub store_name: String,
    #[validate(length(max = 25))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[validate(length(max = 10))]
    pub zip_code: Option<String>,
}

#[derive(Clone)]
pub struct StoreService {
    db_pool: Arc<DbPool>,
}

impl StoreService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: StoreInput) -> Result<store::Model, ServiceError> {
        input.validate()?;
        let model = store::ActiveModel {
            store_name: Set(input.store_name),
            phone: Set(input.phone),
            email: Set(input.email),
            street: Set(input.street),
            city: Set(input.city),
            state: Set(input.state),
            zip_code: Set(input.zip_code),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::db("create_store", e))?;

        info!(store_id = model.store_id, "Store created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, store_id: i32) -> Result<store::Model, ServiceError> {
        StoreEntity::find_by_id(store_id)
            .one(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("get_store", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("Store {} not found", store_id)))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        request: &ListRequest,
    ) -> Result<ListResponse<store::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = StoreEntity::find();
        if let Some(search) = request.search() {
            query = query.filter(contains_ci(store::Column::StoreName, search));
        }

        let total = query
            .clone()
            .count(db)
            .await
            .map_err(|e| ServiceError::db("count_stores", e))?;
        let items = query
            .order_by_asc(store::Column::StoreId)
            .offset(request.offset)
            .limit(request.limit)
            .all(db)
            .await
            .map_err(|e| ServiceError::db("list_stores", e))?;

        Ok(ListResponse::new(items, total, request))
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, store_id: i32, input: StoreInput) -> Result<store::Model, ServiceError> {
        input.validate()?;
        let mut active: store::ActiveModel = self.get(store_id).await?.into();
        active.store_name = Set(input.store_name);
        active.phone = Set(input.phone);
        active.email = Set(input.email);
        active.street = Set(input.street);
        active.city = Set(input.city);
        active.state = Set(input.state);
        active.zip_code = Set(input.zip_code);
        active
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("update_store", e))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, store_id: i32) -> Result<(), ServiceError> {
        let result = StoreEntity::delete_by_id(store_id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("delete_store", e))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Store {} not found", store_id)));
        }
        info!(store_id, "Store deleted");
        Ok(())
    }
}
