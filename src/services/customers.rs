use crate::{
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity},
    errors::ServiceError,
    services::{contains_ci, ListRequest, ListResponse},
};
use sea_orm::{
    ActiveModelTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    #[validate(length(max = 25))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[validate(length(max = 10))]
    pub zip_code: Option<String>,
}

/// Service for managing customers
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CustomerInput) -> Result<customer::Model, ServiceError> {
        input.validate()?;
        let model = customer::ActiveModel {
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
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
        .map_err(|e| ServiceError::db("create_customer", e))?;

        info!(customer_id = model.customer_id, "Customer created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, customer_id: i32) -> Result<customer::Model, ServiceError> {
        CustomerEntity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("get_customer", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))
    }

    /// Lists customers; `search` matches first or last name.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        request: &ListRequest,
    ) -> Result<ListResponse<customer::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = CustomerEntity::find();
        if let Some(search) = request.search() {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(customer::Column::FirstName, search))
                    .add(contains_ci(customer::Column::LastName, search)),
            );
        }

        let total = query
            .clone()
            .count(db)
            .await
            .map_err(|e| ServiceError::db("count_customers", e))?;
        let items = query
            .order_by_asc(customer::Column::CustomerId)
            .offset(request.offset)
            .limit(request.limit)
            .all(db)
            .await
            .map_err(|e| ServiceError::db("list_customers", e))?;

        Ok(ListResponse::new(items, total, request))
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        customer_id: i32,
        input: CustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;
        let mut active: customer::ActiveModel = self.get(customer_id).await?.into();
        active.first_name = Set(input.first_name);
        active.last_name = Set(input.last_name);
        active.phone = Set(input.phone);
        active.email = Set(input.email);
        active.street = Set(input.street);
        active.city = Set(input.city);
        active.state = Set(input.state);
        active.zip_code = Set(input.zip_code);
        active
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("update_customer", e))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, customer_id: i32) -> Result<(), ServiceError> {
        let result = CustomerEntity::delete_by_id(customer_id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("delete_customer", e))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Customer {} not found",
                customer_id
            )));
        }
        Ok(())
    }
}
