use crate::{
    db::DbPool,
    entities::{
        staff::{self, Entity as StaffEntity},
        store,
    },
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

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StaffInput {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 25))]
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[validate(range(min = 1))]
    pub store_id: i32,
    pub manager_id: Option<i32>,
}

/// A staff member with the store they work at.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffDetails {
    #[serde(flatten)]
    pub staff: staff::Model,
    pub store_data: Option<store::Model>,
}

#[derive(Clone)]
pub struct StaffService {
    db_pool: Arc<DbPool>,
}

impl StaffService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: StaffInput) -> Result<staff::Model, ServiceError> {
        input.validate()?;
        let model = staff::ActiveModel {
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            phone: Set(input.phone),
            active: Set(input.active),
            store_id: Set(input.store_id),
            manager_id: Set(input.manager_id),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::db("create_staff", e))?;

        info!(staff_id = model.staff_id, "Staff member created");
        Ok(model)
    }

    async fn find(&self, staff_id: i32) -> Result<staff::Model, ServiceError> {
        StaffEntity::find_by_id(staff_id)
            .one(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("get_staff", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("Staff {} not found", staff_id)))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, staff_id: i32) -> Result<StaffDetails, ServiceError> {
        let (staff, store_data) = StaffEntity::find_by_id(staff_id)
            .find_also_related(store::Entity)
            .one(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("get_staff", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("Staff {} not found", staff_id)))?;
        Ok(StaffDetails { staff, store_data })
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        request: &ListRequest,
    ) -> Result<ListResponse<staff::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = StaffEntity::find();
        if let Some(search) = request.search() {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(staff::Column::FirstName, search))
                    .add(contains_ci(staff::Column::LastName, search)),
            );
        }

        let total = query
            .clone()
            .count(db)
            .await
            .map_err(|e| ServiceError::db("count_staffs", e))?;
        let items = query
            .order_by_asc(staff::Column::StaffId)
            .offset(request.offset)
            .limit(request.limit)
            .all(db)
            .await
            .map_err(|e| ServiceError::db("list_staffs", e))?;

        Ok(ListResponse::new(items, total, request))
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, staff_id: i32, input: StaffInput) -> Result<staff::Model, ServiceError> {
        input.validate()?;
        if input.manager_id == Some(staff_id) {
            return Err(ServiceError::ValidationError(
                "A staff member cannot manage themselves".to_string(),
            ));
        }
        let mut active: staff::ActiveModel = self.find(staff_id).await?.into();
        active.first_name = Set(input.first_name);
        active.last_name = Set(input.last_name);
        active.email = Set(input.email);
        active.phone = Set(input.phone);
        active.active = Set(input.active);
        active.store_id = Set(input.store_id);
        active.manager_id = Set(input.manager_id);
        active
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("update_staff", e))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, staff_id: i32) -> Result<(), ServiceError> {
        let result = StaffEntity::delete_by_id(staff_id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("delete_staff", e))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Staff {} not found", staff_id)));
        }
        info!(staff_id, "Staff member deleted");
        Ok(())
    }
}
