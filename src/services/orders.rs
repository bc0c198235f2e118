use crate::{
    db::DbPool,
    entities::{
        customer,
        order::{self, Entity as OrderEntity, OrderStatus},
        order_item::{self, Entity as OrderItemEntity},
        staff, store,
    },
    errors::ServiceError,
    services::{contains_ci, ListRequest, ListResponse},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

/// Header fields of an order. Used both to create and to update one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderInput {
    #[validate(range(min = 1))]
    pub customer_id: i32,
    #[validate(range(min = 1))]
    pub store_id: i32,
    #[validate(range(min = 1))]
    pub staff_id: i32,
    #[serde(default)]
    pub order_status: OrderStatus,
    pub required_date: NaiveDate,
    pub shipped_date: Option<NaiveDate>,
}

/// An order line with its discounted price.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemView {
    #[serde(flatten)]
    pub item: order_item::Model,
    pub sell_price: Decimal,
}

impl From<order_item::Model> for OrderItemView {
    fn from(item: order_item::Model) -> Self {
        let sell_price = item.sell_price().round_dp(2);
        Self { item, sell_price }
    }
}

/// An order header with its lines, as returned by listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<OrderItemView>,
    pub customer_data: Option<customer::Model>,
    pub store_data: Option<store::Model>,
    pub staff_data: Option<staff::Model>,
}

/// Order header operations. Items are added through the fulfillment
/// service so that stock is debited with them.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates an order with no items, dated today.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: OrderInput) -> Result<order::Model, ServiceError> {
        input.validate()?;
        let model = order::ActiveModel {
            customer_id: Set(input.customer_id),
            order_status: Set(input.order_status),
            order_date: Set(Utc::now().date_naive()),
            required_date: Set(input.required_date),
            shipped_date: Set(input.shipped_date),
            store_id: Set(input.store_id),
            staff_id: Set(input.staff_id),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::db("create_order", e))?;

        info!(
            order_id = model.order_id,
            store_id = model.store_id,
            "Order created"
        );
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, order_id: i32) -> Result<OrderDetails, ServiceError> {
        let db = &*self.db_pool;
        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::db("get_order", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::ItemId)
            .all(db)
            .await
            .map_err(|e| ServiceError::db("get_order_items", e))?
            .into_iter()
            .map(OrderItemView::from)
            .collect();

        let customer_data = customer::Entity::find_by_id(order.customer_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::db("get_order_customer", e))?;
        let store_data = store::Entity::find_by_id(order.store_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::db("get_order_store", e))?;
        let staff_data = staff::Entity::find_by_id(order.staff_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::db("get_order_staff", e))?;

        Ok(OrderDetails {
            order,
            items,
            customer_data,
            store_data,
            staff_data,
        })
    }

    /// Lists order headers; `search` matches the customer's first or last name.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        request: &ListRequest,
    ) -> Result<ListResponse<OrderWithItems>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = OrderEntity::find();
        if let Some(search) = request.search() {
            query = query.inner_join(customer::Entity).filter(
                Condition::any()
                    .add(contains_ci(
                        (customer::Entity, customer::Column::FirstName),
                        search,
                    ))
                    .add(contains_ci(
                        (customer::Entity, customer::Column::LastName),
                        search,
                    )),
            );
        }

        let total = query
            .clone()
            .count(db)
            .await
            .map_err(|e| ServiceError::db("count_orders", e))?;
        let orders = query
            .order_by_asc(order::Column::OrderId)
            .offset(request.offset)
            .limit(request.limit)
            .all(db)
            .await
            .map_err(|e| ServiceError::db("list_orders", e))?;

        let order_ids: Vec<i32> = orders.iter().map(|o| o.order_id).collect();
        let mut lines: HashMap<i32, Vec<OrderItemView>> = HashMap::new();
        if !order_ids.is_empty() {
            let rows = OrderItemEntity::find()
                .filter(order_item::Column::OrderId.is_in(order_ids))
                .order_by_asc(order_item::Column::OrderId)
                .order_by_asc(order_item::Column::ItemId)
                .all(db)
                .await
                .map_err(|e| ServiceError::db("list_order_items", e))?;
            for row in rows {
                lines.entry(row.order_id).or_default().push(row.into());
            }
        }

        let items = orders
            .into_iter()
            .map(|order| {
                let items = lines.remove(&order.order_id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect();

        Ok(ListResponse::new(items, total, request))
    }

    /// Rewrites the header. Returns the number of rows touched; zero means
    /// the order does not exist.
    #[instrument(skip(self, input))]
    pub async fn update_header(&self, order_id: i32, input: OrderInput) -> Result<u64, ServiceError> {
        input.validate()?;
        let result = OrderEntity::update_many()
            .col_expr(order::Column::CustomerId, Expr::value(input.customer_id))
            .col_expr(order::Column::StoreId, Expr::value(input.store_id))
            .col_expr(order::Column::StaffId, Expr::value(input.staff_id))
            .col_expr(order::Column::OrderStatus, Expr::value(input.order_status))
            .col_expr(order::Column::RequiredDate, Expr::value(input.required_date))
            .col_expr(order::Column::ShippedDate, Expr::value(input.shipped_date))
            .filter(order::Column::OrderId.eq(order_id))
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("update_order", e))?;

        info!(order_id, rows = result.rows_affected, "Order header updated");
        Ok(result.rows_affected)
    }

    /// Deletes the order and, by cascade, its items. Stock is not restored.
    #[instrument(skip(self))]
    pub async fn delete(&self, order_id: i32) -> Result<u64, ServiceError> {
        let result = OrderEntity::delete_by_id(order_id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("delete_order", e))?;
        info!(order_id, rows = result.rows_affected, "Order deleted");
        Ok(result.rows_affected)
    }

    /// Deletes one line. Stock is not restored. Returns the number of rows
    /// removed, so a repeated call yields zero.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, order_id: i32, item_id: i32) -> Result<u64, ServiceError> {
        let result = OrderItemEntity::delete_many()
            .filter(order_item::Column::OrderId.eq(order_id))
            .filter(order_item::Column::ItemId.eq(item_id))
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("remove_order_item", e))?;
        info!(order_id, item_id, rows = result.rows_affected, "Order item removed");
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn item_view_rounds_sell_price() {
        let view = OrderItemView::from(order_item::Model {
            order_id: 1,
            item_id: 1,
            product_id: 7,
            quantity: 3,
            list_price: dec!(33.33),
            discount: dec!(0.05),
        });
        assert_eq!(view.sell_price, dec!(94.99));
    }

    #[test]
    fn order_input_rejects_non_positive_ids() {
        let input = OrderInput {
            customer_id: 0,
            store_id: 1,
            staff_id: 1,
            order_status: OrderStatus::Pending,
            required_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            shipped_date: None,
        };
        assert!(input.validate().is_err());
    }
}
