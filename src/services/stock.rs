//! Stock ledger: per (store, product) on-hand quantity.
//!
//! Debits are a single conditional `UPDATE ... WHERE quantity >= n`, so the
//! availability check and the write happen in one statement and concurrent
//! debits against the same row cannot overdraw it. The ledger functions take
//! any [`ConnectionTrait`] so the fulfillment path can run them inside its own
//! transaction.

use crate::{
    db::DbPool,
    entities::{
        product,
        stock::{self, Entity as StockEntity},
    },
    errors::ServiceError,
    services::{ListRequest, ListResponse},
};
use metrics::counter;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

pub const PRODUCT_NOT_FOUND: &str = "Product is not found";
pub const NOT_ENOUGH_PRODUCT: &str = "There is not enough of this product";

/// Reads the on-hand quantity of a product at a store.
pub async fn get_quantity<C>(conn: &C, store_id: i32, product_id: i32) -> Result<i32, ServiceError>
where
    C: ConnectionTrait,
{
    StockEntity::find_by_id((store_id, product_id))
        .one(conn)
        .await
        .map_err(|e| ServiceError::db("get_stock_quantity", e))?
        .map(|row| row.quantity)
        .ok_or_else(|| ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string()))
}

/// Removes `amount` units. Fails with `NotFound` when the row is missing and
/// with `InsufficientStock(insufficient_message)` when it holds fewer units.
pub async fn debit<C>(
    conn: &C,
    store_id: i32,
    product_id: i32,
    amount: i32,
    insufficient_message: &str,
) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    let result = StockEntity::update_many()
        .col_expr(
            stock::Column::Quantity,
            Expr::col(stock::Column::Quantity).sub(amount),
        )
        .filter(stock::Column::StoreId.eq(store_id))
        .filter(stock::Column::ProductId.eq(product_id))
        .filter(stock::Column::Quantity.gte(amount))
        .exec(conn)
        .await
        .map_err(|e| ServiceError::db("debit_stock", e))?;

    if result.rows_affected == 0 {
        // Either the row is missing or it holds too little.
        let available = get_quantity(conn, store_id, product_id).await?;
        counter!("bikeshop.stock.debit_rejected", 1);
        debug!(store_id, product_id, amount, available, "debit rejected");
        return Err(ServiceError::InsufficientStock(
            insufficient_message.to_string(),
        ));
    }

    counter!("bikeshop.stock.debits", 1);
    Ok(())
}

/// Adds `amount` units to an existing row.
pub async fn credit<C>(conn: &C, store_id: i32, product_id: i32, amount: i32) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    let result = StockEntity::update_many()
        .col_expr(
            stock::Column::Quantity,
            Expr::col(stock::Column::Quantity).add(amount),
        )
        .filter(stock::Column::StoreId.eq(store_id))
        .filter(stock::Column::ProductId.eq(product_id))
        .exec(conn)
        .await
        .map_err(|e| ServiceError::db("credit_stock", e))?;

    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "Store {} has no stock entry for product {}",
            store_id, product_id
        )));
    }

    counter!("bikeshop.stock.credits", 1);
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StockInput {
    #[validate(range(min = 1))]
    pub store_id: i32,
    #[validate(range(min = 1))]
    pub product_id: i32,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
}

/// Stock held by one store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoreStock {
    pub store_id: i32,
    /// Sum of all product quantities at the store.
    pub quantity: i64,
    pub products: Vec<StoreStockLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoreStockLine {
    pub product_id: i32,
    pub product_name: Option<String>,
    pub quantity: i32,
}

/// Administrative access to the ledger.
#[derive(Clone)]
pub struct StockService {
    db_pool: Arc<DbPool>,
}

impl StockService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: StockInput) -> Result<stock::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;
        if StockEntity::find_by_id((input.store_id, input.product_id))
            .one(db)
            .await
            .map_err(|e| ServiceError::db("find_stock", e))?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Store {} already has a stock entry for product {}",
                input.store_id, input.product_id
            )));
        }

        let model = stock::ActiveModel {
            store_id: Set(input.store_id),
            product_id: Set(input.product_id),
            quantity: Set(input.quantity),
        }
        .insert(db)
        .await
        .map_err(|e| ServiceError::db("create_stock", e))?;

        info!(
            store_id = model.store_id,
            product_id = model.product_id,
            quantity = model.quantity,
            "Stock entry created"
        );
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn quantity(&self, store_id: i32, product_id: i32) -> Result<i32, ServiceError> {
        get_quantity(&*self.db_pool, store_id, product_id).await
    }

    /// Everything a store holds, with product names resolved.
    #[instrument(skip(self))]
    pub async fn get_store(&self, store_id: i32) -> Result<StoreStock, ServiceError> {
        let rows = StockEntity::find()
            .filter(stock::Column::StoreId.eq(store_id))
            .order_by_asc(stock::Column::ProductId)
            .find_also_related(product::Entity)
            .all(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("get_store_stock", e))?;

        if rows.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "Store {} has no stock",
                store_id
            )));
        }

        let quantity = rows.iter().map(|(row, _)| i64::from(row.quantity)).sum();
        let products = rows
            .into_iter()
            .map(|(row, product)| StoreStockLine {
                product_id: row.product_id,
                product_name: product.map(|p| p.product_name),
                quantity: row.quantity,
            })
            .collect();

        Ok(StoreStock {
            store_id,
            quantity,
            products,
        })
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        request: &ListRequest,
    ) -> Result<ListResponse<stock::Model>, ServiceError> {
        let db = &*self.db_pool;
        let query = StockEntity::find();
        let total = query
            .clone()
            .count(db)
            .await
            .map_err(|e| ServiceError::db("count_stocks", e))?;
        let items = query
            .order_by_asc(stock::Column::StoreId)
            .order_by_asc(stock::Column::ProductId)
            .offset(request.offset)
            .limit(request.limit)
            .all(db)
            .await
            .map_err(|e| ServiceError::db("list_stocks", e))?;

        Ok(ListResponse::new(items, total, request))
    }

    /// Overwrites the quantity of an existing entry.
    #[instrument(skip(self, input))]
    pub async fn update(&self, input: StockInput) -> Result<stock::Model, ServiceError> {
        input.validate()?;
        let result = StockEntity::update_many()
            .col_expr(stock::Column::Quantity, Expr::value(input.quantity))
            .filter(stock::Column::StoreId.eq(input.store_id))
            .filter(stock::Column::ProductId.eq(input.product_id))
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("update_stock", e))?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string()));
        }

        info!(
            store_id = input.store_id,
            product_id = input.product_id,
            quantity = input.quantity,
            "Stock entry updated"
        );
        Ok(stock::Model {
            store_id: input.store_id,
            product_id: input.product_id,
            quantity: input.quantity,
        })
    }

    /// Deletes all stock of a store, or a single product's entry when
    /// `product_id` is given. Returns the number of rows removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, store_id: i32, product_id: Option<i32>) -> Result<u64, ServiceError> {
        let mut query = StockEntity::delete_many().filter(stock::Column::StoreId.eq(store_id));
        if let Some(product_id) = product_id {
            query = query.filter(stock::Column::ProductId.eq(product_id));
        }

        let result = query
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("delete_stock", e))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "No stock found for store {}",
                store_id
            )));
        }

        info!(store_id, ?product_id, rows = result.rows_affected, "Stock deleted");
        Ok(result.rows_affected)
    }
}
