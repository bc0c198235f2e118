//! Fulfillment: adding order items against store stock and moving stock
//! between stores. Each operation runs as one database transaction, retried
//! from the start when the database aborts it over lock contention.

use crate::{
    db::DbPool,
    entities::{
        order::Entity as OrderEntity,
        order_item::{self, Entity as OrderItemEntity},
        stock::{self, Entity as StockEntity},
    },
    errors::ServiceError,
    middleware_helpers::retry::{with_retry, LockContentionPolicy, RetryConfig},
    services::{
        stock::{self as ledger, NOT_ENOUGH_PRODUCT},
        validate_discount_fraction, validate_money,
    },
};
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

pub const SENDER_NOT_ENOUGH: &str = "Sender doesn't have enough of this product";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddItemInput {
    #[validate(range(min = 1))]
    pub order_id: i32,
    #[validate(range(min = 1))]
    pub product_id: i32,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i32,
    #[validate(custom = "validate_money")]
    #[schema(value_type = String, example = "379.99")]
    pub list_price: Decimal,
    #[serde(default)]
    #[validate(custom = "validate_discount_fraction")]
    #[schema(value_type = String, example = "0.2")]
    pub discount: Decimal,
}

/// Moves `quantity` units of a product from one store to another.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SendProduct {
    #[validate(range(min = 1))]
    pub sender_id: i32,
    #[validate(range(min = 1))]
    pub receiver_id: i32,
    #[validate(range(min = 1))]
    pub product_id: i32,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i32,
}

#[derive(Clone)]
pub struct FulfillmentService {
    db_pool: Arc<DbPool>,
}

impl FulfillmentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Debits the order's store and appends the item, numbered after the
    /// highest existing `item_id` of the order. Nothing is written unless
    /// every step succeeds.
    #[instrument(skip(self, input), fields(order_id = input.order_id, product_id = input.product_id))]
    pub async fn add_item(&self, input: AddItemInput) -> Result<order_item::Model, ServiceError> {
        input.validate()?;
        let started = Instant::now();
        let (item, store_id) = with_retry(&RetryConfig::lock_contention(), LockContentionPolicy, || {
            self.try_add_item(&input)
        })
        .await?;

        histogram!("bikeshop.fulfillment.add_item_seconds", started.elapsed().as_secs_f64());
        counter!("bikeshop.fulfillment.items_added", 1);
        info!(
            order_id = item.order_id,
            item_id = item.item_id,
            store_id,
            quantity = item.quantity,
            "Order item added"
        );
        Ok(item)
    }

    async fn try_add_item(
        &self,
        input: &AddItemInput,
    ) -> Result<(order_item::Model, i32), ServiceError> {
        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(|e| ServiceError::db("begin_add_item", e))?;

        // Row lock serialises item numbering per order.
        let order = OrderEntity::find_by_id(input.order_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| ServiceError::db("lock_order", e))?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order {} not found", input.order_id))
            })?;

        ledger::debit(
            &txn,
            order.store_id,
            input.product_id,
            input.quantity,
            NOT_ENOUGH_PRODUCT,
        )
        .await?;

        let item_id = next_item_id(&txn, order.order_id).await?;
        let item = order_item::ActiveModel {
            order_id: Set(order.order_id),
            item_id: Set(item_id),
            product_id: Set(input.product_id),
            quantity: Set(input.quantity),
            list_price: Set(input.list_price),
            discount: Set(input.discount),
        }
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::db("insert_order_item", e))?;

        txn.commit()
            .await
            .map_err(|e| ServiceError::db("commit_add_item", e))?;
        Ok((item, order.store_id))
    }

    /// Debits the sender and credits the receiver in one transaction. A
    /// receiver without a stock row for the product aborts the transfer.
    #[instrument(skip(self, request), fields(sender_id = request.sender_id, receiver_id = request.receiver_id, product_id = request.product_id))]
    pub async fn send_product_to_store(&self, request: SendProduct) -> Result<(), ServiceError> {
        request.validate()?;
        if request.sender_id == request.receiver_id {
            return Err(ServiceError::ValidationError(
                "sender_id and receiver_id must differ".to_string(),
            ));
        }

        let started = Instant::now();
        with_retry(&RetryConfig::lock_contention(), LockContentionPolicy, || {
            self.try_send_product(&request)
        })
        .await?;

        histogram!("bikeshop.stock.transfer_seconds", started.elapsed().as_secs_f64());
        counter!("bikeshop.stock.transfers", 1);
        info!(quantity = request.quantity, "Product sent to store");
        Ok(())
    }

    async fn try_send_product(&self, request: &SendProduct) -> Result<(), ServiceError> {
        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(|e| ServiceError::db("begin_transfer", e))?;

        lock_transfer_rows(&txn, request).await?;

        ledger::debit(
            &txn,
            request.sender_id,
            request.product_id,
            request.quantity,
            SENDER_NOT_ENOUGH,
        )
        .await?;

        if let Err(credit_err) =
            ledger::credit(&txn, request.receiver_id, request.product_id, request.quantity).await
        {
            return Err(abort_transfer(txn, request, credit_err).await);
        }

        txn.commit()
            .await
            .map_err(|e| ServiceError::db("commit_transfer", e))
    }
}

/// Locks both stock rows of a transfer in ascending `store_id` order, so two
/// transfers crossing between the same stores wait on each other instead of
/// deadlocking.
async fn lock_transfer_rows(
    txn: &DatabaseTransaction,
    request: &SendProduct,
) -> Result<(), ServiceError> {
    StockEntity::find()
        .filter(stock::Column::ProductId.eq(request.product_id))
        .filter(stock::Column::StoreId.is_in([request.sender_id, request.receiver_id]))
        .order_by_asc(stock::Column::StoreId)
        .lock_exclusive()
        .all(txn)
        .await
        .map_err(|e| ServiceError::db("lock_transfer_rows", e))?;
    Ok(())
}

async fn next_item_id(txn: &DatabaseTransaction, order_id: i32) -> Result<i32, ServiceError> {
    let current: Option<i32> = OrderItemEntity::find()
        .select_only()
        .column_as(order_item::Column::ItemId.max(), "max_item_id")
        .filter(order_item::Column::OrderId.eq(order_id))
        .into_tuple::<Option<i32>>()
        .one(txn)
        .await
        .map_err(|e| ServiceError::db("max_item_id", e))?
        .flatten();
    Ok(current.unwrap_or(0) + 1)
}

/// Rolls back a transfer whose credit failed. The credit error is returned
/// unless the rollback itself fails, in which case the debit may be visible
/// and the ledger needs reconciliation.
async fn abort_transfer(
    txn: DatabaseTransaction,
    request: &SendProduct,
    credit_err: ServiceError,
) -> ServiceError {
    match txn.rollback().await {
        Ok(()) => credit_err,
        Err(rollback_err) => {
            counter!("bikeshop.stock.transfer_inconsistent", 1);
            error!(
                error = %rollback_err,
                credit_error = %credit_err,
                sender_id = request.sender_id,
                receiver_id = request.receiver_id,
                product_id = request.product_id,
                quantity = request.quantity,
                "transfer rollback failed after debit"
            );
            ServiceError::Inconsistent(format!(
                "debited store {} by {} of product {} but could not credit store {}",
                request.sender_id, request.quantity, request.product_id, request.receiver_id
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: i32, discount: Decimal) -> AddItemInput {
        AddItemInput {
            order_id: 1,
            product_id: 1,
            quantity,
            list_price: dec!(100),
            discount,
        }
    }

    #[test]
    fn add_item_requires_positive_quantity() {
        assert!(item(1, dec!(0)).validate().is_ok());
        assert!(item(0, dec!(0)).validate().is_err());
        assert!(item(-3, dec!(0)).validate().is_err());
    }

    #[test]
    fn discount_is_a_fraction_below_one() {
        assert!(item(1, dec!(0.99)).validate().is_ok());
        assert!(item(1, dec!(1)).validate().is_err());
        assert!(item(1, dec!(-0.1)).validate().is_err());
        assert!(item(1, dec!(0.125)).validate().is_err());
    }

    #[test]
    fn list_price_is_bounded_by_its_column() {
        let mut input = item(1, dec!(0));
        input.list_price = dec!(100000000);
        assert!(input.validate().is_err());
        input.list_price = dec!(12.345);
        assert!(input.validate().is_err());
        input.list_price = dec!(99999999.99);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn send_product_rejects_non_positive_quantity() {
        let request = SendProduct {
            sender_id: 1,
            receiver_id: 2,
            product_id: 3,
            quantity: 0,
        };
        assert!(request.validate().is_err());
    }
}
