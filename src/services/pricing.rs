//! Order totals with optional promocode discounts.

use crate::{
    db::DbPool,
    entities::{
        order_item::{self, Entity as OrderItemEntity},
        promocode::{self, DiscountType, Entity as PromocodeEntity},
    },
    errors::ServiceError,
    services::equals_ci,
};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

pub const NO_ORDER: &str = "There is no order with this id";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderTotal {
    pub order_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promocode_name: Option<String>,
    /// Two-decimal string, e.g. `"90.00"`.
    #[schema(example = "90.00")]
    pub total_sum: String,
}

/// Sum of `list_price * quantity` over the items. Item discounts do not
/// participate.
pub fn order_subtotal(items: &[order_item::Model]) -> Decimal {
    items.iter().map(order_item::Model::line_total).sum()
}

/// FLAT codes subtract their amount only when the sum exceeds
/// `order_limit_price`; PERCENT codes always subtract `sum * discount / 100`.
/// The result is not clamped at zero.
pub fn apply_promocode(sum: Decimal, code: &promocode::Model) -> Decimal {
    match code.discount_type {
        DiscountType::Flat if sum > code.order_limit_price => sum - code.discount,
        DiscountType::Flat => sum,
        DiscountType::Percent => sum - sum * code.discount / Decimal::ONE_HUNDRED,
    }
}

pub fn format_total(total: Decimal) -> String {
    format!(
        "{:.2}",
        total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

#[derive(Clone)]
pub struct PricingService {
    db_pool: Arc<DbPool>,
}

impl PricingService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Computes the order total. An order without items is reported as
    /// missing rather than as a zero total.
    #[instrument(skip(self))]
    pub async fn compute_total(
        &self,
        order_id: i32,
        promocode_name: Option<&str>,
    ) -> Result<OrderTotal, ServiceError> {
        let db = &*self.db_pool;
        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(db)
            .await
            .map_err(|e| ServiceError::db("load_order_items", e))?;
        if items.is_empty() {
            return Err(ServiceError::NotFound(NO_ORDER.to_string()));
        }

        let sum = order_subtotal(&items);
        let promocode_name = promocode_name
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let total = match promocode_name {
            None => sum,
            Some(name) => {
                let code = PromocodeEntity::find()
                    .filter(equals_ci(promocode::Column::PromocodeName, name))
                    .one(db)
                    .await
                    .map_err(|e| ServiceError::db("find_promocode", e))?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Promocode {} not found", name))
                    })?;
                let discounted = apply_promocode(sum, &code);
                debug!(%sum, %discounted, promocode = %code.promocode_name, "promocode applied");
                discounted
            }
        };

        Ok(OrderTotal {
            order_id,
            promocode_name: promocode_name.map(str::to_string),
            total_sum: format_total(total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn code(discount_type: DiscountType, discount: Decimal, limit: Decimal) -> promocode::Model {
        promocode::Model {
            promocode_id: 1,
            promocode_name: "SPRING".into(),
            discount,
            discount_type,
            order_limit_price: limit,
        }
    }

    fn line(item_id: i32, price: Decimal, quantity: i32, discount: Decimal) -> order_item::Model {
        order_item::Model {
            order_id: 1,
            item_id,
            product_id: item_id,
            quantity,
            list_price: price,
            discount,
        }
    }

    #[rstest]
    #[case(dec!(100), DiscountType::Flat, dec!(10), dec!(50), "90.00")]
    #[case(dec!(40), DiscountType::Flat, dec!(10), dec!(50), "40.00")]
    #[case(dec!(50), DiscountType::Flat, dec!(10), dec!(50), "50.00")]
    #[case(dec!(100), DiscountType::Percent, dec!(10), dec!(0), "90.00")]
    #[case(dec!(100), DiscountType::Percent, dec!(10), dec!(1000), "90.00")]
    #[case(dec!(5), DiscountType::Flat, dec!(10), dec!(1), "-5.00")]
    fn promocode_rules(
        #[case] sum: Decimal,
        #[case] discount_type: DiscountType,
        #[case] discount: Decimal,
        #[case] limit: Decimal,
        #[case] expected: &str,
    ) {
        let total = apply_promocode(sum, &code(discount_type, discount, limit));
        assert_eq!(format_total(total), expected);
    }

    #[test]
    fn subtotal_ignores_item_discounts() {
        let items = vec![
            line(1, dec!(25), 2, dec!(0.2)),
            line(2, dec!(12.5), 4, dec!(0)),
        ];
        assert_eq!(order_subtotal(&items), dec!(100));
    }

    #[rstest]
    #[case(dec!(90), "90.00")]
    #[case(dec!(10.005), "10.01")]
    #[case(dec!(1.234), "1.23")]
    fn totals_have_two_decimals(#[case] value: Decimal, #[case] expected: &str) {
        assert_eq!(format_total(value), expected);
    }

    proptest! {
        #[test]
        fn percent_discount_never_exceeds_sum(cents in 0i64..10_000_000, pct in 0u32..=100) {
            let sum = Decimal::new(cents, 2);
            let total = apply_promocode(sum, &code(DiscountType::Percent, Decimal::from(pct), dec!(0)));
            prop_assert!(total >= Decimal::ZERO);
            prop_assert!(total <= sum);
        }

        #[test]
        fn flat_code_is_inert_at_or_below_limit(cents in 0i64..100_000, extra in 0i64..100_000) {
            let sum = Decimal::new(cents, 2);
            let limit = sum + Decimal::new(extra, 2);
            let total = apply_promocode(sum, &code(DiscountType::Flat, dec!(15), limit));
            prop_assert_eq!(total, sum);
        }
    }
}
