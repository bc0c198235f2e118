//! Domain services. Each service owns a shared handle to the connection pool
//! and exposes async operations returning `ServiceError` on failure.

use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationError;

pub mod auth;
pub mod brands;
pub mod categories;
pub mod customers;
pub mod fulfillment;
pub mod orders;
pub mod pricing;
pub mod products;
pub mod promocodes;
pub mod reports;
pub mod staffs;
pub mod stock;
pub mod stores;

/// Resolved list parameters: bounds already applied by the HTTP layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub offset: u64,
    pub limit: u64,
    pub search: Option<String>,
}

impl ListRequest {
    pub fn new(offset: u64, limit: u64, search: Option<String>) -> Self {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            offset,
            limit,
            search,
        }
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// A page of results together with the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>, total: u64, request: &ListRequest) -> Self {
        Self {
            items,
            total,
            offset: request.offset,
            limit: request.limit,
        }
    }
}

/// Escape character used by every `LIKE` pattern built from user input.
pub(crate) const LIKE_ESCAPE: char = '\\';

/// Escapes `LIKE` wildcards so the needle matches literally.
pub(crate) fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// `%needle%` pattern for a case-insensitive literal substring search.
pub(crate) fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(&needle.to_lowercase()))
}

/// Case-insensitive substring match that behaves the same on Postgres and SQLite.
pub(crate) fn contains_ci<C>(column: C, needle: &str) -> SimpleExpr
where
    C: IntoColumnRef,
{
    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(contains_pattern(needle)).escape(LIKE_ESCAPE))
}

/// Case-insensitive exact match.
pub(crate) fn equals_ci<C>(column: C, value: &str) -> SimpleExpr
where
    C: IntoColumnRef,
{
    Expr::expr(Func::lower(Expr::col(column))).eq(value.to_lowercase())
}

/// Largest amount a `DECIMAL(10, 2)` money column holds.
fn money_limit() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

fn has_cents_precision(value: &Decimal) -> bool {
    value.normalize().scale() <= 2
}

/// Amounts stored in `DECIMAL(10, 2)`: not negative, at most 99999999.99,
/// no more than two decimal places.
pub(crate) fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    let message = if value.is_sign_negative() && !value.is_zero() {
        "must not be negative"
    } else if *value > money_limit() {
        "must not exceed 99999999.99"
    } else if !has_cents_precision(value) {
        "must have at most two decimal places"
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("money");
    err.message = Some(message.into());
    Err(err)
}

/// Line discounts stored in `DECIMAL(4, 2)`: a fraction in [0, 1) with at
/// most two decimal places.
pub(crate) fn validate_discount_fraction(value: &Decimal) -> Result<(), ValidationError> {
    let message = if (value.is_sign_negative() && !value.is_zero()) || *value >= Decimal::ONE {
        "discount must be a fraction in [0, 1)"
    } else if !has_cents_precision(value) {
        "discount must have at most two decimal places"
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("discount");
    err.message = Some(message.into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("50%", "50\\%")]
    #[case("a_b", "a\\_b")]
    #[case("c:\\tmp", "c:\\\\tmp")]
    #[case("plain", "plain")]
    fn like_wildcards_are_escaped(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_like(input), expected);
    }

    #[test]
    fn contains_pattern_lowercases_and_wraps() {
        assert_eq!(contains_pattern("Trek_"), "%trek\\_%");
    }

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(379.99), true)]
    #[case(dec!(12.50), true)]
    #[case(dec!(99999999.99), true)]
    #[case(dec!(100000000.00), false)]
    #[case(dec!(1000000000000), false)]
    #[case(dec!(-0.01), false)]
    #[case(dec!(10.001), false)]
    fn money_fits_its_column(#[case] value: Decimal, #[case] valid: bool) {
        assert_eq!(validate_money(&value).is_ok(), valid);
    }

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(0.2), true)]
    #[case(dec!(0.99), true)]
    #[case(dec!(0.999), false)]
    #[case(dec!(0.125), false)]
    #[case(dec!(1), false)]
    #[case(dec!(-0.1), false)]
    fn discount_fits_its_column(#[case] value: Decimal, #[case] valid: bool) {
        assert_eq!(validate_discount_fraction(&value).is_ok(), valid);
    }

    #[test]
    fn blank_search_is_dropped() {
        assert_eq!(ListRequest::new(0, 10, Some("   ".into())).search(), None);
        assert_eq!(
            ListRequest::new(0, 10, Some(" trek ".into())).search(),
            Some("trek")
        );
    }
}
