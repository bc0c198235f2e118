use crate::{
    db::{placeholder, DbPool},
    errors::ServiceError,
    services::{contains_pattern, ListRequest, LIKE_ESCAPE},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, FromQueryResult, Statement, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

const STAFF_REPORT_SQL: &str = "
    SELECT
        staffs.first_name || ' ' || staffs.last_name AS staff_name,
        categories.category_name AS category_name,
        products.product_name AS product_name,
        order_items.quantity AS quantity,
        products.list_price AS list_price,
        stores.store_name AS store_name,
        orders.order_date AS order_date
    FROM staffs
    JOIN orders ON orders.staff_id = staffs.staff_id
    JOIN order_items ON order_items.order_id = orders.order_id
    JOIN stores ON stores.store_id = orders.store_id
    JOIN products ON products.product_id = order_items.product_id
    JOIN categories ON categories.category_id = products.category_id";

#[derive(Debug, FromQueryResult)]
struct StaffReportRow {
    staff_name: String,
    category_name: String,
    product_name: String,
    quantity: i32,
    list_price: Decimal,
    store_name: String,
    order_date: NaiveDate,
}

/// One sold line attributed to the staff member who took the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StaffReport {
    pub staff_name: String,
    pub category_name: String,
    pub product_name: String,
    pub quantity: i32,
    /// Current catalog price times quantity.
    pub total_sum: Decimal,
    pub store_name: String,
    #[schema(example = "2024-03-01")]
    pub order_date: String,
}

impl From<StaffReportRow> for StaffReport {
    fn from(row: StaffReportRow) -> Self {
        Self {
            total_sum: row.list_price * Decimal::from(row.quantity),
            staff_name: row.staff_name,
            category_name: row.category_name,
            product_name: row.product_name,
            quantity: row.quantity,
            store_name: row.store_name,
            order_date: row.order_date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffReportResponse {
    pub count: usize,
    pub staff_report: Vec<StaffReport>,
}

#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Sales per staff member. `search` matches the full name.
    #[instrument(skip(self))]
    pub async fn staff_report(
        &self,
        request: &ListRequest,
    ) -> Result<StaffReportResponse, ServiceError> {
        let db = &*self.db_pool;
        let backend = db.get_database_backend();

        let mut sql = String::from(STAFF_REPORT_SQL);
        let mut values: Vec<Value> = Vec::new();
        if let Some(search) = request.search() {
            values.push(contains_pattern(search).into());
            sql.push_str(&format!(
                " WHERE LOWER(staffs.first_name || ' ' || staffs.last_name) LIKE {} ESCAPE '{}'",
                placeholder(backend, values.len()),
                LIKE_ESCAPE
            ));
        }
        values.push((request.limit as i64).into());
        let limit = placeholder(backend, values.len());
        values.push((request.offset as i64).into());
        let offset = placeholder(backend, values.len());
        sql.push_str(&format!(
            " ORDER BY orders.order_id, order_items.item_id LIMIT {} OFFSET {}",
            limit, offset
        ));

        let rows = StaffReportRow::find_by_statement(Statement::from_sql_and_values(
            backend, sql, values,
        ))
        .all(db)
        .await
        .map_err(|e| ServiceError::db("staff_report", e))?;

        let staff_report: Vec<StaffReport> = rows.into_iter().map(StaffReport::from).collect();
        Ok(StaffReportResponse {
            count: staff_report.len(),
            staff_report,
        })
    }
}
