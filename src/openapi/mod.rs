use crate::handlers;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bike Shop API",
        version = "1.0.0",
        description = r#"
# Bike Shop API

Catalog, stock and order management for a chain of bicycle stores.

## Fulfillment

Adding an item to an order debits the stock of the order's store in the same
transaction that records the item. Transfers between stores move stock
atomically. Removing an item does not restock.

## Pagination

List endpoints accept `offset` (default 0), `limit` (default 10, max 100) and
`search`, a case-insensitive substring filter.

## Errors

Failures return `{error, message, request_id, timestamp}` with 400 for invalid
input, 401 for rejected credentials, 404 for missing records, 409 for conflicts
and 422 for insufficient stock.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Users", description = "Registration and login"),
        (name = "Brands", description = "Bicycle brands"),
        (name = "Categories", description = "Product categories"),
        (name = "Products", description = "Catalog products; listing is cached"),
        (name = "Customers", description = "Customers"),
        (name = "Stores", description = "Stores"),
        (name = "Staff", description = "Store staff"),
        (name = "Stock", description = "Per-store stock ledger"),
        (name = "Orders", description = "Orders and order items"),
        (name = "Promocodes", description = "Discount codes"),
        (name = "Reports", description = "Sales report, transfers and order totals"),
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::brands::create_brand,
        handlers::brands::get_brand,
        handlers::brands::list_brands,
        handlers::brands::update_brand,
        handlers::brands::delete_brand,
        handlers::categories::create_category,
        handlers::categories::get_category,
        handlers::categories::list_categories,
        handlers::categories::update_category,
        handlers::categories::delete_category,
        handlers::products::create_product,
        handlers::products::get_product,
        handlers::products::list_products,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::customers::create_customer,
        handlers::customers::get_customer,
        handlers::customers::list_customers,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,
        handlers::stores::create_store,
        handlers::stores::get_store,
        handlers::stores::list_stores,
        handlers::stores::update_store,
        handlers::stores::delete_store,
        handlers::staffs::create_staff,
        handlers::staffs::get_staff,
        handlers::staffs::list_staff,
        handlers::staffs::update_staff,
        handlers::staffs::delete_staff,
        handlers::stock::create_stock,
        handlers::stock::get_store_stock,
        handlers::stock::list_stock,
        handlers::stock::update_stock,
        handlers::stock::delete_stock,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::list_orders,
        handlers::orders::update_order,
        handlers::orders::delete_order,
        handlers::orders::add_order_item,
        handlers::orders::remove_order_item,
        handlers::promocodes::create_promocode,
        handlers::promocodes::get_promocode,
        handlers::promocodes::list_promocodes,
        handlers::promocodes::delete_promocode,
        handlers::reports::staff_report,
        handlers::reports::send_product,
        handlers::reports::total_sum,
    ),
    components(schemas(crate::errors::ErrorResponse))
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_fulfillment_routes() {
        let json = serde_json::to_string_pretty(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("Bike Shop API"));
        assert!(json.contains("/api/v1/order_item"));
        assert!(json.contains("/api/v1/report/total_sum"));
        assert!(json.contains("/api/v1/report/send_product"));
        assert!(json.contains("/api/v1/login"));
    }
}
