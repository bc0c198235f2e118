mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn health_endpoints_report_up() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");

    let (status, body) = app.call(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"]["status"], "up");
}

#[tokio::test]
async fn brand_crud_round_trip() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(Method::POST, "/api/v1/brand", Some(json!({ "brand_name": "Electra" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["success"].as_bool().unwrap());
    let id = body["data"]["brand_id"].as_i64().unwrap();
    let uri = format!("/api/v1/brand/{}", id);

    let (status, body) = app
        .call(Method::PUT, &uri, Some(json!({ "brand_name": "Electra Bicycle Co" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["brand_name"], "Electra Bicycle Co");

    let (status, _) = app.call(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.call(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");

    let (status, _) = app
        .call(Method::PUT, &uri, Some(json!({ "brand_name": "Haro" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(Method::POST, "/api/v1/brand", Some(json!({ "brand_name": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_listing_sees_new_products_after_caching() {
    let app = TestApp::new().await;
    app.seed_product("Heller Shagamaw Frame - 2016", dec!(1320)).await;

    let (status, body) = app.call(Method::GET, "/api/v1/product", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let first = app.seed_product("Surly Ice Cream Truck Frameset - 2016", dec!(470)).await;
    let (_, body) = app.call(Method::GET, "/api/v1/product", None).await;
    assert_eq!(body["data"]["total"], 2);

    let (status, body) = app
        .call(Method::GET, "/api/v1/product?search=ice%20cream", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["product_id"], first.product_id);

    let (status, body) = app
        .call(Method::GET, &format!("/api/v1/product/{}", first.product_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["brand_data"]["brand_name"],
        "Surly Ice Cream Truck Frameset - 2016 Brand"
    );

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/v1/product/{}", first.product_id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.call(Method::GET, "/api/v1/product", None).await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn list_limit_is_capped() {
    let app = TestApp::new().await;
    for name in ["Trek", "Haro", "Sun Bicycles"] {
        app.call(Method::POST, "/api/v1/brand", Some(json!({ "brand_name": name })))
            .await;
    }

    let (_, body) = app
        .call(Method::GET, "/api/v1/brand?offset=1&limit=1", None)
        .await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["items"][0]["brand_name"], "Haro");

    let (_, body) = app
        .call(Method::GET, "/api/v1/brand?limit=100000", None)
        .await;
    let max = app.state.config.max_list_limit;
    assert!(body["data"]["limit"].as_u64().unwrap() <= max);
}

#[tokio::test]
async fn stock_administration() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 5).await;
    let second = app.seed_product("Electra Townie - 2017", dec!(599)).await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/stock",
            Some(json!({ "store_id": shop.store_id, "product_id": shop.product_id, "quantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/stock",
            Some(json!({ "store_id": shop.store_id, "product_id": second.product_id, "quantity": 7 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/v1/stock/{}", shop.store_id);
    let (status, body) = app.call(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 12);
    assert_eq!(body["data"]["products"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .call(
            Method::PUT,
            "/api/v1/stock",
            Some(json!({ "store_id": shop.store_id, "product_id": second.product_id, "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 2);

    let (status, _) = app
        .call(
            Method::PUT,
            "/api/v1/stock",
            Some(json!({ "store_id": shop.store_id, "product_id": 999, "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .call(
            Method::DELETE,
            &format!("{}?product_id={}", uri, second.product_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], 1);

    let (status, body) = app.call(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], 1);

    let (status, _) = app.call(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn staff_report_lists_sales_by_staff_name() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 5).await;
    let order = app.seed_order(&shop).await;
    app.call(
        Method::POST,
        "/api/v1/order_item",
        Some(json!({
            "order_id": order.order_id,
            "product_id": shop.product_id,
            "quantity": 2,
            "list_price": "100"
        })),
    )
    .await;

    let (status, body) = app
        .call(Method::GET, "/api/v1/report/staff?search=mireya%20cop", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    let row = &body["data"]["staff_report"][0];
    assert_eq!(row["staff_name"], "Mireya Copeland");
    assert_eq!(row["quantity"], 2);
    assert_eq!(row["store_name"], "Santa Cruz Bikes");

    let (_, body) = app
        .call(Method::GET, "/api/v1/report/staff?search=genna", None)
        .await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn order_list_searches_customer_names() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 5).await;
    app.seed_order(&shop).await;

    let (_, body) = app.call(Method::GET, "/api/v1/order?search=burks", None).await;
    assert_eq!(body["data"]["total"], 1);
    let (_, body) = app.call(Method::GET, "/api/v1/order?search=nobody", None).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn search_wildcards_match_literally() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 5).await;
    let order = app.seed_order(&shop).await;
    app.call(
        Method::POST,
        "/api/v1/order_item",
        Some(json!({
            "order_id": order.order_id,
            "product_id": shop.product_id,
            "quantity": 1,
            "list_price": "100"
        })),
    )
    .await;
    app.call(Method::POST, "/api/v1/brand", Some(json!({ "brand_name": "100% Cycles" })))
        .await;

    for search in ["_", "%25", "mir_ya"] {
        let (status, body) = app
            .call(Method::GET, &format!("/api/v1/report/staff?search={}", search), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 0, "report search {:?}", search);

        let (_, body) = app
            .call(Method::GET, &format!("/api/v1/order?search={}", search), None)
            .await;
        assert_eq!(body["data"]["total"], 0, "order search {:?}", search);
    }

    let (_, body) = app.call(Method::GET, "/api/v1/brand?search=%25", None).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["brand_name"], "100% Cycles");
    let (_, body) = app.call(Method::GET, "/api/v1/brand?search=_", None).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn prices_outside_their_column_are_rejected() {
    let app = TestApp::new().await;
    let existing = app.seed_product("Electra Townie Original 7D - 2015", dec!(499.99)).await;
    let body = |price: &str| {
        json!({
            "product_name": "Trek Fuel EX 8 29 - 2016",
            "brand_id": existing.brand_id,
            "category_id": existing.category_id,
            "model_year": 2016,
            "list_price": price
        })
    };

    for price in ["100000000", "1000000000000", "12.345"] {
        let (status, _) = app.call(Method::POST, "/api/v1/product", Some(body(price))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "price {}", price);
    }
    let (status, _) = app
        .call(Method::POST, "/api/v1/product", Some(body("99999999.99")))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/promocode",
            Some(json!({
                "promocode_name": "HUGE",
                "discount": "100000000",
                "discount_type": "FLAT",
                "order_limit_price": "0"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
