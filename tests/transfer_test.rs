mod common;

use axum::http::{Method, StatusCode};
use bikeshop_api::services::fulfillment::SendProduct;
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;

const SEND: &str = "/api/v1/report/send_product";

fn transfer(sender_id: i32, receiver_id: i32, product_id: i32, quantity: i32) -> serde_json::Value {
    json!({
        "sender_id": sender_id,
        "receiver_id": receiver_id,
        "product_id": product_id,
        "quantity": quantity
    })
}

#[tokio::test]
async fn transfer_moves_stock_between_stores() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(500), 8).await;
    let receiver = app.seed_store("Baldwin Bikes").await;
    app.seed_stock(receiver, shop.product_id, 1).await;

    let (status, body) = app
        .call(
            Method::PUT,
            SEND,
            Some(transfer(shop.store_id, receiver, shop.product_id, 5)),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 5);
    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 3);
    assert_eq!(app.quantity(receiver, shop.product_id).await, 6);
}

#[tokio::test]
async fn sender_without_enough_stock_is_rejected() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(500), 3).await;
    let receiver = app.seed_store("Rowlett Bikes").await;
    app.seed_stock(receiver, shop.product_id, 2).await;

    let (status, body) = app
        .call(
            Method::PUT,
            SEND,
            Some(transfer(shop.store_id, receiver, shop.product_id, 5)),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["message"],
        "Insufficient stock: Sender doesn't have enough of this product"
    );
    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 3);
    assert_eq!(app.quantity(receiver, shop.product_id).await, 2);
}

#[tokio::test]
async fn missing_receiver_row_rolls_back_the_debit() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(500), 8).await;
    let receiver = app.seed_store("Baldwin Bikes").await;

    let (status, _) = app
        .call(
            Method::PUT,
            SEND,
            Some(transfer(shop.store_id, receiver, shop.product_id, 5)),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 8);

    let missing = app
        .state
        .services
        .stock
        .quantity(receiver, shop.product_id)
        .await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn transfer_requires_distinct_stores_and_positive_quantity() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(500), 8).await;
    let receiver = app.seed_store("Baldwin Bikes").await;
    app.seed_stock(receiver, shop.product_id, 0).await;

    let (status, _) = app
        .call(
            Method::PUT,
            SEND,
            Some(transfer(shop.store_id, shop.store_id, shop.product_id, 1)),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            Method::PUT,
            SEND,
            Some(transfer(shop.store_id, receiver, shop.product_id, 0)),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 8);
    assert_eq!(app.quantity(receiver, shop.product_id).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn crossing_transfers_all_complete_and_conserve_stock() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(500), 50).await;
    let other = app.seed_store("Baldwin Bikes").await;
    app.seed_stock(other, shop.product_id, 50).await;

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20 {
        let fulfillment = app.state.services.fulfillment.clone();
        let (sender_id, receiver_id) = if i % 2 == 0 {
            (shop.store_id, other)
        } else {
            (other, shop.store_id)
        };
        let request = SendProduct {
            sender_id,
            receiver_id,
            product_id: shop.product_id,
            quantity: 1,
        };
        tasks.spawn(async move { fulfillment.send_product_to_store(request).await });
    }

    while let Some(joined) = tasks.join_next().await {
        joined.expect("task panicked").expect("transfer failed");
    }

    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 50);
    assert_eq!(app.quantity(other, shop.product_id).await, 50);
}
