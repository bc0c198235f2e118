mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use bikeshop_api::{
    errors::ServiceError,
    services::fulfillment::{AddItemInput, SendProduct},
};
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;

fn add_item_body(order_id: i32, product_id: i32, quantity: i32) -> serde_json::Value {
    json!({
        "order_id": order_id,
        "product_id": product_id,
        "quantity": quantity,
        "list_price": "100",
        "discount": "0"
    })
}

#[tokio::test]
async fn adding_items_debits_the_order_store() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 10).await;
    let order = app.seed_order(&shop).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/order_item",
            Some(add_item_body(order.order_id, shop.product_id, 4)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["item_id"], 1);
    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 6);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/order_item",
            Some(add_item_body(order.order_id, shop.product_id, 2)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["item_id"], 2);
    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 4);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/order_item",
            Some(add_item_body(order.order_id, shop.product_id, 100)),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["message"],
        "Insufficient stock: There is not enough of this product"
    );
    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 4);

    let (status, body) = app
        .call(Method::GET, &format!("/api/v1/order/{}", order.order_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(body["data"]["customer_data"]["first_name"], "Debra");
    assert_eq!(body["data"]["order_status"], "pending");
}

#[tokio::test]
async fn product_without_stock_row_is_not_found() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 10).await;
    let order = app.seed_order(&shop).await;
    let other = app.seed_product("Surly Straggler", dec!(1500)).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/order_item",
            Some(add_item_body(order.order_id, other.product_id, 1)),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found: Product is not found");
}

#[tokio::test]
async fn adding_to_a_missing_order_changes_nothing() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 10).await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/order_item",
            Some(add_item_body(999, shop.product_id, 1)),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 10);
}

#[tokio::test]
async fn non_positive_quantity_is_rejected() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 10).await;
    let order = app.seed_order(&shop).await;

    for quantity in [0, -2] {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/v1/order_item",
                Some(add_item_body(order.order_id, shop.product_id, quantity)),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 10);
}

#[tokio::test]
async fn removing_an_item_twice_does_not_restock() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 10).await;
    let order = app.seed_order(&shop).await;
    app.call(
        Method::POST,
        "/api/v1/order_item",
        Some(add_item_body(order.order_id, shop.product_id, 3)),
    )
    .await;
    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 7);

    let uri = format!("/api/v1/order_item/{}?item_id=1", order.order_id);
    let (status, _) = app.call(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 7);

    let (status, _) = app.call(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 7);

    let removed = app
        .state
        .services
        .orders
        .remove_item(order.order_id, 1)
        .await
        .unwrap();
    assert_eq!(removed, 0);
}

#[tokio::test]
async fn item_ids_continue_after_the_highest_existing_one() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 10).await;
    let order = app.seed_order(&shop).await;
    let fulfillment = app.state.services.fulfillment.clone();

    let input = |quantity| AddItemInput {
        order_id: order.order_id,
        product_id: shop.product_id,
        quantity,
        list_price: dec!(100),
        discount: dec!(0),
    };
    fulfillment.add_item(input(1)).await.unwrap();
    fulfillment.add_item(input(1)).await.unwrap();
    app.state
        .services
        .orders
        .remove_item(order.order_id, 1)
        .await
        .unwrap();

    let item = fulfillment.add_item(input(1)).await.unwrap();
    assert_eq!(item.item_id, 3);
}

#[tokio::test]
async fn concurrent_debits_never_overdraw() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 10).await;
    let order = app.seed_order(&shop).await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..20 {
        let fulfillment = app.state.services.fulfillment.clone();
        let input = AddItemInput {
            order_id: order.order_id,
            product_id: shop.product_id,
            quantity: 1,
            list_price: dec!(100),
            discount: dec!(0),
        };
        tasks.spawn(async move { fulfillment.add_item(input).await });
    }

    let mut added = 0;
    let mut rejected = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.expect("task panicked") {
            Ok(_) => added += 1,
            Err(e) => {
                assert_matches!(e, ServiceError::InsufficientStock(_));
                rejected += 1;
            }
        }
    }

    assert_eq!(added, 10);
    assert_eq!(rejected, 10);
    assert_eq!(app.quantity(shop.store_id, shop.product_id).await, 0);

    let details = app.state.services.orders.get(order.order_id).await.unwrap();
    let mut ids: Vec<i32> = details.items.iter().map(|i| i.item.item_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
}

enum Outcome {
    Added,
    SentToOther,
    ReceivedFromOther,
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_and_transfers_keep_stock_balanced() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 10).await;
    let order = app.seed_order(&shop).await;
    let other = app.seed_store("Baldwin Bikes").await;
    app.seed_stock(other, shop.product_id, 10).await;

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..24 {
        let fulfillment = app.state.services.fulfillment.clone();
        match i % 3 {
            0 => {
                let input = AddItemInput {
                    order_id: order.order_id,
                    product_id: shop.product_id,
                    quantity: 1,
                    list_price: dec!(100),
                    discount: dec!(0),
                };
                tasks.spawn(async move { fulfillment.add_item(input).await.map(|_| Outcome::Added) });
            }
            1 => {
                let request = SendProduct {
                    sender_id: shop.store_id,
                    receiver_id: other,
                    product_id: shop.product_id,
                    quantity: 2,
                };
                tasks.spawn(async move {
                    fulfillment
                        .send_product_to_store(request)
                        .await
                        .map(|_| Outcome::SentToOther)
                });
            }
            _ => {
                let request = SendProduct {
                    sender_id: other,
                    receiver_id: shop.store_id,
                    product_id: shop.product_id,
                    quantity: 1,
                };
                tasks.spawn(async move {
                    fulfillment
                        .send_product_to_store(request)
                        .await
                        .map(|_| Outcome::ReceivedFromOther)
                });
            }
        }
    }

    let (mut added, mut sent, mut received) = (0, 0, 0);
    while let Some(joined) = tasks.join_next().await {
        match joined.expect("task panicked") {
            Ok(Outcome::Added) => added += 1,
            Ok(Outcome::SentToOther) => sent += 1,
            Ok(Outcome::ReceivedFromOther) => received += 1,
            Err(e) => assert_matches!(e, ServiceError::InsufficientStock(_)),
        }
    }

    let home = app.quantity(shop.store_id, shop.product_id).await;
    let away = app.quantity(other, shop.product_id).await;
    assert_eq!(home, 10 - added - 2 * sent + received);
    assert_eq!(away, 10 - received + 2 * sent);
    assert!(home >= 0 && away >= 0);
    assert_eq!(home + away + added, 20);

    let details = app.state.services.orders.get(order.order_id).await.unwrap();
    assert_eq!(details.items.len() as i32, added);
}

#[tokio::test]
async fn order_header_update_and_delete_report_missing_orders() {
    let app = TestApp::new().await;
    let shop = app.seed_shop(dec!(100), 10).await;
    let order = app.seed_order(&shop).await;

    let header = json!({
        "customer_id": shop.customer_id,
        "store_id": shop.store_id,
        "staff_id": shop.staff_id,
        "order_status": "completed",
        "required_date": "2030-02-01",
        "shipped_date": "2030-01-20"
    });

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/v1/order/{}", order.order_id),
            Some(header.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order_status"], "completed");
    assert_eq!(body["data"]["shipped_date"], "2030-01-20");

    let (status, _) = app
        .call(Method::PUT, "/api/v1/order/4242", Some(header))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/order/{}", order.order_id);
    let (status, _) = app.call(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
