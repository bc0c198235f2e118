#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use bikeshop_api::{
    cache::InMemoryCache,
    config::AppConfig,
    db,
    entities::{order, product, stock},
    services::{
        brands::BrandInput, categories::CategoryInput, customers::CustomerInput,
        orders::OrderInput, products::ProductInput, staffs::StaffInput, stock::StockInput,
        stores::StoreInput,
    },
    AppState,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Full application over a throwaway SQLite file and an in-memory cache.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _dir: TempDir,
}

/// Ids of a store that has a customer, a staff member and one stocked product.
pub struct Shop {
    pub store_id: i32,
    pub customer_id: i32,
    pub staff_id: i32,
    pub product_id: i32,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let db_path = dir.path().join("bikeshop_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "redis://127.0.0.1:6379".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 8;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg, Arc::new(InMemoryCache::new()));
        let router = bikeshop_api::build_router(state.clone());

        Self {
            router,
            state,
            _dir: dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` for empty bodies).
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is json")
        };
        (status, json)
    }

    pub async fn seed_product(&self, name: &str, price: Decimal) -> product::Model {
        let services = &self.state.services;
        let brand = services
            .brands
            .create(BrandInput {
                brand_name: format!("{} Brand", name),
            })
            .await
            .expect("seed brand");
        let category = services
            .categories
            .create(CategoryInput {
                category_name: format!("{} Category", name),
            })
            .await
            .expect("seed category");
        services
            .products
            .create(ProductInput {
                product_name: name.to_string(),
                brand_id: brand.brand_id,
                category_id: category.category_id,
                model_year: 2018,
                list_price: price,
            })
            .await
            .expect("seed product")
    }

    pub async fn seed_store(&self, name: &str) -> i32 {
        self.state
            .services
            .stores
            .create(StoreInput {
                store_name: name.to_string(),
                phone: None,
                email: None,
                street: None,
                city: Some("Santa Cruz".to_string()),
                state: Some("CA".to_string()),
                zip_code: None,
            })
            .await
            .expect("seed store")
            .store_id
    }

    pub async fn seed_stock(&self, store_id: i32, product_id: i32, quantity: i32) -> stock::Model {
        self.state
            .services
            .stock
            .create(StockInput {
                store_id,
                product_id,
                quantity,
            })
            .await
            .expect("seed stock")
    }

    pub async fn quantity(&self, store_id: i32, product_id: i32) -> i32 {
        self.state
            .services
            .stock
            .quantity(store_id, product_id)
            .await
            .expect("stock row")
    }

    /// A store holding `quantity` units of a product priced `price`.
    pub async fn seed_shop(&self, price: Decimal, quantity: i32) -> Shop {
        let services = &self.state.services;
        let store_id = self.seed_store("Santa Cruz Bikes").await;
        let customer_id = services
            .customers
            .create(CustomerInput {
                first_name: "Debra".to_string(),
                last_name: "Burks".to_string(),
                phone: None,
                email: "debra.burks@example.com".to_string(),
                street: None,
                city: None,
                state: None,
                zip_code: None,
            })
            .await
            .expect("seed customer")
            .customer_id;
        let staff_id = services
            .staffs
            .create(StaffInput {
                first_name: "Mireya".to_string(),
                last_name: "Copeland".to_string(),
                email: "mireya.copeland@example.com".to_string(),
                phone: None,
                active: true,
                store_id,
                manager_id: None,
            })
            .await
            .expect("seed staff")
            .staff_id;
        let product_id = self.seed_product("Trek 820 - 2016", price).await.product_id;
        self.seed_stock(store_id, product_id, quantity).await;

        Shop {
            store_id,
            customer_id,
            staff_id,
            product_id,
        }
    }

    pub async fn seed_order(&self, shop: &Shop) -> order::Model {
        self.state
            .services
            .orders
            .create(OrderInput {
                customer_id: shop.customer_id,
                store_id: shop.store_id,
                staff_id: shop.staff_id,
                order_status: Default::default(),
                required_date: NaiveDate::from_ymd_opt(2030, 1, 15).expect("date"),
                shipped_date: None,
            })
            .await
            .expect("seed order")
    }
}
