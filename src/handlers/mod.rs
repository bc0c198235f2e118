//! HTTP handlers, one module per resource. Each module exposes a router
//! that `api_v1_routes` nests under the resource's path.

pub mod auth;
pub mod brands;
pub mod categories;
pub mod common;
pub mod customers;
pub mod health;
pub mod orders;
pub mod products;
pub mod promocodes;
pub mod reports;
pub mod staffs;
pub mod stock;
pub mod stores;

use crate::{
    cache::ProductListCache,
    db::DbPool,
    services::{
        auth::{AuthService, TokenIssuer},
        brands::BrandService, categories::CategoryService, customers::CustomerService,
        fulfillment::FulfillmentService, orders::OrderService, pricing::PricingService,
        products::ProductService, promocodes::PromocodeService, reports::ReportService,
        staffs::StaffService, stock::StockService, stores::StoreService,
    },
};
use std::sync::Arc;

pub use crate::AppState;

/// Services layer used by the HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub brands: BrandService,
    pub categories: CategoryService,
    pub products: ProductService,
    pub customers: CustomerService,
    pub stores: StoreService,
    pub staffs: StaffService,
    pub stock: StockService,
    pub orders: OrderService,
    pub fulfillment: FulfillmentService,
    pub pricing: PricingService,
    pub promocodes: PromocodeService,
    pub reports: ReportService,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, product_cache: ProductListCache, tokens: TokenIssuer) -> Self {
        Self {
            auth: AuthService::new(db_pool.clone(), tokens),
            brands: BrandService::new(db_pool.clone()),
            categories: CategoryService::new(db_pool.clone()),
            products: ProductService::new(db_pool.clone(), product_cache),
            customers: CustomerService::new(db_pool.clone()),
            stores: StoreService::new(db_pool.clone()),
            staffs: StaffService::new(db_pool.clone()),
            stock: StockService::new(db_pool.clone()),
            orders: OrderService::new(db_pool.clone()),
            fulfillment: FulfillmentService::new(db_pool.clone()),
            pricing: PricingService::new(db_pool.clone()),
            promocodes: PromocodeService::new(db_pool.clone()),
            reports: ReportService::new(db_pool),
        }
    }
}
