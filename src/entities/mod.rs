//! SeaORM entities for the bike shop schema.

pub mod brand;
pub mod category;
pub mod customer;
pub mod order;
pub mod order_item;
pub mod product;
pub mod promocode;
pub mod staff;
pub mod stock;
pub mod store;
pub mod user;
