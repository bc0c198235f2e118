use crate::{
    cache::ProductListCache,
    db::DbPool,
    entities::{
        brand,
        category,
        product::{self, Entity as ProductEntity},
    },
    errors::ServiceError,
    services::{contains_ci, validate_money, ListRequest, ListResponse},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255, message = "product_name is required"))]
    pub product_name: String,
    #[validate(range(min = 1))]
    pub brand_id: i32,
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[validate(range(min = 1900, max = 2100))]
    pub model_year: i16,
    #[validate(custom = "validate_money")]
    #[schema(value_type = String, example = "379.99")]
    pub list_price: Decimal,
}

/// A product with its brand and category resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: product::Model,
    pub brand_data: Option<brand::Model>,
    pub category_data: Option<category::Model>,
}

/// Catalog operations on products. Listing goes through the product list
/// cache; every write invalidates it.
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
    cache: ProductListCache,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>, cache: ProductListCache) -> Self {
        Self { db_pool, cache }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: ProductInput) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let model = product::ActiveModel {
            product_name: Set(input.product_name),
            brand_id: Set(input.brand_id),
            category_id: Set(input.category_id),
            model_year: Set(input.model_year),
            list_price: Set(input.list_price),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| ServiceError::db("create_product", e))?;

        self.cache.invalidate().await;
        info!(product_id = model.product_id, "Product created");
        Ok(model)
    }

    async fn find(&self, product_id: i32) -> Result<product::Model, ServiceError> {
        ProductEntity::find_by_id(product_id)
            .one(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("get_product", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, product_id: i32) -> Result<ProductDetails, ServiceError> {
        let db = &*self.db_pool;
        let product = self.find(product_id).await?;

        let brand_data = brand::Entity::find_by_id(product.brand_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::db("get_product_brand", e))?;
        let category_data = category::Entity::find_by_id(product.category_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::db("get_product_category", e))?;

        Ok(ProductDetails {
            product,
            brand_data,
            category_data,
        })
    }

    /// Cache-aside listing. A cache failure degrades to a database read.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        request: &ListRequest,
    ) -> Result<ListResponse<product::Model>, ServiceError> {
        let key = ProductListCache::key(request.offset, request.limit, request.search());
        match self.cache.fetch::<ListResponse<product::Model>>(&key).await {
            Ok(Some(page)) => return Ok(page),
            Ok(None) => {}
            Err(e) => warn!(error = %e, key, "product list cache read failed"),
        }

        let page = self.list_from_db(request).await?;
        if let Err(e) = self.cache.store(&key, &page).await {
            warn!(error = %e, key, "product list cache write failed");
        }
        Ok(page)
    }

    async fn list_from_db(
        &self,
        request: &ListRequest,
    ) -> Result<ListResponse<product::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = ProductEntity::find();
        if let Some(search) = request.search() {
            query = query.filter(contains_ci(product::Column::ProductName, search));
        }

        let total = query
            .clone()
            .count(db)
            .await
            .map_err(|e| ServiceError::db("count_products", e))?;
        let items = query
            .order_by_asc(product::Column::ProductId)
            .offset(request.offset)
            .limit(request.limit)
            .all(db)
            .await
            .map_err(|e| ServiceError::db("list_products", e))?;

        Ok(ListResponse::new(items, total, request))
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        product_id: i32,
        input: ProductInput,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let mut active: product::ActiveModel = self.find(product_id).await?.into();
        active.product_name = Set(input.product_name);
        active.brand_id = Set(input.brand_id);
        active.category_id = Set(input.category_id);
        active.model_year = Set(input.model_year);
        active.list_price = Set(input.list_price);

        let model = active
            .update(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("update_product", e))?;
        self.cache.invalidate().await;
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, product_id: i32) -> Result<(), ServiceError> {
        let result = ProductEntity::delete_by_id(product_id)
            .exec(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("delete_product", e))?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Product {} not found",
                product_id
            )));
        }
        self.cache.invalidate().await;
        info!(product_id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(price: Decimal, year: i16) -> ProductInput {
        ProductInput {
            product_name: "Trek 820 - 2016".into(),
            brand_id: 1,
            category_id: 1,
            model_year: year,
            list_price: price,
        }
    }

    #[test]
    fn product_input_rejects_negative_price_and_bad_year() {
        assert!(input(dec!(379.99), 2016).validate().is_ok());
        assert!(input(dec!(-1), 2016).validate().is_err());
        assert!(input(dec!(10), 1850).validate().is_err());
    }

    #[test]
    fn product_price_must_fit_two_decimal_places_and_ten_digits() {
        assert!(input(dec!(99999999.99), 2016).validate().is_ok());
        assert!(input(dec!(100000000), 2016).validate().is_err());
        assert!(input(dec!(19.999), 2016).validate().is_err());
    }
}
