use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_catalog_tables::Migration),
            Box::new(m20240101_000002_create_store_tables::Migration),
            Box::new(m20240101_000003_create_stocks_table::Migration),
            Box::new(m20240101_000004_create_order_tables::Migration),
            Box::new(m20240101_000005_create_promocodes_table::Migration),
            Box::new(m20240101_000006_create_users_table::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
    Username,
    PasswordHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Brands {
    Table,
    BrandId,
    BrandName,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    CategoryId,
    CategoryName,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    ProductId,
    ProductName,
    BrandId,
    CategoryId,
    ModelYear,
    ListPrice,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    CustomerId,
    FirstName,
    LastName,
    Phone,
    Email,
    Street,
    City,
    State,
    ZipCode,
}

#[derive(DeriveIden)]
enum Stores {
    Table,
    StoreId,
    StoreName,
    Phone,
    Email,
    Street,
    City,
    State,
    ZipCode,
}

#[derive(DeriveIden)]
enum Staffs {
    Table,
    StaffId,
    FirstName,
    LastName,
    Email,
    Phone,
    Active,
    StoreId,
    ManagerId,
}

#[derive(DeriveIden)]
enum Stocks {
    Table,
    StoreId,
    ProductId,
    Quantity,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    OrderId,
    CustomerId,
    OrderStatus,
    OrderDate,
    RequiredDate,
    ShippedDate,
    StoreId,
    StaffId,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    OrderId,
    ItemId,
    ProductId,
    Quantity,
    ListPrice,
    Discount,
}

#[derive(DeriveIden)]
enum Promocodes {
    Table,
    PromocodeId,
    PromocodeName,
    Discount,
    DiscountType,
    OrderLimitPrice,
}

mod m20240101_000001_create_catalog_tables {
    use super::{Brands, Categories, Products};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Brands::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Brands::BrandId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Brands::BrandName).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::CategoryId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Categories::CategoryName).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::ProductId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::ProductName).string().not_null())
                        .col(ColumnDef::new(Products::BrandId).integer().not_null())
                        .col(ColumnDef::new(Products::CategoryId).integer().not_null())
                        .col(ColumnDef::new(Products::ModelYear).small_integer().not_null())
                        .col(
                            ColumnDef::new(Products::ListPrice)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_brand_id")
                                .from(Products::Table, Products::BrandId)
                                .to(Brands::Table, Brands::BrandId)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_category_id")
                                .from(Products::Table, Products::CategoryId)
                                .to(Categories::Table, Categories::CategoryId)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Brands::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000002_create_store_tables {
    use super::{Customers, Staffs, Stores};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_store_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::CustomerId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customers::FirstName).string().not_null())
                        .col(ColumnDef::new(Customers::LastName).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Email).string().not_null())
                        .col(ColumnDef::new(Customers::Street).string().null())
                        .col(ColumnDef::new(Customers::City).string().null())
                        .col(ColumnDef::new(Customers::State).string().null())
                        .col(ColumnDef::new(Customers::ZipCode).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Stores::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Stores::StoreId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Stores::StoreName).string().not_null())
                        .col(ColumnDef::new(Stores::Phone).string().null())
                        .col(ColumnDef::new(Stores::Email).string().null())
                        .col(ColumnDef::new(Stores::Street).string().null())
                        .col(ColumnDef::new(Stores::City).string().null())
                        .col(ColumnDef::new(Stores::State).string().null())
                        .col(ColumnDef::new(Stores::ZipCode).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Staffs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Staffs::StaffId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Staffs::FirstName).string().not_null())
                        .col(ColumnDef::new(Staffs::LastName).string().not_null())
                        .col(ColumnDef::new(Staffs::Email).string().not_null())
                        .col(ColumnDef::new(Staffs::Phone).string().null())
                        .col(
                            ColumnDef::new(Staffs::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Staffs::StoreId).integer().not_null())
                        .col(ColumnDef::new(Staffs::ManagerId).integer().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_staffs_store_id")
                                .from(Staffs::Table, Staffs::StoreId)
                                .to(Stores::Table, Stores::StoreId)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Staffs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Stores::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000003_create_stocks_table {
    use super::{Products, Stocks, Stores};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_stocks_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Stocks::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Stocks::StoreId).integer().not_null())
                        .col(ColumnDef::new(Stocks::ProductId).integer().not_null())
                        .col(
                            ColumnDef::new(Stocks::Quantity)
                                .integer()
                                .not_null()
                                .default(0)
                                .check(Expr::col(Stocks::Quantity).gte(0)),
                        )
                        .primary_key(
                            Index::create()
                                .name("pk_stocks")
                                .col(Stocks::StoreId)
                                .col(Stocks::ProductId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stocks_store_id")
                                .from(Stocks::Table, Stocks::StoreId)
                                .to(Stores::Table, Stores::StoreId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stocks_product_id")
                                .from(Stocks::Table, Stocks::ProductId)
                                .to(Products::Table, Products::ProductId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Stocks::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000004_create_order_tables {
    use super::{Customers, OrderItems, Orders, Products, Staffs, Stores};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::OrderId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::CustomerId).integer().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderStatus)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(Orders::OrderDate).date().not_null())
                        .col(ColumnDef::new(Orders::RequiredDate).date().not_null())
                        .col(ColumnDef::new(Orders::ShippedDate).date().null())
                        .col(ColumnDef::new(Orders::StoreId).integer().not_null())
                        .col(ColumnDef::new(Orders::StaffId).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer_id")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Customers::Table, Customers::CustomerId)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_store_id")
                                .from(Orders::Table, Orders::StoreId)
                                .to(Stores::Table, Stores::StoreId)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_staff_id")
                                .from(Orders::Table, Orders::StaffId)
                                .to(Staffs::Table, Staffs::StaffId)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_staff_id")
                        .table(Orders::Table)
                        .col(Orders::StaffId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::ItemId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::ListPrice)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::Discount)
                                .decimal_len(4, 2)
                                .not_null()
                                .default(0),
                        )
                        .primary_key(
                            Index::create()
                                .name("pk_order_items")
                                .col(OrderItems::OrderId)
                                .col(OrderItems::ItemId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::OrderId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_product_id")
                                .from(OrderItems::Table, OrderItems::ProductId)
                                .to(Products::Table, Products::ProductId)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000005_create_promocodes_table {
    use super::Promocodes;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_promocodes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Promocodes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Promocodes::PromocodeId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Promocodes::PromocodeName)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Promocodes::Discount)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Promocodes::DiscountType).string_len(16).not_null())
                        .col(
                            ColumnDef::new(Promocodes::OrderLimitPrice)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Promocodes::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000006_create_users_table {
    use super::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::UserId).uuid().not_null().primary_key())
                        .col(
                            ColumnDef::new(Users::Username)
                                .string_len(64)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn migration_names_are_unique_and_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len(), "duplicate migration names: {:?}", names);

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(sorted, names);
        assert!(names.iter().all(|name| name.starts_with("m2024")));
    }
}
