use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_users_table::Migration),
            Box::new(m20240301_000002_create_catalog_tables::Migration),
            Box::new(m20240301_000003_create_profile_tables::Migration),
            Box::new(m20240301_000004_create_basket_and_order_tables::Migration),
        ]
    }
}

mod m20240301_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_users_table"
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
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Username)
                                .string_len(150)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Users::FirstName)
                                .string_len(150)
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Users::Email)
                                .string_len(254)
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::IsStaff)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::DateJoined)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::LastLogin)
                                .timestamp_with_time_zone()
                                .null(),
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

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Username,
        FirstName,
        Email,
        PasswordHash,
        IsStaff,
        IsActive,
        DateJoined,
        LastLogin,
    }
}

mod m20240301_000002_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_catalog_tables"
        }
    }

    fn id_col<T: IntoIden>(col: T) -> ColumnDef {
        ColumnDef::new(col)
            .integer()
            .not_null()
            .auto_increment()
            .primary_key()
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(id_col(Categories::Id))
                        .col(ColumnDef::new(Categories::Title).string_len(100).not_null())
                        .col(ColumnDef::new(Categories::Slug).string_len(100).not_null())
                        .col(ColumnDef::new(Categories::ParentId).integer().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_categories_parent_id")
                                .from(Categories::Table, Categories::ParentId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_categories_parent_id")
                        .table(Categories::Table)
                        .col(Categories::ParentId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CategoryImages::Table)
                        .if_not_exists()
                        .col(id_col(CategoryImages::Id))
                        .col(
                            ColumnDef::new(CategoryImages::CategoryId)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(CategoryImages::Src).string().not_null())
                        .col(
                            ColumnDef::new(CategoryImages::Alt)
                                .string_len(128)
                                .not_null()
                                .default(""),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_category_images_category_id")
                                .from(CategoryImages::Table, CategoryImages::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Tags::Table)
                        .if_not_exists()
                        .col(id_col(Tags::Id))
                        .col(
                            ColumnDef::new(Tags::Name)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(id_col(Products::Id))
                        .col(ColumnDef::new(Products::Title).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal_len(8, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Count)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Date)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::Description)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Products::FullDescription)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Products::Archived)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Products::FreeDelivery)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Products::LimitedEdition)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Products::CategoryId).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_category_id")
                                .from(Products::Table, Products::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            for (name, col) in [
                ("idx_products_category_id", Products::CategoryId),
                ("idx_products_price", Products::Price),
                ("idx_products_date", Products::Date),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(name)
                            .table(Products::Table)
                            .col(col)
                            .to_owned(),
                    )
                    .await?;
            }

            manager
                .create_table(
                    Table::create()
                        .table(ProductTags::Table)
                        .if_not_exists()
                        .col(id_col(ProductTags::Id))
                        .col(ColumnDef::new(ProductTags::ProductId).integer().not_null())
                        .col(ColumnDef::new(ProductTags::TagId).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_tags_product_id")
                                .from(ProductTags::Table, ProductTags::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_tags_tag_id")
                                .from(ProductTags::Table, ProductTags::TagId)
                                .to(Tags::Table, Tags::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_product_tags_product_tag")
                        .table(ProductTags::Table)
                        .col(ProductTags::ProductId)
                        .col(ProductTags::TagId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductImages::Table)
                        .if_not_exists()
                        .col(id_col(ProductImages::Id))
                        .col(ColumnDef::new(ProductImages::ProductId).integer().not_null())
                        .col(ColumnDef::new(ProductImages::Src).string().not_null())
                        .col(
                            ColumnDef::new(ProductImages::Alt)
                                .string_len(128)
                                .not_null()
                                .default(""),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_images_product_id")
                                .from(ProductImages::Table, ProductImages::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Specifications::Table)
                        .if_not_exists()
                        .col(id_col(Specifications::Id))
                        .col(
                            ColumnDef::new(Specifications::ProductId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Specifications::Name)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Specifications::Value)
                                .string_len(200)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_specifications_product_id")
                                .from(Specifications::Table, Specifications::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Reviews::Table)
                        .if_not_exists()
                        .col(id_col(Reviews::Id))
                        .col(ColumnDef::new(Reviews::UserId).integer().not_null())
                        .col(ColumnDef::new(Reviews::ProductId).integer().not_null())
                        .col(ColumnDef::new(Reviews::Author).string_len(191).not_null())
                        .col(ColumnDef::new(Reviews::Email).string_len(254).not_null())
                        .col(ColumnDef::new(Reviews::Text).text().not_null())
                        .col(ColumnDef::new(Reviews::Rate).small_integer().not_null())
                        .col(
                            ColumnDef::new(Reviews::Date)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reviews_user_id")
                                .from(Reviews::Table, Reviews::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reviews_product_id")
                                .from(Reviews::Table, Reviews::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reviews_product_id")
                        .table(Reviews::Table)
                        .col(Reviews::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Sales::Table)
                        .if_not_exists()
                        .col(id_col(Sales::Id))
                        .col(
                            ColumnDef::new(Sales::ProductId)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Sales::SalePrice)
                                .decimal_len(8, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Sales::DateFrom)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Sales::DateTo)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sales_product_id")
                                .from(Sales::Table, Sales::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Sales::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Reviews::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Specifications::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProductImages::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProductTags::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tags::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CategoryImages::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Categories {
        Table,
        Id,
        Title,
        Slug,
        ParentId,
    }

    #[derive(DeriveIden)]
    enum CategoryImages {
        Table,
        Id,
        CategoryId,
        Src,
        Alt,
    }

    #[derive(DeriveIden)]
    enum Tags {
        Table,
        Id,
        Name,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Products {
        Table,
        Id,
        Title,
        Price,
        Count,
        Date,
        Description,
        FullDescription,
        Archived,
        FreeDelivery,
        LimitedEdition,
        CategoryId,
    }

    #[derive(DeriveIden)]
    enum ProductTags {
        Table,
        Id,
        ProductId,
        TagId,
    }

    #[derive(DeriveIden)]
    enum ProductImages {
        Table,
        Id,
        ProductId,
        Src,
        Alt,
    }

    #[derive(DeriveIden)]
    enum Specifications {
        Table,
        Id,
        ProductId,
        Name,
        Value,
    }

    #[derive(DeriveIden)]
    enum Reviews {
        Table,
        Id,
        UserId,
        ProductId,
        Author,
        Email,
        Text,
        Rate,
        Date,
    }

    #[derive(DeriveIden)]
    enum Sales {
        Table,
        Id,
        ProductId,
        SalePrice,
        DateFrom,
        DateTo,
    }
}

mod m20240301_000003_create_profile_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_profile_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Profiles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Profiles::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Profiles::UserId)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Profiles::FullName)
                                .string_len(150)
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Profiles::Phone)
                                .string_len(16)
                                .null()
                                .unique_key(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_profiles_user_id")
                                .from(Profiles::Table, Profiles::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProfileAvatars::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProfileAvatars::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ProfileAvatars::ProfileId)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(ProfileAvatars::Src).string().not_null())
                        .col(
                            ColumnDef::new(ProfileAvatars::Alt)
                                .string_len(128)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_profile_avatars_profile_id")
                                .from(ProfileAvatars::Table, ProfileAvatars::ProfileId)
                                .to(Profiles::Table, Profiles::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProfileAvatars::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Profiles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Profiles {
        Table,
        Id,
        UserId,
        FullName,
        Phone,
    }

    #[derive(DeriveIden)]
    enum ProfileAvatars {
        Table,
        Id,
        ProfileId,
        Src,
        Alt,
    }
}

mod m20240301_000004_create_basket_and_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_basket_and_order_tables"
        }
    }

    fn id_col<T: IntoIden>(col: T) -> ColumnDef {
        ColumnDef::new(col)
            .integer()
            .not_null()
            .auto_increment()
            .primary_key()
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Baskets::Table)
                        .if_not_exists()
                        .col(id_col(Baskets::Id))
                        .col(
                            ColumnDef::new(Baskets::UserId)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_baskets_user_id")
                                .from(Baskets::Table, Baskets::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BasketItems::Table)
                        .if_not_exists()
                        .col(id_col(BasketItems::Id))
                        .col(ColumnDef::new(BasketItems::BasketId).integer().not_null())
                        .col(ColumnDef::new(BasketItems::ProductId).integer().not_null())
                        .col(
                            ColumnDef::new(BasketItems::Count)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_basket_items_basket_id")
                                .from(BasketItems::Table, BasketItems::BasketId)
                                .to(Baskets::Table, Baskets::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_basket_items_product_id")
                                .from(BasketItems::Table, BasketItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_basket_items_basket_product")
                        .table(BasketItems::Table)
                        .col(BasketItems::BasketId)
                        .col(BasketItems::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(id_col(Orders::Id))
                        .col(ColumnDef::new(Orders::ProfileId).integer().not_null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::DeliveryType)
                                .string_len(32)
                                .not_null()
                                .default("ordinary"),
                        )
                        .col(
                            ColumnDef::new(Orders::PaymentType)
                                .string_len(32)
                                .not_null()
                                .default("online"),
                        )
                        .col(
                            ColumnDef::new(Orders::Status)
                                .string_len(32)
                                .not_null()
                                .default("created"),
                        )
                        .col(
                            ColumnDef::new(Orders::City)
                                .string_len(128)
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Orders::Address)
                                .string_len(255)
                                .not_null()
                                .default(""),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_profile_id")
                                .from(Orders::Table, Orders::ProfileId)
                                .to(Profiles::Table, Profiles::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_profile_id")
                        .table(Orders::Table)
                        .col(Orders::ProfileId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(id_col(OrderItems::Id))
                        .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::Count)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_product_id")
                                .from(OrderItems::Table, OrderItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
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
                .await?;
            manager
                .drop_table(Table::drop().table(BasketItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Baskets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Profiles {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Baskets {
        Table,
        Id,
        UserId,
    }

    #[derive(DeriveIden)]
    enum BasketItems {
        Table,
        Id,
        BasketId,
        ProductId,
        Count,
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        ProfileId,
        CreatedAt,
        DeliveryType,
        PaymentType,
        Status,
        City,
        Address,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Count,
    }
}
