use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_user_roles_table::Migration),
            Box::new(m20240101_000003_create_books_table::Migration),
            Box::new(m20240101_000004_create_categories_table::Migration),
            Box::new(m20240101_000005_create_book_categories_table::Migration),
            Box::new(m20240101_000006_create_carts_table::Migration),
            Box::new(m20240101_000007_create_cart_items_table::Migration),
            Box::new(m20240101_000008_create_orders_table::Migration),
            Box::new(m20240101_000009_create_order_items_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_users_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
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
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::FirstName).string().not_null())
                        .col(ColumnDef::new(Users::LastName).string().not_null())
                        .col(ColumnDef::new(Users::ShippingAddress).string().null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_email")
                        .table(Users::Table)
                        .col(Users::Email)
                        .unique()
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
    pub(super) enum Users {
        Table,
        Id,
        Email,
        PasswordHash,
        FirstName,
        LastName,
        ShippingAddress,
        CreatedAt,
    }
}

mod m20240101_000002_create_user_roles_table {

    use super::m20240101_000001_create_users_table::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_user_roles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UserRoles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserRoles::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UserRoles::UserId).uuid().not_null())
                        .col(ColumnDef::new(UserRoles::Role).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_roles_user_id")
                                .from(UserRoles::Table, UserRoles::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_user_roles_user_id")
                        .table(UserRoles::Table)
                        .col(UserRoles::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserRoles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum UserRoles {
        Table,
        Id,
        UserId,
        Role,
    }
}

mod m20240101_000003_create_books_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_books_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Books::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Books::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Books::Title).string().not_null())
                        .col(ColumnDef::new(Books::Author).string().not_null())
                        .col(ColumnDef::new(Books::Isbn).string().not_null())
                        .col(
                            ColumnDef::new(Books::Price)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Books::Description).string().null())
                        .col(ColumnDef::new(Books::CoverImage).string().null())
                        .col(
                            ColumnDef::new(Books::IsDeleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Books::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Books::UpdatedAt).timestamp_with_time_zone().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_books_isbn")
                        .table(Books::Table)
                        .col(Books::Isbn)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_books_title")
                        .table(Books::Table)
                        .col(Books::Title)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_books_author")
                        .table(Books::Table)
                        .col(Books::Author)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Books::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Books {
        Table,
        Id,
        Title,
        Author,
        Isbn,
        Price,
        Description,
        CoverImage,
        IsDeleted,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_categories_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_categories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Categories::Name).string().not_null())
                        .col(ColumnDef::new(Categories::Description).string().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Categories {
        Table,
        Id,
        Name,
        Description,
    }
}

mod m20240101_000005_create_book_categories_table {

    use super::m20240101_000003_create_books_table::Books;
    use super::m20240101_000004_create_categories_table::Categories;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_book_categories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BookCategories::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(BookCategories::BookId).uuid().not_null())
                        .col(
                            ColumnDef::new(BookCategories::CategoryId)
                                .uuid()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(BookCategories::BookId)
                                .col(BookCategories::CategoryId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_book_categories_book_id")
                                .from(BookCategories::Table, BookCategories::BookId)
                                .to(Books::Table, Books::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_book_categories_category_id")
                                .from(BookCategories::Table, BookCategories::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_book_categories_category_id")
                        .table(BookCategories::Table)
                        .col(BookCategories::CategoryId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BookCategories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum BookCategories {
        Table,
        BookId,
        CategoryId,
    }
}

mod m20240101_000006_create_carts_table {

    use super::m20240101_000001_create_users_table::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_carts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Cart primary key doubles as the owning user's id
            manager
                .create_table(
                    Table::create()
                        .table(Carts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Carts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Carts::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_carts_user_id")
                                .from(Carts::Table, Carts::Id)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Carts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Carts {
        Table,
        Id,
        CreatedAt,
    }
}

mod m20240101_000007_create_cart_items_table {

    use super::m20240101_000003_create_books_table::Books;
    use super::m20240101_000006_create_carts_table::Carts;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_cart_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CartItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CartItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CartItems::CartId).uuid().not_null())
                        .col(ColumnDef::new(CartItems::BookId).uuid().not_null())
                        .col(
                            ColumnDef::new(CartItems::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(CartItems::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(CartItems::UpdatedAt).timestamp_with_time_zone().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_cart_id")
                                .from(CartItems::Table, CartItems::CartId)
                                .to(Carts::Table, Carts::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_book_id")
                                .from(CartItems::Table, CartItems::BookId)
                                .to(Books::Table, Books::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cart_items_cart_id")
                        .table(CartItems::Table)
                        .col(CartItems::CartId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CartItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum CartItems {
        Table,
        Id,
        CartId,
        BookId,
        Quantity,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000008_create_orders_table {

    use super::m20240101_000001_create_users_table::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_orders_table"
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
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::UserId).uuid().not_null())
                        .col(ColumnDef::new(Orders::Status).string_len(20).not_null())
                        .col(ColumnDef::new(Orders::OrderDate).timestamp_with_time_zone().not_null())
                        .col(
                            ColumnDef::new(Orders::ShippingAddress)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::Total)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp_with_time_zone().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_user_id")
                                .from(Orders::Table, Orders::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_user_id")
                        .table(Orders::Table)
                        .col(Orders::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        UserId,
        Status,
        OrderDate,
        ShippingAddress,
        Total,
        UpdatedAt,
    }
}

mod m20240101_000009_create_order_items_table {

    use super::m20240101_000003_create_books_table::Books;
    use super::m20240101_000008_create_orders_table::Orders;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::BookId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::Price)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderItems::IsDeleted)
                                .boolean()
                                .not_null()
                                .default(false),
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
                                .name("fk_order_items_book_id")
                                .from(OrderItems::Table, OrderItems::BookId)
                                .to(Books::Table, Books::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderItems {
        Table,
        Id,
        OrderId,
        BookId,
        Quantity,
        Price,
        IsDeleted,
    }
}
