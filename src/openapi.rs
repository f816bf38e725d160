use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookstore API",
        version = "0.1.0",
        description = r#"
# Bookstore API

Online bookstore backend: catalog, categories, per-user shopping carts
and order placement with price capture.

## Authentication

Register at `/auth/register`, then exchange credentials for a JWT pair
at `/auth/login`. Include the access token on every `/api/v1` request:

```
Authorization: Bearer <your-jwt-token>
```

Catalog and category mutations and order status changes require the
`admin` role; everything else requires `user`.

## Pagination

List endpoints accept `page` (default 1) and `per_page` (default 20).
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Registration and token endpoints"),
        (name = "books", description = "Catalog book endpoints"),
        (name = "categories", description = "Category endpoints"),
        (name = "cart", description = "Shopping cart endpoints"),
        (name = "orders", description = "Order endpoints")
    ),
    paths(
        // Auth
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::refresh,

        // Books
        crate::handlers::books::list_books,
        crate::handlers::books::search_books,
        crate::handlers::books::get_book,
        crate::handlers::books::create_book,
        crate::handlers::books::update_book,
        crate::handlers::books::delete_book,

        // Categories
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::books_in_category,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,

        // Cart
        crate::handlers::carts::get_cart,
        crate::handlers::carts::add_to_cart,
        crate::handlers::carts::update_cart_item,
        crate::handlers::carts::remove_cart_item,

        // Orders
        crate::handlers::orders::create_order,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::get_order_items,
        crate::handlers::orders::get_order_item,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::auth::TokenPair,
            crate::auth::LoginCredentials,
            crate::auth::RefreshTokenRequest,
            crate::entities::order::OrderStatus,
            crate::services::users::RegisterInput,
            crate::services::users::UserResponse,
            crate::services::books::CreateBookInput,
            crate::services::books::UpdateBookInput,
            crate::services::books::BookDetails,
            crate::services::categories::CategoryInput,
            crate::services::carts::AddToCartInput,
            crate::services::carts::UpdateCartItemInput,
            crate::services::carts::CartWithItems,
            crate::services::orders::CreateOrderInput,
            crate::services::orders::UpdateOrderStatusInput,
            crate::services::orders::OrderDetails,
        )
    )
)]
pub struct ApiDoc;

/// Mounts Swagger UI at /docs with the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
