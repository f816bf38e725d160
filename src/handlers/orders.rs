use crate::auth::rbac::{ROLE_ADMIN, ROLE_USER};
use crate::auth::{AuthRouterExt, AuthUser};
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::services::orders::{CreateOrderInput, UpdateOrderStatusInput};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Creates the router for order endpoints.
///
/// Placing and reading orders requires the `user` role; status changes
/// require `admin`.
pub fn orders_routes() -> Router<Arc<AppState>> {
    let user_ops = Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", get(get_order))
        .route("/:id/items", get(get_order_items))
        .route("/:id/items/:item_id", get(get_order_item))
        .with_role(ROLE_USER);

    let admin_ops = Router::new()
        .route("/:id", patch(update_order_status))
        .with_role(ROLE_ADMIN);

    user_ops.merge(admin_ops)
}

/// Place an order from the caller's cart
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderInput,
    responses(
        (status = 201, description = "Order created with captured prices"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Cart not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateOrderInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let order = state
        .services
        .orders
        .create_order(user.user_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(order))
}

/// List the caller's orders
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paged order list"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (orders, total) = state
        .services
        .orders
        .list_orders_for_user(user.user_id, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        orders,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get an order by id
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with items"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

/// Overwrite an order's status
#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusInput,
    responses(
        (status = 200, description = "Order after the status change"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusInput>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .update_order_status(id, payload.status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

/// List an order's items
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/items",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order item list"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order_items(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .orders
        .get_order_items(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// Get a single order item
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Order id"),
        ("item_id" = Uuid, Path, description = "Order item id")
    ),
    responses(
        (status = 200, description = "Order item"),
        (status = 404, description = "Order or item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order_item(
    State(state): State<Arc<AppState>>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .orders
        .get_order_item(id, item_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(item))
}
