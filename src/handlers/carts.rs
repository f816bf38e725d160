use crate::auth::rbac::ROLE_USER;
use crate::auth::{AuthRouterExt, AuthUser};
use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::services::carts::{AddToCartInput, UpdateCartItemInput};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Creates the router for the authenticated user's cart.
///
/// Carts are addressed implicitly: the cart id is the caller's user id.
pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_cart))
        .route("/", post(add_to_cart))
        .route("/cart-items/:id", put(update_cart_item))
        .route("/cart-items/:id", delete(remove_cart_item))
        .with_role(ROLE_USER)
}

/// Get the caller's cart with items
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "Cart with line items"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Cart not found", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state
        .services
        .carts
        .get_cart(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// Add a line item to the caller's cart
#[utoipa::path(
    post,
    path = "/api/v1/cart",
    request_body = AddToCartInput,
    responses(
        (status = 200, description = "Cart after the addition"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Book or cart not found", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<AddToCartInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let cart = state
        .services
        .carts
        .add_item(user.user_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// Update a line item's quantity
#[utoipa::path(
    put,
    path = "/api/v1/cart/cart-items/{id}",
    params(("id" = Uuid, Path, description = "Cart item id")),
    request_body = UpdateCartItemInput,
    responses(
        (status = 200, description = "Cart after the update"),
        (status = 404, description = "Cart item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn update_cart_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let cart = state
        .services
        .carts
        .update_item_quantity(user.user_id, item_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// Remove a line item
#[utoipa::path(
    delete,
    path = "/api/v1/cart/cart-items/{id}",
    params(("id" = Uuid, Path, description = "Cart item id")),
    responses(
        (status = 200, description = "Cart after the removal"),
        (status = 404, description = "Cart item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn remove_cart_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state
        .services
        .carts
        .remove_item(user.user_id, item_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}
