use crate::auth::rbac::{ROLE_ADMIN, ROLE_USER};
use crate::auth::AuthRouterExt;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, PaginationParams,
};
use crate::services::categories::CategoryInput;
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Creates the router for category endpoints.
pub fn categories_routes() -> Router<Arc<AppState>> {
    let reads = Router::new()
        .route("/", get(list_categories))
        .route("/:id", get(get_category))
        .route("/:id/books", get(books_in_category))
        .with_role(ROLE_USER);

    let mutations = Router::new()
        .route("/", post(create_category))
        .route("/:id", put(update_category).delete(delete_category))
        .with_role(ROLE_ADMIN);

    reads.merge(mutations)
}

/// List categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paged category list"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (categories, total) = state
        .services
        .categories
        .list_categories(pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        categories,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get a category by id
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category found"),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .services
        .categories
        .get_category(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(category))
}

/// List the live books attached to a category
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}/books",
    params(("id" = Uuid, Path, description = "Category id"), PaginationParams),
    responses(
        (status = 200, description = "Paged book list"),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn books_in_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (books, total) = state
        .services
        .categories
        .books_in_category(id, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        books,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let category = state
        .services
        .categories
        .create_category(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(category))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated"),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let category = state
        .services
        .categories
        .update_category(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(category))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .categories
        .delete_category(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}
