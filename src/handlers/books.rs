use crate::auth::rbac::{ROLE_ADMIN, ROLE_USER};
use crate::auth::AuthRouterExt;
use crate::db::book_filter::BookSearchQuery;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, PaginationParams,
};
use crate::services::books::{CreateBookInput, UpdateBookInput};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Creates the router for catalog book endpoints.
///
/// Reads require the `user` role; mutations require `admin`.
pub fn books_routes() -> Router<Arc<AppState>> {
    let reads = Router::new()
        .route("/", get(list_books))
        .route("/search", get(search_books))
        .route("/:id", get(get_book))
        .with_role(ROLE_USER);

    let mutations = Router::new()
        .route("/", post(create_book))
        .route("/:id", put(update_book).delete(delete_book))
        .with_role(ROLE_ADMIN);

    reads.merge(mutations)
}

/// List books
#[utoipa::path(
    get,
    path = "/api/v1/books",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paged book list"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "books"
)]
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (books, total) = state
        .services
        .books
        .list_books(pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        books,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Search books with combined filters
#[utoipa::path(
    get,
    path = "/api/v1/books/search",
    params(BookSearchQuery, PaginationParams),
    responses(
        (status = 200, description = "Paged search result"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "books"
)]
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookSearchQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (books, total) = state
        .services
        .books
        .search_books(query.into_params(), pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        books,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get a book by id
#[utoipa::path(
    get,
    path = "/api/v1/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book found"),
        (status = 404, description = "Book not found", body = crate::errors::ErrorResponse)
    ),
    tag = "books"
)]
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state
        .services
        .books
        .get_book(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/api/v1/books",
    request_body = CreateBookInput,
    responses(
        (status = 201, description = "Book created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 409, description = "ISBN already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "books"
)]
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let book = state
        .services
        .books
        .create_book(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(book))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/api/v1/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = UpdateBookInput,
    responses(
        (status = 200, description = "Book updated"),
        (status = 404, description = "Book not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "ISBN already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "books"
)]
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let book = state
        .services
        .books
        .update_book(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(book))
}

/// Soft-delete a book
#[utoipa::path(
    delete,
    path = "/api/v1/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::errors::ErrorResponse)
    ),
    tag = "books"
)]
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .books
        .delete_book(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}
