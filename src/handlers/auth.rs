use crate::auth::{AuthError, LoginCredentials, RefreshTokenRequest};
use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::services::users::RegisterInput;
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use std::sync::Arc;
use tracing::info;

/// Creates the public authentication router. No role gate applies here.
pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterInput,
    responses(
        (status = 201, description = "Account created with an empty cart"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state
        .services
        .users
        .register(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(user))
}

/// Exchange credentials for a token pair
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginCredentials,
    responses(
        (status = 200, description = "Access and refresh tokens", body = crate::auth::TokenPair),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<impl IntoResponse, AuthError> {
    let (account, roles) = state
        .auth
        .authenticate(&credentials.email, &credentials.password)
        .await?;

    let tokens = state.auth.generate_token(&account, &roles).await?;
    info!(user_id = %account.id, "Login succeeded");

    Ok(success_response(tokens))
}

/// Exchange a refresh token for a fresh token pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access and refresh tokens", body = crate::auth::TokenPair),
        (status = 401, description = "Expired, revoked or malformed token")
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let tokens = state.auth.refresh_token(&request.refresh_token).await?;
    Ok(success_response(tokens))
}
