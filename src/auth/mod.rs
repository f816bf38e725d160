/*!
 * # Authentication and Authorization Module
 *
 * JWT-based authentication with refresh token support, argon2 password
 * hashing, and role-based route gating.
 */

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::{user, user_role};

pub mod rbac;

pub use rbac::*;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,           // Subject (user ID)
    pub email: Option<String>, // User's email
    pub roles: Vec<String>,    // User's roles
    pub jti: String,           // JWT ID (unique identifier for this token)
    pub iat: i64,              // Issued at time
    pub exp: i64,              // Expiration time
    pub nbf: i64,              // Not valid before time
    pub iss: String,           // Issuer
    pub aud: String,           // Audience
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub token_id: String,
}

impl AuthUser {
    /// Check if the user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if the user is an admin
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
    pub refresh_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        access_token_expiration: Duration,
        refresh_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
            refresh_token_expiration,
        }
    }

    pub fn from_app_config(cfg: &AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            jwt_audience: cfg.auth_audience.clone(),
            jwt_issuer: cfg.auth_issuer.clone(),
            access_token_expiration: Duration::from_secs(cfg.jwt_expiration as u64),
            refresh_token_expiration: Duration::from_secs(cfg.refresh_token_expiration as u64),
        }
    }
}

/// Token blacklist entry
#[derive(Clone, Debug)]
struct BlacklistedToken {
    jti: String,
    expiry: DateTime<Utc>,
}

/// Authentication service that handles token issuance and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
    blacklisted_tokens: Arc<RwLock<Vec<BlacklistedToken>>>,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            blacklisted_tokens: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Verify credentials and return the account with its roles.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(user::Model, Vec<String>), AuthError> {
        let account = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let roles = self.get_user_roles(account.id).await?;
        Ok((account, roles))
    }

    /// Generate an access/refresh token pair for a user
    pub async fn generate_token(
        &self,
        account: &user::Model,
        roles: &[String],
    ) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;
        let refresh_exp = now
            + ChronoDuration::from_std(self.config.refresh_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let access_claims = Claims {
            sub: account.id.to_string(),
            email: Some(account.email.clone()),
            roles: roles.to_vec(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        // Refresh token carries minimal data; roles are re-read on refresh
        let refresh_claims = Claims {
            sub: account.id.to_string(),
            email: None,
            roles: vec![],
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &access_claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        let refresh_token = encode(
            &Header::new(Algorithm::HS256),
            &refresh_claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            refresh_expires_in: self.config.refresh_token_expiration.as_secs() as i64,
        })
    }

    /// Validate a JWT token and extract the claims
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        if self.is_token_blacklisted(&claims.jti).await {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    /// Refresh an access token using a refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.validate_token(refresh_token).await?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        let account = user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        let roles = self.get_user_roles(user_id).await?;
        let new_tokens = self.generate_token(&account, &roles).await?;

        // One-shot refresh tokens: the presented token is revoked
        self.blacklist_jti(&claims.jti, claims.exp).await;

        Ok(new_tokens)
    }

    /// Revoke a token (add it to the blacklist)
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.validate_token(token).await?;
        self.blacklist_jti(&claims.jti, claims.exp).await;
        Ok(())
    }

    /// Fetch the role names granted to a user
    pub async fn get_user_roles(&self, user_id: Uuid) -> Result<Vec<String>, AuthError> {
        let grants = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(grants.into_iter().map(|g| g.role).collect())
    }

    async fn blacklist_jti(&self, jti: &str, exp: i64) {
        let expiry = DateTime::<Utc>::from_timestamp(exp, 0).unwrap_or_else(Utc::now);
        let mut blacklist = self.blacklisted_tokens.write().await;
        let now = Utc::now();
        blacklist.retain(|entry| entry.expiry > now);
        blacklist.push(BlacklistedToken {
            jti: jti.to_string(),
            expiry,
        });
    }

    async fn is_token_blacklisted(&self, jti: &str) -> bool {
        let blacklist = self.blacklisted_tokens.read().await;
        blacklist.iter().any(|entry| entry.jti == jti)
    }
}

/// Hash a password with argon2id and a fresh random salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::InternalError(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored argon2 hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::InternalError(format!("Stored hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Token pair response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
}

/// Login credentials
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message): (StatusCode, &str, String) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication required".to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REVOKED_TOKEN",
                "Authentication token has been revoked".to_string(),
            ),
            Self::TokenCreation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                "Token creation failed".to_string(),
            ),
            Self::UserNotFound => (
                StatusCode::NOT_FOUND,
                "AUTH_USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "AUTH_INSUFFICIENT_PERMISSIONS",
                "Insufficient permissions".to_string(),
            ),
            Self::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_DATABASE_ERROR",
                "Database error".to_string(),
            ),
            Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

/// Role middleware to check if a user has the required role
pub async fn role_middleware(
    State(required_role): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !is_known_role(&required_role) {
        warn!("Route gated on undefined role '{}'", required_role);
    }

    let user = match request.extensions().get::<AuthUser>() {
        Some(user) => user.clone(),
        None => return Err(AuthError::MissingAuth),
    };

    if !user.has_role(&required_role) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates auth tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers().clone();

    // The auth service is injected into request extensions at startup
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(&headers, &auth_service).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extract authentication info from request headers
async fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_value) = auth_header.to_str() {
            if auth_value.starts_with("Bearer ") {
                let token = auth_value.trim_start_matches("Bearer ").trim();
                let claims = auth_service.validate_token(token).await?;

                let user_id =
                    Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

                return Ok(AuthUser {
                    user_id,
                    email: claims.email,
                    roles: claims.roles,
                    token_id: claims.jti,
                });
            }
        }
    }

    Err(AuthError::MissingAuth)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            role.to_string(),
            role_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig::new(
            "unit-test-secret-key-that-is-long-enough-for-hs256-signing-0123".into(),
            "bookstore-clients".into(),
            "bookstore-api".into(),
            Duration::from_secs(3600),
            Duration::from_secs(86_400),
        )
    }

    fn test_account() -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            email: "reader@example.com".into(),
            password_hash: "unused".into(),
            first_name: "Test".into(),
            last_name: "Reader".into(),
            shipping_address: None,
            created_at: Utc::now(),
        }
    }

    async fn test_service() -> AuthService {
        let db = sea_orm::Database::connect("sqlite::memory:")
            .await
            .unwrap();
        AuthService::new(test_config(), Arc::new(db))
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("opensesame").unwrap();
        assert!(verify_password("opensesame", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[tokio::test]
    async fn generated_access_token_validates() {
        let service = test_service().await;
        let account = test_account();

        let pair = service
            .generate_token(&account, &[ROLE_USER.to_string()])
            .await
            .unwrap();
        assert_eq!(pair.token_type, "Bearer");

        let claims = service.validate_token(&pair.access_token).await.unwrap();
        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.roles, vec![ROLE_USER.to_string()]);
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let service = test_service().await;
        let account = test_account();

        let pair = service.generate_token(&account, &[]).await.unwrap();
        service.revoke_token(&pair.access_token).await.unwrap();

        let err = service.validate_token(&pair.access_token).await;
        assert!(matches!(err, Err(AuthError::RevokedToken)));
    }

    #[tokio::test]
    async fn token_from_other_issuer_is_rejected() {
        let service = test_service().await;
        let mut other_config = test_config();
        other_config.jwt_issuer = "someone-else".into();
        let other = AuthService::new(other_config, service.db.clone());

        let pair = other.generate_token(&test_account(), &[]).await.unwrap();
        assert!(matches!(
            service.validate_token(&pair.access_token).await,
            Err(AuthError::InvalidToken)
        ));
    }
}
