use crate::auth::{hash_password, rbac::ROLE_USER};
use crate::entities::{user, user_role};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::CartService;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Registers a new account.
    ///
    /// Creates the user row, grants the `user` role and creates the
    /// account's cart in one transaction. A duplicate email fails with
    /// `Conflict`; mismatched passwords fail validation before any write.
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterInput) -> Result<UserResponse, ServiceError> {
        input.validate()?;

        let txn = self.db.begin().await?;

        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(input.email.as_str()))
            .count(&txn)
            .await?
            > 0;
        if taken {
            return Err(ServiceError::Conflict(format!(
                "An account with email {} already exists",
                input.email
            )));
        }

        let password_hash =
            hash_password(&input.password).map_err(|e| ServiceError::HashError(e.to_string()))?;

        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(input.email),
            password_hash: Set(password_hash),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            shipping_address: Set(input.shipping_address),
            created_at: Set(Utc::now()),
        };
        let user = user.insert(&txn).await?;

        user_role::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            role: Set(ROLE_USER.to_string()),
        }
        .insert(&txn)
        .await?;

        CartService::create_cart_for_user(&txn, user.id).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::UserRegistered(user.id));
        info!(user_id = %user.id, "User registered");

        Ok(UserResponse::from(user))
    }
}

fn validate_passwords_match(input: &RegisterInput) -> Result<(), ValidationError> {
    if input.password != input.repeat_password {
        return Err(ValidationError::new("passwords_do_not_match"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_passwords_match"))]
pub struct RegisterInput {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub repeat_password: String,
    #[validate(length(min = 1, message = "First name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name must not be empty"))]
    pub last_name: String,
    pub shipping_address: Option<String>,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub shipping_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            shipping_address: user.shipping_address,
            created_at: user.created_at,
        }
    }
}
