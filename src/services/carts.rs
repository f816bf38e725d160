use crate::entities::{book, cart, cart_item};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Shopping cart service.
///
/// A cart's primary key is the owning user's id, so every user has at
/// most one cart and cart lookups never need a join through the user.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates the user's cart. Called inside the registration
    /// transaction so a user never exists without a cart.
    pub async fn create_cart_for_user<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> Result<cart::Model, ServiceError> {
        let cart = cart::ActiveModel {
            id: Set(user_id),
            created_at: Set(Utc::now()),
        };
        Ok(cart.insert(conn).await?)
    }

    /// Fetches the user's cart with all of its line items.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartWithItems, ServiceError> {
        let cart = self.get_cart_model(&*self.db, user_id).await?;
        let items = cart.find_related(cart_item::Entity).all(&*self.db).await?;
        Ok(CartWithItems { cart, items })
    }

    /// Adds a line item to the user's cart.
    ///
    /// Adding the same book twice produces two independent line items;
    /// quantities are never merged.
    ///
    /// # Returns
    ///
    /// The full cart after the addition.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        input: AddToCartInput,
    ) -> Result<CartWithItems, ServiceError> {
        input.validate()?;

        let txn = self.db.begin().await?;

        let cart = self.get_cart_model(&txn, user_id).await?;

        let book = book::Entity::find_by_id(input.book_id)
            .filter(book::Column::IsDeleted.eq(false))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Book {} not found", input.book_id)))?;

        let item = cart_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart.id),
            book_id: Set(book.id),
            quantity: Set(input.quantity),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let item = item.insert(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                cart_id: cart.id,
                book_id: book.id,
            });
        info!(cart_id = %cart.id, item_id = %item.id, "Cart item added");

        self.get_cart(user_id).await
    }

    /// Changes a line item's quantity by item id.
    #[instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        input: UpdateCartItemInput,
    ) -> Result<CartWithItems, ServiceError> {
        input.validate()?;

        let txn = self.db.begin().await?;

        let item = cart_item::Entity::find_by_id(item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart item {} not found", item_id)))?;
        let cart_id = item.cart_id;

        let mut active: cart_item::ActiveModel = item.into();
        active.quantity = Set(input.quantity);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemUpdated { cart_id, item_id });
        info!(cart_id = %cart_id, item_id = %item_id, quantity = input.quantity, "Cart item updated");

        self.get_cart(user_id).await
    }

    /// Removes a line item by id. `NotFound` when the id does not resolve.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<CartWithItems, ServiceError> {
        let txn = self.db.begin().await?;

        let result = cart_item::Entity::delete_by_id(item_id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Cart item {} not found",
                item_id
            )));
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemRemoved(item_id));
        info!(item_id = %item_id, "Cart item removed");

        self.get_cart(user_id).await
    }

    async fn get_cart_model<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> Result<cart::Model, ServiceError> {
        cart::Entity::find_by_id(user_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart for user {} not found", user_id)))
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddToCartInput {
    pub book_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCartItemInput {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// A cart with its current line items.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartWithItems {
    #[serde(flatten)]
    pub cart: cart::Model,
    pub items: Vec<cart_item::Model>,
}
