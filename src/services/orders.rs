use crate::entities::{book, cart, cart_item, order, order_item};
use crate::entities::order::OrderStatus;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Places an order from the user's current cart.
    ///
    /// Each cart line item is captured into an order item carrying the
    /// book's price at this moment, so later catalog price changes do
    /// not affect order history. The order row is inserted first and
    /// the items second, inside one transaction.
    ///
    /// The cart is left untouched after the order is placed.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The ordering user; must resolve to an existing cart.
    /// * `input` - The shipping address for this order.
    ///
    /// # Returns
    ///
    /// The created order with its items, status `PENDING`.
    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        user_id: Uuid,
        input: CreateOrderInput,
    ) -> Result<OrderDetails, ServiceError> {
        input.validate()?;

        let txn = self.db.begin().await?;

        let cart = cart::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart for user {} not found", user_id)))?;
        let lines = cart.find_related(cart_item::Entity).all(&txn).await?;

        let mut captured: Vec<(Uuid, i32, Decimal)> = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;
        for line in &lines {
            let book = book::Entity::find_by_id(line.book_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Book {} not found", line.book_id))
                })?;
            total += book.price * Decimal::from(line.quantity);
            captured.push((book.id, line.quantity, book.price));
        }

        let order = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            status: Set(OrderStatus::Pending),
            order_date: Set(Utc::now()),
            shipping_address: Set(input.shipping_address),
            total: Set(total),
            updated_at: Set(None),
        };
        let order = order.insert(&txn).await?;

        for (book_id, quantity, price) in captured {
            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                book_id: Set(book_id),
                quantity: Set(quantity),
                price: Set(price),
                is_deleted: Set(false),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderCreated(order.id));
        info!(order_id = %order.id, user_id = %user_id, total = %order.total, "Order created");

        self.get_order(order.id).await
    }

    /// Fetches an order with its live items.
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderDetails, ServiceError> {
        let order = self.get_order_model(&*self.db, order_id).await?;
        let items = self.live_items(order_id).await?;
        Ok(OrderDetails { order, items })
    }

    /// Paged listing of one user's orders, newest first not guaranteed.
    #[instrument(skip(self))]
    pub async fn list_orders_for_user(
        &self,
        user_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<OrderDetails>, u64), ServiceError> {
        let paginator = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.live_items(order.id).await?;
            details.push(OrderDetails { order, items });
        }

        Ok((details, total))
    }

    /// Overwrites an order's status without transition validation.
    ///
    /// The caller's identity is not checked against the order's owner.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<order::Model, ServiceError> {
        let order = self.get_order_model(&*self.db, order_id).await?;
        let old_status = order.status;

        let mut active: order::ActiveModel = order.into();
        active.status = Set(new_status);
        active.updated_at = Set(Some(Utc::now()));
        let order = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            });
        info!(order_id = %order_id, ?old_status, ?new_status, "Order status updated");

        Ok(order)
    }

    /// Lists an order's live items, or `NotFound` for an unknown order.
    #[instrument(skip(self))]
    pub async fn get_order_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<order_item::Model>, ServiceError> {
        self.get_order_model(&*self.db, order_id).await?;
        self.live_items(order_id).await
    }

    /// Fetches a single live item scoped to its order.
    #[instrument(skip(self))]
    pub async fn get_order_item(
        &self,
        order_id: Uuid,
        item_id: Uuid,
    ) -> Result<order_item::Model, ServiceError> {
        self.get_order_model(&*self.db, order_id).await?;

        order_item::Entity::find_by_id(item_id)
            .filter(order_item::Column::OrderId.eq(order_id))
            .filter(order_item::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order item {} not found", item_id)))
    }

    async fn get_order_model<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(order_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    async fn live_items(&self, order_id: Uuid) -> Result<Vec<order_item::Model>, ServiceError> {
        Ok(order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .filter(order_item::Column::IsDeleted.eq(false))
            .all(&*self.db)
            .await?)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrderInput {
    #[validate(length(min = 1, message = "Shipping address must not be empty"))]
    pub shipping_address: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderStatusInput {
    pub status: OrderStatus,
}

/// An order with its item snapshots.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn decimal_total_is_exact() {
        let lines = [(dec!(20.00), 2), (dec!(9.99), 1)];
        let total: Decimal = lines
            .iter()
            .map(|(price, qty)| price * Decimal::from(*qty))
            .sum();
        assert_eq!(total, dec!(49.99));
    }
}
