use crate::entities::order::OrderStatus;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events published after state changes commit.
///
/// Delivery is fire-and-forget over an in-process channel; a full channel
/// or missing consumer must never fail the request that produced the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Account events
    UserRegistered(Uuid),

    // Catalog events
    BookCreated(Uuid),
    BookUpdated(Uuid),
    BookDeleted(Uuid),
    CategoryCreated(Uuid),
    CategoryUpdated(Uuid),
    CategoryDeleted(Uuid),

    // Cart events
    CartItemAdded { cart_id: Uuid, book_id: Uuid },
    CartItemUpdated { cart_id: Uuid, item_id: Uuid },
    CartItemRemoved(Uuid),

    // Order events
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event without waiting for channel capacity, logging
    /// instead of failing when the channel is closed or full. Event
    /// delivery never blocks the calling request.
    pub fn send_or_log(&self, event: Event) {
        if let Err(e) = self.sender.try_send(event) {
            warn!("Dropping domain event: {}", e);
        }
    }
}

/// Consumes events from the channel and logs them.
///
/// Spawned once at startup; runs until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::UserRegistered(user_id) => {
                info!(user_id = %user_id, "User registered");
            }
            Event::OrderCreated(order_id) => {
                info!(order_id = %order_id, "Order created");
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(
                    order_id = %order_id,
                    ?old_status,
                    ?new_status,
                    "Order status changed"
                );
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender
            .send(Event::BookCreated(Uuid::new_v4()))
            .await
            .unwrap();

        assert!(matches!(rx.recv().await, Some(Event::BookCreated(_))));
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or error out
        sender.send_or_log(Event::CartItemRemoved(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn send_or_log_drops_instead_of_waiting_on_a_full_channel() {
        let (tx, mut rx) = mpsc::channel(1);
        let sender = EventSender::new(tx);

        sender.send_or_log(Event::BookCreated(Uuid::new_v4()));
        // Channel is now at capacity; this must return immediately.
        sender.send_or_log(Event::BookDeleted(Uuid::new_v4()));

        assert!(matches!(rx.recv().await, Some(Event::BookCreated(_))));
        assert!(matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Empty)));
    }
}
