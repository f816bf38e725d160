pub mod auth;
pub mod books;
pub mod carts;
pub mod categories;
pub mod common;
pub mod orders;

use crate::events::EventSender;
use crate::services::{BookService, CartService, CategoryService, OrderService, UserService};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub books: Arc<BookService>,
    pub categories: Arc<CategoryService>,
    pub carts: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self {
            books: Arc::new(BookService::new(db.clone(), event_sender.clone())),
            categories: Arc::new(CategoryService::new(db.clone(), event_sender.clone())),
            carts: Arc::new(CartService::new(db.clone(), event_sender.clone())),
            orders: Arc::new(OrderService::new(db.clone(), event_sender.clone())),
            users: Arc::new(UserService::new(db, event_sender)),
        }
    }
}
