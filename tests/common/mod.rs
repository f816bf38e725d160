use bookstore_api::entities::book;
use bookstore_api::events::{Event, EventSender};
use bookstore_api::handlers::AppServices;
use bookstore_api::migrator::Migrator;
use bookstore_api::services::books::{BookDetails, CreateBookInput};
use bookstore_api::services::users::{RegisterInput, UserResponse};
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Shared test harness: an in-memory database with the full schema
/// applied and the services wired against it.
pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
    // Kept alive so event sends never hit a closed channel.
    _event_rx: mpsc::Receiver<Event>,
}

pub async fn setup() -> TestApp {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");

    let db = Arc::new(db);
    let (tx, rx) = mpsc::channel(64);
    let event_sender = Arc::new(EventSender::new(tx));
    let services = AppServices::new(db.clone(), event_sender);

    TestApp {
        db,
        services,
        _event_rx: rx,
    }
}

#[allow(dead_code)]
pub async fn register_user(app: &TestApp, email: &str) -> UserResponse {
    app.services
        .users
        .register(RegisterInput {
            email: email.to_string(),
            password: "correct-horse-battery".to_string(),
            repeat_password: "correct-horse-battery".to_string(),
            first_name: "Test".to_string(),
            last_name: "Reader".to_string(),
            shipping_address: Some("123 Main St".to_string()),
        })
        .await
        .expect("register user")
}

#[allow(dead_code)]
pub async fn seed_book(
    app: &TestApp,
    title: &str,
    author: &str,
    isbn: &str,
    price: Decimal,
) -> BookDetails {
    seed_book_in_categories(app, title, author, isbn, price, Vec::new()).await
}

#[allow(dead_code)]
pub async fn seed_book_in_categories(
    app: &TestApp,
    title: &str,
    author: &str,
    isbn: &str,
    price: Decimal,
    category_ids: Vec<Uuid>,
) -> BookDetails {
    app.services
        .books
        .create_book(CreateBookInput {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            price,
            description: None,
            cover_image: None,
            category_ids,
        })
        .await
        .expect("seed book")
}

#[allow(dead_code)]
pub fn titles_of(books: &[book::Model]) -> Vec<&str> {
    books.iter().map(|b| b.title.as_str()).collect()
}
