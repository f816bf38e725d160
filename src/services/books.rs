use crate::db::book_filter::{compose, BookSearchParams};
use crate::entities::{book, book_category, category};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Catalog service for books.
///
/// Deletion is always a soft delete: removed books stay in storage with
/// `is_deleted = true` so order items can keep referencing them.
#[derive(Clone)]
pub struct BookService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl BookService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a book together with its category links.
    ///
    /// # Arguments
    ///
    /// * `input` - Title, author, ISBN, price and the category ids to attach.
    ///
    /// # Returns
    ///
    /// The created book with its category ids, or `Conflict` when the ISBN
    /// is already taken by a live book.
    #[instrument(skip(self))]
    pub async fn create_book(&self, input: CreateBookInput) -> Result<BookDetails, ServiceError> {
        input.validate()?;

        let txn = self.db.begin().await?;

        self.ensure_isbn_free(&txn, &input.isbn, None).await?;
        self.ensure_categories_exist(&txn, &input.category_ids).await?;

        let book = book::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            author: Set(input.author),
            isbn: Set(input.isbn),
            price: Set(input.price),
            description: Set(input.description),
            cover_image: Set(input.cover_image),
            is_deleted: Set(false),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let book = book.insert(&txn).await?;

        Self::link_categories(&txn, book.id, &input.category_ids).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::BookCreated(book.id));
        info!(book_id = %book.id, "Book created");

        self.get_book(book.id).await
    }

    /// Fetches a live book with its category ids, or `NotFound`.
    #[instrument(skip(self))]
    pub async fn get_book(&self, book_id: Uuid) -> Result<BookDetails, ServiceError> {
        let book = self.get_live_model(&*self.db, book_id).await?;
        let category_ids = book
            .find_related(category::Entity)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        Ok(BookDetails { book, category_ids })
    }

    /// Paged listing of live books, each with its category ids.
    #[instrument(skip(self))]
    pub async fn list_books(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<BookDetails>, u64), ServiceError> {
        let paginator = book::Entity::find()
            .filter(book::Column::IsDeleted.eq(false))
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let books = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut details = Vec::with_capacity(books.len());
        for book in books {
            let category_ids = book
                .find_related(category::Entity)
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect();
            details.push(BookDetails { book, category_ids });
        }

        Ok((details, total))
    }

    /// Searches live books with the combined filter set.
    ///
    /// Every present filter narrows the result; an all-empty filter set
    /// returns the unfiltered listing.
    #[instrument(skip(self))]
    pub async fn search_books(
        &self,
        params: BookSearchParams,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<book::Model>, u64), ServiceError> {
        let condition = Condition::all()
            .add(book::Column::IsDeleted.eq(false))
            .add(compose(params.into_filters()));

        let paginator = book::Entity::find()
            .filter(condition)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let books = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((books, total))
    }

    /// Replaces a book's fields and its category links.
    #[instrument(skip(self))]
    pub async fn update_book(
        &self,
        book_id: Uuid,
        input: UpdateBookInput,
    ) -> Result<BookDetails, ServiceError> {
        input.validate()?;

        let txn = self.db.begin().await?;

        let book = self.get_live_model(&txn, book_id).await?;
        self.ensure_isbn_free(&txn, &input.isbn, Some(book_id)).await?;
        self.ensure_categories_exist(&txn, &input.category_ids).await?;

        let mut active: book::ActiveModel = book.into();
        active.title = Set(input.title);
        active.author = Set(input.author);
        active.isbn = Set(input.isbn);
        active.price = Set(input.price);
        active.description = Set(input.description);
        active.cover_image = Set(input.cover_image);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&txn).await?;

        book_category::Entity::delete_many()
            .filter(book_category::Column::BookId.eq(book_id))
            .exec(&txn)
            .await?;
        Self::link_categories(&txn, book_id, &input.category_ids).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::BookUpdated(book_id));
        info!(book_id = %book_id, "Book updated");

        self.get_book(book_id).await
    }

    /// Soft-deletes a book. Order items referencing it are untouched.
    #[instrument(skip(self))]
    pub async fn delete_book(&self, book_id: Uuid) -> Result<(), ServiceError> {
        let book = self.get_live_model(&*self.db, book_id).await?;

        let mut active: book::ActiveModel = book.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::BookDeleted(book_id));
        info!(book_id = %book_id, "Book soft-deleted");

        Ok(())
    }

    pub(crate) async fn get_live_model<C: ConnectionTrait>(
        &self,
        conn: &C,
        book_id: Uuid,
    ) -> Result<book::Model, ServiceError> {
        book::Entity::find_by_id(book_id)
            .filter(book::Column::IsDeleted.eq(false))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Book {} not found", book_id)))
    }

    async fn ensure_isbn_free<C: ConnectionTrait>(
        &self,
        conn: &C,
        isbn: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = book::Entity::find()
            .filter(book::Column::Isbn.eq(isbn))
            .filter(book::Column::IsDeleted.eq(false));
        if let Some(id) = exclude {
            query = query.filter(book::Column::Id.ne(id));
        }
        let taken = query.count(conn).await? > 0;
        if taken {
            return Err(ServiceError::Conflict(format!(
                "A book with ISBN {} already exists",
                isbn
            )));
        }
        Ok(())
    }

    async fn ensure_categories_exist<C: ConnectionTrait>(
        &self,
        conn: &C,
        category_ids: &[Uuid],
    ) -> Result<(), ServiceError> {
        if category_ids.is_empty() {
            return Ok(());
        }
        let found = category::Entity::find()
            .filter(category::Column::Id.is_in(category_ids.to_vec()))
            .count(conn)
            .await?;
        if found as usize != category_ids.len() {
            return Err(ServiceError::InvalidInput(
                "One or more category ids do not exist".to_string(),
            ));
        }
        Ok(())
    }

    async fn link_categories<C: ConnectionTrait>(
        conn: &C,
        book_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<(), ServiceError> {
        for category_id in category_ids {
            book_category::ActiveModel {
                book_id: Set(book_id),
                category_id: Set(*category_id),
            }
            .insert(conn)
            .await?;
        }
        Ok(())
    }
}

fn validate_price_not_negative(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        let mut err = ValidationError::new("price");
        err.message = Some("Price must not be negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBookInput {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "ISBN must not be empty"))]
    pub isbn: String,
    #[validate(custom = "validate_price_not_negative")]
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateBookInput {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "ISBN must not be empty"))]
    pub isbn: String,
    #[validate(custom = "validate_price_not_negative")]
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

/// A book together with the ids of the categories it belongs to.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: book::Model,
    pub category_ids: Vec<Uuid>,
}
