use crate::entities::{book, category};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        input: CategoryInput,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;

        let category = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
        };
        let category = category.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryCreated(category.id));
        info!(category_id = %category.id, "Category created");

        Ok(category)
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, category_id: Uuid) -> Result<category::Model, ServiceError> {
        self.get_model(category_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<category::Model>, u64), ServiceError> {
        let paginator = category::Entity::find().paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let categories = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((categories, total))
    }

    #[instrument(skip(self))]
    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: CategoryInput,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;

        let category = self.get_model(category_id).await?;

        let mut active: category::ActiveModel = category.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        let category = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryUpdated(category_id));
        info!(category_id = %category_id, "Category updated");

        Ok(category)
    }

    /// Deletes a category. Book links are removed by the cascading
    /// foreign key; the books themselves stay.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, category_id: Uuid) -> Result<(), ServiceError> {
        let category = self.get_model(category_id).await?;
        category.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryDeleted(category_id));
        info!(category_id = %category_id, "Category deleted");

        Ok(())
    }

    /// Paged listing of the live books attached to a category.
    #[instrument(skip(self))]
    pub async fn books_in_category(
        &self,
        category_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<book::Model>, u64), ServiceError> {
        let category = self.get_model(category_id).await?;

        let paginator = category
            .find_related(book::Entity)
            .filter(book::Column::IsDeleted.eq(false))
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let books = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((books, total))
    }

    async fn get_model(&self, category_id: Uuid) -> Result<category::Model, ServiceError> {
        category::Entity::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", category_id)))
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CategoryInput {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
}
