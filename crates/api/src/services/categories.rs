//! Category service.

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::CategoryId;

use super::validate_name;
use crate::db::RepositoryError;
use crate::db::categories::CategoryRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::{Category, CategoryChanges, NewCategory};

const NOT_FOUND: &str = "Category not found";
const DUPLICATE_NAME: &str = "Category with this name already exists";
const IN_USE: &str = "Cannot delete category with existing products";

/// Category CRUD.
pub struct CategoryService<'a> {
    categories: CategoryRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            categories: CategoryRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Create a category with a unique name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a short name and
    /// `AppError::Conflict` if the name is taken.
    #[instrument(skip(self, description))]
    pub async fn create(&self, name: &str, description: Option<String>) -> Result<Category> {
        let name = validate_name(name, "Name").map_err(AppError::BadRequest)?;

        if self.categories.exists_by_name(&name).await? {
            return Err(AppError::Conflict(DUPLICATE_NAME.to_string()));
        }

        let category = self
            .categories
            .create(&NewCategory { name, description })
            .await
            .map_err(map_conflict)?;

        tracing::info!(category_id = %category.id, "category created");
        Ok(category)
    }

    /// List all categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>> {
        Ok(self.categories.list().await?)
    }

    /// Get one category.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the category does not exist.
    pub async fn get(&self, id: CategoryId) -> Result<Category> {
        self.categories
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the category does not exist,
    /// `AppError::BadRequest` for a short name and `AppError::Conflict` if the
    /// new name is taken.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: CategoryId, mut changes: CategoryChanges) -> Result<Category> {
        if let Some(name) = &changes.name {
            changes.name = Some(validate_name(name, "Name").map_err(AppError::BadRequest)?);
        }

        let category = self
            .categories
            .update(id, &changes)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AppError::NotFound(NOT_FOUND.to_string()),
                other => map_conflict(other),
            })?;

        tracing::info!(category_id = %category.id, "category updated");
        Ok(category)
    }

    /// Delete a category that no product references.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the category does not exist and
    /// `AppError::BadRequest` if products still reference it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CategoryId) -> Result<()> {
        if !self.categories.exists(id).await? {
            return Err(AppError::NotFound(NOT_FOUND.to_string()));
        }

        if self.products.count_by_category(id).await? > 0 {
            return Err(AppError::BadRequest(IN_USE.to_string()));
        }

        self.categories.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(NOT_FOUND.to_string()),
            // A product was added after the count
            RepositoryError::ForeignKey(_) => AppError::BadRequest(IN_USE.to_string()),
            other => AppError::Database(other),
        })?;

        tracing::info!(category_id = %id, "category deleted");
        Ok(())
    }
}

fn map_conflict(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::Conflict(_) => AppError::Conflict(DUPLICATE_NAME.to_string()),
        other => AppError::Database(other),
    }
}
