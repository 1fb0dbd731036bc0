//! Category repository for database operations.

use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use bazaar_core::CategoryId;

use super::RepositoryError;
use crate::models::category::{Category, CategoryChanges, NewCategory};

/// Columns selected for a [`Category`], including the live product count.
const CATEGORY_COLUMNS: &str = r"
    c.id, c.name, c.description, c.created_at, c.updated_at,
    (SELECT COUNT(*) FROM shop.product p WHERE p.category_id = c.id) AS product_count
";

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM shop.category c ORDER BY c.name ASC");
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(categories)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM shop.category c WHERE c.id = $1");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(category)
    }

    /// Check whether a category exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM shop.category WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Check whether a category with this exact name exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM shop.category WHERE name = $1)")
                .bind(name)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, category: &NewCategory) -> Result<Category, RepositoryError> {
        Self::insert(self.pool, category).await
    }

    /// Insert a category through any executor, such as an open transaction.
    ///
    /// # Errors
    ///
    /// Same as [`CategoryRepository::create`].
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        category: &NewCategory,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            INSERT INTO shop.category (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at, 0::BIGINT AS product_count
            ",
        )
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(executor)
        .await
        .map_err(RepositoryError::from_write)
    }

    /// Apply a partial update.
    ///
    /// An empty change set still bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        changes: &CategoryChanges,
    ) -> Result<Category, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("WITH updated AS (UPDATE shop.category SET updated_at = NOW()");

        if let Some(name) = &changes.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(description) = &changes.description {
            builder.push(", description = ").push_bind(description);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING *) SELECT ")
            .push(CATEGORY_COLUMNS)
            .push(" FROM updated c");

        builder
            .build_query_as::<Category>()
            .fetch_optional(self.pool)
            .await
            .map_err(RepositoryError::from_write)?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::ForeignKey` if products still reference it.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
