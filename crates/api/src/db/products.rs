//! Product repository for database operations.
//!
//! Every query joins `shop.category` so products come back with their
//! category embedded.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use bazaar_core::{CategoryId, Price, ProductId, Stock};

use super::{RepositoryError, escape_like};
use crate::models::category::CategorySummary;
use crate::models::product::{NewProduct, Product, ProductChanges, ProductFilter};

const PRODUCT_COLUMNS: &str = r"
    p.id, p.name, p.description, p.price, p.stock, p.image_url, p.category_id,
    p.created_at, p.updated_at,
    c.name AS category_name, c.description AS category_description
";

const NEWEST_FIRST: &str = " ORDER BY p.created_at DESC, p.id DESC";

/// Flat product row as returned by the join.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: Option<String>,
    price: Price,
    stock: Stock,
    image_url: Option<String>,
    category_id: CategoryId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: String,
    category_description: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            image_url: row.image_url,
            category_id: row.category_id,
            category: CategorySummary {
                id: row.category_id,
                name: row.category_name,
                description: row.category_description,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product p \
             JOIN shop.category c ON c.id = p.category_id WHERE p.id = $1"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    /// List one page of products matching the filter, newest first.
    ///
    /// Returns the page and the total number of matching products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        let mut count_query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM shop.product p");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut page_query: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        page_query
            .push(PRODUCT_COLUMNS)
            .push(" FROM shop.product p JOIN shop.category c ON c.id = p.category_id");
        push_filters(&mut page_query, filter);
        page_query
            .push(NEWEST_FIRST)
            .push(" LIMIT ")
            .push_bind(i64::from(filter.page.limit()))
            .push(" OFFSET ")
            .push_bind(filter.page.offset());

        let rows = page_query
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        let total = u64::try_from(total)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative count: {total}")))?;

        Ok((rows.into_iter().map(Product::from).collect(), total))
    }

    /// Case-insensitive substring search over name and description, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<Product>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(term));
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product p \
             JOIN shop.category c ON c.id = p.category_id \
             WHERE p.name ILIKE $1 OR p.description ILIKE $1{NEWEST_FIRST}"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(pattern)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Count products filed under a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_category(&self, category_id: CategoryId) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shop.product WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ForeignKey` if the category does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        Self::insert(self.pool, product).await
    }

    /// Insert a product through any executor, such as an open transaction.
    ///
    /// # Errors
    ///
    /// Same as [`ProductRepository::create`].
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "WITH p AS ( \
                INSERT INTO shop.product (name, description, price, stock, image_url, category_id) \
                VALUES ($1, $2, $3, $4, $5, $6) \
                RETURNING * \
             ) \
             SELECT {PRODUCT_COLUMNS} FROM p JOIN shop.category c ON c.id = p.category_id"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.stock)
            .bind(&product.image_url)
            .bind(product.category_id)
            .fetch_one(executor)
            .await
            .map_err(RepositoryError::from_write)?;
        Ok(row.into())
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::ForeignKey` if the new category does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("WITH p AS (UPDATE shop.product SET updated_at = NOW()");

        if let Some(name) = &changes.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(description) = &changes.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(price) = changes.price {
            builder.push(", price = ").push_bind(price);
        }
        if let Some(stock) = changes.stock {
            builder.push(", stock = ").push_bind(stock);
        }
        if let Some(image_url) = &changes.image_url {
            builder.push(", image_url = ").push_bind(image_url);
        }
        if let Some(category_id) = changes.category_id {
            builder.push(", category_id = ").push_bind(category_id);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING *) SELECT ")
            .push(PRODUCT_COLUMNS)
            .push(" FROM p JOIN shop.category c ON c.id = p.category_id");

        builder
            .build_query_as::<ProductRow>()
            .fetch_optional(self.pool)
            .await
            .map_err(RepositoryError::from_write)?
            .map(Product::from)
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Append the `WHERE` clause for a listing filter.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    builder.push(" WHERE TRUE");

    if let Some(category_id) = filter.category_id {
        builder.push(" AND p.category_id = ").push_bind(category_id);
    }
    if let Some(min_price) = filter.min_price {
        builder.push(" AND p.price >= ").push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        builder.push(" AND p.price <= ").push_bind(max_price);
    }
}
