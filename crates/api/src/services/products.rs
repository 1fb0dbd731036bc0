//! Product service.

use sqlx::PgPool;
use tracing::instrument;

use bazaar_core::{CategoryId, Pagination, ProductId};

use super::validate_name;
use crate::db::RepositoryError;
use crate::db::categories::CategoryRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::{NewProduct, Product, ProductChanges, ProductFilter, ProductPage, SearchResult};

const NOT_FOUND: &str = "Product not found";
const CATEGORY_NOT_FOUND: &str = "Category not found";

/// Product CRUD, listing and search.
pub struct ProductService<'a> {
    products: ProductRepository<'a>,
    categories: CategoryRepository<'a>,
}

impl<'a> ProductService<'a> {
    /// Create a new product service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
            categories: CategoryRepository::new(pool),
        }
    }

    /// Create a product in an existing category.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a short name or a missing category.
    #[instrument(skip(self, product), fields(category_id = %product.category_id))]
    pub async fn create(&self, mut product: NewProduct) -> Result<Product> {
        product.name = validate_name(&product.name, "Name").map_err(AppError::BadRequest)?;
        self.require_category(product.category_id).await?;

        let product = self
            .products
            .create(&product)
            .await
            .map_err(map_write_error)?;

        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// List one page of products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<ProductPage> {
        let (products, total) = self.products.list(filter).await?;
        Ok(ProductPage {
            products,
            pagination: Pagination::new(filter.page, total),
        })
    }

    /// Case-insensitive search over name and description.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an empty or blank query.
    pub async fn search(&self, query: &str) -> Result<SearchResult> {
        let query = search_term(query)?;
        let products = self.products.search(&query).await?;
        tracing::debug!(%query, count = products.len(), "product search");
        Ok(SearchResult {
            count: products.len(),
            products,
            query,
        })
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    pub async fn get(&self, id: ProductId) -> Result<Product> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a short name or a missing new
    /// category, and `AppError::NotFound` if the product does not exist.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: ProductId, mut changes: ProductChanges) -> Result<Product> {
        if let Some(name) = &changes.name {
            changes.name = Some(validate_name(name, "Name").map_err(AppError::BadRequest)?);
        }
        if let Some(category_id) = changes.category_id {
            self.require_category(category_id).await?;
        }

        let product = self
            .products
            .update(id, &changes)
            .await
            .map_err(map_write_error)?;

        tracing::info!(product_id = %product.id, "product updated");
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<()> {
        self.products.delete(id).await.map_err(map_write_error)?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    async fn require_category(&self, id: CategoryId) -> Result<()> {
        if self.categories.exists(id).await? {
            Ok(())
        } else {
            Err(AppError::BadRequest(CATEGORY_NOT_FOUND.to_string()))
        }
    }
}

fn map_write_error(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(NOT_FOUND.to_string()),
        // The category was removed between the check and the write
        RepositoryError::ForeignKey(_) => AppError::BadRequest(CATEGORY_NOT_FOUND.to_string()),
        other => AppError::Database(other),
    }
}

/// Trim a search query, rejecting one with nothing left.
fn search_term(query: &str) -> Result<String> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest(
            "Search query must not be empty".to_string(),
        ));
    }
    Ok(query.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term_is_trimmed() {
        assert_eq!(search_term("  laptop ").unwrap(), "laptop");
    }

    #[test]
    fn test_blank_search_term_is_rejected() {
        for query in ["", "   ", "\t\n"] {
            let err = search_term(query).unwrap_err();
            assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
            assert_eq!(
                err.to_string(),
                "Bad request: Search query must not be empty"
            );
        }
    }
}
