//! Product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{CategoryId, PageRequest, Pagination, Price, ProductId, Stock};

use super::category::CategorySummary;

/// A catalog product with its category embedded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: Stock,
    /// Either a data URI or an external URL supplied by the client.
    pub image_url: Option<String>,
    pub category_id: CategoryId,
    pub category: CategorySummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated product ready to insert.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: Stock,
    pub image_url: Option<String>,
    pub category_id: CategoryId,
}

/// A validated partial update.
///
/// For the nullable columns, `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Price>,
    pub stock: Option<Stock>,
    pub image_url: Option<Option<String>>,
    pub category_id: Option<CategoryId>,
}

/// Filters for the product listing. Price bounds are inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub page: PageRequest,
}

/// One page of the product listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

/// Result of a free-text product search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub products: Vec<Product>,
    /// The search term as submitted.
    pub query: String,
    pub count: usize,
}
