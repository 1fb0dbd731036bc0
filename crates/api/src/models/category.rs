//! Category domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::CategoryId;

/// A product category with the number of products filed under it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    /// Unique display name.
    pub name: String,
    pub description: Option<String>,
    /// Products currently referencing this category.
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The slice of a category embedded in every product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

/// A validated category ready to insert.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// A validated partial update.
///
/// `description: Some(None)` clears the column; `None` leaves it alone.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}
