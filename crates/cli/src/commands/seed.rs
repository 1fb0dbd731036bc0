//! Seed the catalog from a YAML file and report catalog statistics.

use std::path::Path;

use serde::Deserialize;
use sqlx::PgConnection;
use tracing::{error, info, warn};

use bazaar_api::db::{self, categories::CategoryRepository, products::ProductRepository, users::UserRepository};
use bazaar_api::models::{Category, NewCategory, NewProduct};
use bazaar_api::services::validate_name;
use bazaar_core::{Price, Stock};

use super::{CommandError, database_url};

/// Top-level catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub categories: Vec<CategorySeed>,
}

#[derive(Debug, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSeed {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: Stock,
    pub image_url: Option<String>,
}

/// Collect every validation problem in the file.
fn validate(catalog: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();

    for category in &catalog.categories {
        if let Err(e) = validate_name(&category.name, "Category name") {
            errors.push(format!("{:?}: {e}", category.name));
        }
        for product in &category.products {
            if let Err(e) = validate_name(&product.name, "Product name") {
                errors.push(format!("{} / {:?}: {e}", category.name, product.name));
            }
        }
    }

    let mut names: Vec<&str> = catalog.categories.iter().map(|c| c.name.trim()).collect();
    names.sort_unstable();
    for pair in names.windows(2) {
        if let [a, b] = pair
            && a == b
        {
            errors.push(format!("duplicate category {a:?}"));
        }
    }

    errors
}

/// Create categories and their products from a YAML file.
///
/// Categories whose name already exists are skipped along with their products.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or a database operation fails.
pub async fn catalog(file_path: &str) -> Result<(), CommandError> {
    let database_url = database_url()?;

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(Path::new(file_path))
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_owned(),
            source,
        })?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    let errors = validate(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::Invalid(errors.len()));
    }

    info!(categories = catalog.categories.len(), "Catalog validated");

    let pool = db::create_pool(&database_url).await?;
    let categories = CategoryRepository::new(&pool);

    let mut created_categories = 0_usize;
    let mut created_products = 0_usize;
    let mut skipped = 0_usize;

    for seed in catalog.categories {
        if categories.exists_by_name(seed.name.trim()).await? {
            warn!(category = %seed.name.trim(), "Category exists, skipping");
            skipped += 1;
            continue;
        }

        let mut tx = pool.begin().await?;
        let (category, products) = seed_category(&mut tx, seed).await?;
        tx.commit().await?;

        created_categories += 1;
        created_products += products;
        info!(category = %category.name, products, "Category seeded");
    }

    info!("Seeding complete!");
    info!("  Categories created: {created_categories}");
    info!("  Products created: {created_products}");
    info!("  Categories skipped (already exist): {skipped}");

    Ok(())
}

/// Insert one category and its products on `conn`.
///
/// Run inside a transaction so a failed product leaves no partial category.
async fn seed_category(
    conn: &mut PgConnection,
    seed: CategorySeed,
) -> Result<(Category, usize), CommandError> {
    let category = CategoryRepository::insert(
        &mut *conn,
        &NewCategory {
            name: seed.name.trim().to_owned(),
            description: seed.description,
        },
    )
    .await?;

    let mut created = 0_usize;
    for product in seed.products {
        ProductRepository::insert(
            &mut *conn,
            &NewProduct {
                name: product.name.trim().to_owned(),
                description: product.description,
                price: product.price,
                stock: product.stock,
                image_url: product.image_url,
                category_id: category.id,
            },
        )
        .await?;
        created += 1;
    }

    Ok((category, created))
}

/// Show catalog statistics.
///
/// # Errors
///
/// Returns an error if the database connection or a query fails.
pub async fn stats() -> Result<(), CommandError> {
    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;

    let users = UserRepository::new(&pool).count().await?;
    let categories = CategoryRepository::new(&pool).list().await?;
    let products: i64 = categories.iter().map(|c| c.product_count).sum();

    info!("Catalog Statistics");
    info!("==================");
    info!("Users: {users}");
    info!("Categories: {}", categories.len());
    info!("Products: {products}");
    info!("By category:");

    for category in categories {
        info!("  {}: {}", category.name, category.product_count);
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
categories:
  - name: Electronics
    description: Gadgets and devices
    products:
      - name: Laptop
        price: "999.99"
        stock: 50
  - name: Books
"#;

    #[test]
    fn test_parses_catalog() {
        let catalog: CatalogFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(catalog.categories.len(), 2);
        let laptop = &catalog.categories[0].products[0];
        assert_eq!(laptop.price.to_string(), "999.99");
        assert_eq!(laptop.stock.get(), 50);
        assert!(catalog.categories[1].products.is_empty());
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn test_rejects_invalid_prices_at_parse_time() {
        let yaml = "categories:\n  - name: Toys\n    products:\n      - name: Ball\n        price: \"0\"\n        stock: 1\n";
        assert!(serde_yaml::from_str::<CatalogFile>(yaml).is_err());
    }

    #[test]
    fn test_validate_reports_duplicates_and_short_names() {
        let yaml = "categories:\n  - name: Toys\n  - name: ' Toys '\n  - name: X\n";
        let catalog: CatalogFile = serde_yaml::from_str(yaml).unwrap();
        let errors = validate(&catalog);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("duplicate")));
    }

    fn unique_name(prefix: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("{prefix} {nanos}")
    }

    fn seed_with_product(name: &str) -> CategorySeed {
        CategorySeed {
            name: name.to_owned(),
            description: None,
            products: vec![ProductSeed {
                name: "Widget".to_owned(),
                description: None,
                price: Price::parse("1.00").unwrap(),
                stock: Stock::new(1).unwrap(),
                image_url: None,
            }],
        }
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL with migrations applied"]
    async fn test_seed_category_is_all_or_nothing() {
        let pool = db::create_pool(&database_url().unwrap()).await.unwrap();
        let categories = CategoryRepository::new(&pool);

        // Abandoned transaction: neither the category nor its product remain
        let name = unique_name("Rolled back");
        let mut tx = pool.begin().await.unwrap();
        let (_, products) = seed_category(&mut tx, seed_with_product(&name))
            .await
            .unwrap();
        assert_eq!(products, 1);
        tx.rollback().await.unwrap();
        assert!(!categories.exists_by_name(&name).await.unwrap());

        // Committed transaction: category arrives with its product
        let name = unique_name("Committed");
        let mut tx = pool.begin().await.unwrap();
        let (category, _) = seed_category(&mut tx, seed_with_product(&name))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        let stored = categories.get_by_id(category.id).await.unwrap().unwrap();
        assert_eq!(stored.product_count, 1);
    }

    #[test]
    fn test_bundled_catalog_is_valid() {
        let content = include_str!("../../seed/catalog.yaml");
        let catalog: CatalogFile = serde_yaml::from_str(content).unwrap();
        assert!(validate(&catalog).is_empty());
    }
}
