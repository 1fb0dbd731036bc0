//! Product CRUD, listing, search and multipart creation handlers.
//!
//! Every handler requires a bearer token.

use std::collections::HashMap;

use axum::{
    Json,
    extract::State,
    extract::multipart::{Multipart, MultipartRejection},
    http::StatusCode,
};
use serde::Deserialize;

use bazaar_core::{CategoryId, PageRequest, Price, ProductId, Stock};

use super::MessageResponse;
use super::upload::{multipart_error, read_image};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery, nullable};
use crate::middleware::RequireAuth;
use crate::models::{NewProduct, Product, ProductChanges, ProductFilter, ProductPage, SearchResult};
use crate::services::products::ProductService;
use crate::services::upload::encode_image;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: Stock,
    pub image_url: Option<String>,
    pub category_id: CategoryId,
}

/// Partial update; `null` clears `description` and `imageUrl`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub price: Option<Price>,
    pub stock: Option<Stock>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
    pub category_id: Option<CategoryId>,
}

/// Listing filters and pagination.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// `GET /api/products`
pub async fn index(
    State(state): State<AppState>,
    _auth: RequireAuth,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ProductPage>> {
    let page = PageRequest::new(query.page, query.limit)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let filter = ProductFilter {
        category_id: query.category_id,
        min_price: query.min_price,
        max_price: query.max_price,
        page,
    };

    let page = ProductService::new(state.pool()).list(&filter).await?;
    Ok(Json(page))
}

/// `GET /api/products/search?q=`
pub async fn search(
    State(state): State<AppState>,
    _auth: RequireAuth,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<SearchResult>> {
    let result = ProductService::new(state.pool()).search(&query.q).await?;
    Ok(Json(result))
}

/// `POST /api/products`
pub async fn create(
    State(state): State<AppState>,
    _auth: RequireAuth,
    ApiJson(body): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = NewProduct {
        name: body.name,
        description: body.description,
        price: body.price,
        stock: body.stock,
        image_url: body.image_url,
        category_id: body.category_id,
    };

    let product = ProductService::new(state.pool()).create(product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `POST /api/products/with-image`
///
/// Multipart form with text fields `name`, `description`, `price`, `stock`,
/// `categoryId` and an optional file field `image`.
pub async fn create_with_image(
    State(state): State<AppState>,
    _auth: RequireAuth,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let mut multipart = multipart?;
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        if name == "image" {
            image = read_image(field).await?;
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            fields.insert(name, value);
        }
    }

    let image_url = image
        .map(|file| encode_image(&file))
        .transpose()?
        .map(|encoded| encoded.data_url);

    let product = parse_product_form(&fields, image_url)?;
    let product = ProductService::new(state.pool()).create(product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /api/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    _auth: RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductService::new(state.pool()).get(id).await?;
    Ok(Json(product))
}

/// `PATCH /api/products/{id}`
pub async fn update(
    State(state): State<AppState>,
    _auth: RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let changes = ProductChanges {
        name: body.name,
        description: body.description,
        price: body.price,
        stock: body.stock,
        image_url: body.image_url,
        category_id: body.category_id,
    };

    let product = ProductService::new(state.pool()).update(id, changes).await?;
    Ok(Json(product))
}

/// `DELETE /api/products/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    _auth: RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<MessageResponse>> {
    ProductService::new(state.pool()).delete(id).await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

/// Turn the text fields of a multipart product form into a [`NewProduct`].
fn parse_product_form(
    fields: &HashMap<String, String>,
    image_url: Option<String>,
) -> Result<NewProduct> {
    let required = |key: &str, label: &str| {
        fields
            .get(key)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("{label} is required")))
    };

    let name = required("name", "Name")?.clone();
    let price = Price::parse(required("price", "Price")?)
        .map_err(|_| AppError::BadRequest("Price must be a valid positive number".to_string()))?;
    let stock = Stock::parse(required("stock", "Stock")?)
        .map_err(|_| AppError::BadRequest("Stock must be a valid positive integer".to_string()))?;
    let category_id = CategoryId::parse(required("categoryId", "Category ID")?.trim())
        .map_err(|_| AppError::BadRequest("Category ID must be a valid UUID".to_string()))?;
    let description = fields
        .get("description")
        .filter(|value| !value.is_empty())
        .cloned();

    Ok(NewProduct {
        name,
        description,
        price,
        stock,
        image_url,
        category_id,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    const CATEGORY: &str = "5f0c6f8e-8b7a-4c1e-9d2f-3a4b5c6d7e8f";

    #[test]
    fn test_parse_product_form() {
        let fields = form(&[
            ("name", "Laptop"),
            ("price", "999.99"),
            ("stock", "50"),
            ("categoryId", CATEGORY),
        ]);
        let product = parse_product_form(&fields, Some("data:image/png;base64,AA==".into())).unwrap();

        assert_eq!(product.name, "Laptop");
        assert_eq!(product.price.to_string(), "999.99");
        assert_eq!(product.stock.get(), 50);
        assert_eq!(product.category_id.to_string(), CATEGORY);
        assert!(product.description.is_none());
        assert!(product.image_url.is_some());
    }

    #[test]
    fn test_parse_product_form_rejects_bad_numbers() {
        let bad_price = form(&[
            ("name", "Laptop"),
            ("price", "free"),
            ("stock", "5"),
            ("categoryId", CATEGORY),
        ]);
        let err = parse_product_form(&bad_price, None).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Price must be a valid positive number");

        let bad_stock = form(&[
            ("name", "Laptop"),
            ("price", "10"),
            ("stock", "2.5"),
            ("categoryId", CATEGORY),
        ]);
        let err = parse_product_form(&bad_stock, None).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Stock must be a valid positive integer");
    }

    #[test]
    fn test_parse_product_form_requires_fields() {
        let err = parse_product_form(&form(&[("name", "Laptop")]), None).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Price is required");
    }

    #[test]
    fn test_update_request_nullable_fields() {
        let body: UpdateProductRequest =
            serde_json::from_str(r#"{"imageUrl": null, "price": "12.50"}"#).unwrap();
        assert_eq!(body.image_url, Some(None));
        assert_eq!(body.description, None);
        assert_eq!(body.price.unwrap().to_string(), "12.50");
    }

    #[test]
    fn test_search_query_defaults_to_empty() {
        let uri: axum::http::Uri = "/api/products/search".parse().unwrap();
        let axum::extract::Query(query) =
            axum::extract::Query::<SearchQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.q, "");
    }

    #[test]
    fn test_create_request_rejects_invalid_price() {
        let result = serde_json::from_str::<CreateProductRequest>(&format!(
            r#"{{"name":"Laptop","price":-1,"stock":1,"categoryId":"{CATEGORY}"}}"#
        ));
        assert!(result.is_err());
    }
}
