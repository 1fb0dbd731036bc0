//! Image upload validation and multipart product creation.
//!
//! Requirements:
//! - API server running (default `http://localhost:3000`, or `BAZAAR_BASE_URL`)
//! - `BAZAAR_AUTH_RATE_LIMIT=false`

use bazaar_integration_tests::{TestClient, error_message, unique};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

/// Smallest valid GIF.
const PIXEL_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";

fn image_part(bytes: Vec<u8>, mime: &str) -> Part {
    Part::bytes(bytes)
        .file_name("pixel.gif")
        .mime_str(mime)
        .expect("Invalid MIME type")
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_upload_returns_data_url() {
    let client = TestClient::authenticated().await;
    let form = Form::new().part("file", image_part(PIXEL_GIF.to_vec(), "image/gif"));

    let resp = client
        .post("/api/upload/image")
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Image uploaded successfully");
    assert!(
        body["imageUrl"]
            .as_str()
            .is_some_and(|url| url.starts_with("data:image/gif;base64,"))
    );
    assert!(
        body["filename"]
            .as_str()
            .is_some_and(|name| name.ends_with(".gif"))
    );
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_upload_rejects_non_image() {
    let client = TestClient::authenticated().await;
    let form = Form::new().part("file", image_part(b"%PDF-1.4".to_vec(), "application/pdf"));

    let resp = client
        .post("/api/upload/image")
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(resp).await.starts_with("Invalid file type"));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_upload_rejects_oversized_file() {
    let client = TestClient::authenticated().await;
    let form = Form::new().part(
        "file",
        image_part(vec![0_u8; 5 * 1024 * 1024 + 1], "image/png"),
    );

    let resp = client
        .post("/api/upload/image")
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_upload_without_file() {
    let client = TestClient::authenticated().await;
    let form = Form::new().text("note", "no file here");

    let resp = client
        .post("/api/upload/image")
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "No file uploaded");
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_create_product_with_image() {
    let client = TestClient::authenticated().await;
    let category = client.create_category().await;
    let category_id = category["id"].as_str().expect("Category has no id");
    let form = Form::new()
        .text("name", unique("Poster "))
        .text("price", "7.50")
        .text("stock", "4")
        .text("categoryId", category_id.to_owned())
        .part("image", image_part(PIXEL_GIF.to_vec(), "image/gif"));

    let resp = client
        .post("/api/products/with-image")
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["price"], "7.50");
    assert!(
        body["imageUrl"]
            .as_str()
            .is_some_and(|url| url.starts_with("data:image/gif;base64,"))
    );
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_create_product_with_image_validates_fields() {
    let client = TestClient::authenticated().await;
    let form = Form::new()
        .text("name", "Poster")
        .text("price", "free")
        .text("stock", "4")
        .text("categoryId", "not-a-uuid");

    let resp = client
        .post("/api/products/with-image")
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(resp).await,
        "Price must be a valid positive number"
    );
}
