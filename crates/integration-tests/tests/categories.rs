//! Category CRUD and the in-use delete guard.
//!
//! Requirements:
//! - API server running (default `http://localhost:3000`, or `BAZAAR_BASE_URL`)

use bazaar_integration_tests::{TestClient, error_message, unique};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_create_and_show_category() {
    let client = TestClient::anonymous();
    let created = client.create_category().await;
    let id = created["id"].as_str().expect("Category has no id");

    assert_eq!(created["productCount"], 0);

    let resp = client
        .get(&format!("/api/categories/{id}"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["name"], created["name"]);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_duplicate_name_is_conflict() {
    let client = TestClient::anonymous();
    let created = client.create_category().await;

    let resp = client
        .post("/api/categories")
        .json(&json!({"name": created["name"]}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_message(resp).await,
        "Category with this name already exists"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_update_can_clear_description() {
    let client = TestClient::anonymous();
    let created = client.create_category().await;
    let id = created["id"].as_str().expect("Category has no id");
    let renamed = unique("Renamed ");

    let resp = client
        .patch(&format!("/api/categories/{id}"))
        .json(&json!({"name": renamed, "description": null}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["name"], renamed.as_str());
    assert!(body["description"].is_null());
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_update_missing_category_is_not_found() {
    let client = TestClient::anonymous();

    let resp = client
        .patch(&format!("/api/categories/{}", Uuid::new_v4()))
        .json(&json!({"name": unique("Ghost ")}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Category not found");
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_rename_to_taken_name_is_conflict() {
    let client = TestClient::anonymous();
    let first = client.create_category().await;
    let second = client.create_category().await;
    let id = second["id"].as_str().expect("Category has no id");

    let resp = client
        .patch(&format!("/api/categories/{id}"))
        .json(&json!({"name": first["name"]}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_message(resp).await,
        "Category with this name already exists"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_delete_category_in_use_is_refused() {
    let client = TestClient::authenticated().await;
    let category = client.create_category().await;
    let category_id = category["id"].as_str().expect("Category has no id");
    client
        .create_product(category_id, &unique("Widget "), "9.99")
        .await;

    let resp = client
        .delete(&format!("/api/categories/{category_id}"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(resp).await,
        "Cannot delete category with existing products"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_delete_empty_category() {
    let client = TestClient::anonymous();
    let created = client.create_category().await;
    let id = created["id"].as_str().expect("Category has no id");

    let resp = client
        .delete(&format!("/api/categories/{id}"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(&format!("/api/categories/{id}"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Category not found");
}
