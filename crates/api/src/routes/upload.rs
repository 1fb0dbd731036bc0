//! Image upload handler and shared multipart helpers.

use axum::{
    Json,
    extract::multipart::{Field, Multipart, MultipartError, MultipartRejection},
    http::StatusCode,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::upload::{ImageFile, UploadError, encode_image};

/// Body limit for routes that accept an image: the 5 MB file plus form overhead.
pub const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// Successful upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: &'static str,
    /// `data:` URI to store as a product's `imageUrl`.
    pub image_url: String,
    pub filename: String,
}

/// `POST /api/upload/image`
///
/// Expects the image in the multipart field `file`.
pub async fn image(
    RequireAuth(user): RequireAuth,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let mut multipart = multipart?;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            file = read_image(field).await?;
        }
    }

    let file = file.ok_or(UploadError::NoFile)?;
    let encoded = encode_image(&file)?;

    tracing::info!(
        user_id = %user.id,
        mime = %encoded.mime,
        size = file.bytes.len(),
        "image uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Image uploaded successfully",
            image_url: encoded.data_url,
            filename: encoded.filename,
        }),
    ))
}

/// Read a file part. An empty part without a file name counts as no file,
/// which is what browsers send for an untouched file input.
pub(super) async fn read_image(field: Field<'_>) -> Result<Option<ImageFile>> {
    let file_name = field
        .file_name()
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned);
    let content_type = field.content_type().map(ToOwned::to_owned);
    let bytes = field.bytes().await.map_err(multipart_error)?;

    if file_name.is_none() && bytes.is_empty() {
        return Ok(None);
    }

    Ok(Some(ImageFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    }))
}

/// Map a multipart read failure; hitting the body limit means the file was too big.
pub(super) fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Upload(UploadError::TooLarge)
    } else {
        AppError::BadRequest(err.body_text())
    }
}
