//! Image upload validation and inline encoding.
//!
//! Images are not written to disk or object storage. An accepted file is
//! turned into a `data:` URI that is stored directly in `product.image_url`.

use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use bazaar_core::{ImageMimeType, MAX_IMAGE_BYTES};

/// Length of the random part of a generated filename.
const FILENAME_RANDOM_LEN: usize = 13;

/// Reasons an upload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Invalid file type. Only JPEG, PNG, GIF, and WebP images are allowed.")]
    InvalidType,

    #[error("File size too large. Maximum size is 5MB.")]
    TooLarge,
}

/// A file part read from a multipart request.
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// Client-supplied file name, if any.
    pub file_name: Option<String>,
    /// Declared `Content-Type` of the part.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// An accepted image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime: ImageMimeType,
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
    /// Generated unique name, keeping the original extension.
    pub filename: String,
}

/// Validate an uploaded image and encode it as a data URI.
///
/// # Errors
///
/// Returns `UploadError::InvalidType` if the declared content type is not on
/// the whitelist and `UploadError::TooLarge` if the file exceeds 5 MB.
pub fn encode_image(file: &ImageFile) -> Result<EncodedImage, UploadError> {
    let mime = file
        .content_type
        .as_deref()
        .and_then(|ct| ct.parse::<ImageMimeType>().ok())
        .ok_or(UploadError::InvalidType)?;

    if file.bytes.len() > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge);
    }

    let data_url = format!("data:{mime};base64,{}", STANDARD.encode(&file.bytes));
    let filename = unique_filename(file.file_name.as_deref());

    tracing::debug!(%mime, size = file.bytes.len(), %filename, "image encoded");

    Ok(EncodedImage {
        mime,
        data_url,
        filename,
    })
}

/// Build `<unix-millis>-<13 base36 chars><ext>`.
fn unique_filename(original: Option<&str>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..FILENAME_RANDOM_LEN)
        .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
        .collect();

    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    format!("{}-{suffix}{ext}", Utc::now().timestamp_millis())
}
