//! Accepted product image formats.

use core::fmt;
use std::str::FromStr;

/// Largest accepted image, in bytes (5 MB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An image MIME type on the upload whitelist.
///
/// `image/jpg` is not a registered type but browsers and some clients send
/// it, so it is accepted and echoed back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMimeType {
    Jpeg,
    Jpg,
    Png,
    Gif,
    Webp,
}

impl ImageMimeType {
    /// Every accepted type, in the order they are advertised.
    pub const ALL: [Self; 5] = [Self::Jpeg, Self::Jpg, Self::Png, Self::Gif, Self::Webp];

    /// The MIME string as it appears in a `Content-Type` header.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Jpg => "image/jpg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

impl fmt::Display for ImageMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageMimeType {
    type Err = String;

    /// Match a `Content-Type` value, ignoring parameters and case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or_default().trim();
        Self::ALL
            .into_iter()
            .find(|mime| mime.as_str().eq_ignore_ascii_case(essence))
            .ok_or_else(|| format!("unsupported image type: {s}"))
    }
}
