//! Core types for Bazaar.
//!
//! Every type here validates on construction, so a value that exists is a
//! value the API is willing to store.

pub mod email;
pub mod id;
pub mod image;
pub mod pagination;
pub mod price;
pub mod stock;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use image::{ImageMimeType, MAX_IMAGE_BYTES};
pub use pagination::{PageRequest, Pagination, PaginationError};
pub use price::{Price, PriceError};
pub use stock::{Stock, StockError};
pub use username::{Username, UsernameError};
