//! Domain models returned by repositories and serialized in responses.

pub mod category;
pub mod product;
pub mod user;

pub use category::{Category, CategoryChanges, CategorySummary, NewCategory};
pub use product::{NewProduct, Product, ProductChanges, ProductFilter, ProductPage, SearchResult};
pub use user::User;
