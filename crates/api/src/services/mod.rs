//! Business logic between route handlers and repositories.

pub mod auth;
pub mod categories;
pub mod products;
pub mod upload;

/// Shortest accepted category or product name, after trimming.
pub const MIN_NAME_LENGTH: usize = 2;

/// Trim a display name and check its length.
///
/// # Errors
///
/// Returns a client-facing message naming `field` if the trimmed name is too short.
pub fn validate_name(name: &str, field: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_NAME_LENGTH {
        return Err(format!(
            "{field} must be at least {MIN_NAME_LENGTH} characters long"
        ));
    }
    Ok(trimmed.to_owned())
}
