//! Units on hand for a product.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Stock`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StockError {
    /// The input is not an integer.
    #[error("stock must be a valid integer")]
    NotAnInteger,
    /// Zero or negative.
    #[error("stock must be a positive integer")]
    NotPositive,
}

/// A strictly positive stock count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct Stock(i32);

impl Stock {
    /// Validate a stock count.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::NotPositive`] for zero or negative counts and
    /// [`StockError::NotAnInteger`] for counts outside the `INTEGER` range.
    pub fn new(count: i64) -> Result<Self, StockError> {
        if count <= 0 {
            return Err(StockError::NotPositive);
        }
        i32::try_from(count)
            .map(Self)
            .map_err(|_| StockError::NotAnInteger)
    }

    /// Parse a stock count from text, as submitted in multipart forms.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::NotAnInteger`] for non-integer text (including
    /// `"2.5"`), or any error from [`Stock::new`].
    pub fn parse(s: &str) -> Result<Self, StockError> {
        let count = s
            .trim()
            .parse::<i64>()
            .map_err(|_| StockError::NotAnInteger)?;
        Self::new(count)
    }

    /// The count as stored.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Stock {
    type Error = StockError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stock> for i32 {
    fn from(stock: Stock) -> Self {
        stock.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Stock {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Stock {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let count = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(count))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Stock {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        assert_eq!(Stock::new(50).unwrap().get(), 50);
        assert_eq!(Stock::new(0), Err(StockError::NotPositive));
        assert_eq!(Stock::new(-3), Err(StockError::NotPositive));
        assert_eq!(
            Stock::new(i64::from(i32::MAX) + 1),
            Err(StockError::NotAnInteger)
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(Stock::parse("12").unwrap().get(), 12);
        assert_eq!(Stock::parse("2.5"), Err(StockError::NotAnInteger));
        assert_eq!(Stock::parse("ten"), Err(StockError::NotAnInteger));
        assert_eq!(Stock::parse("0"), Err(StockError::NotPositive));
    }

    #[test]
    fn test_deserialize_rejects_fractions() {
        assert!(serde_json::from_str::<Stock>("5").is_ok());
        assert!(serde_json::from_str::<Stock>("5.5").is_err());
        assert!(serde_json::from_str::<Stock>("-1").is_err());
    }
}
