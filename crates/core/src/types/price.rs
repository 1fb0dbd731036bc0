//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(12, 2)`, so a valid price is strictly
//! positive, has at most two fractional digits and fits in ten integer digits.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a valid number")]
    NotANumber,
    /// Zero or negative.
    #[error("price must be a positive number")]
    NotPositive,
    /// More than two fractional digits.
    #[error("price must have at most {max} decimal places")]
    TooPrecise {
        /// Maximum fractional digits.
        max: u32,
    },
    /// Larger than [`Price::max_value`].
    #[error("price must not exceed {max}")]
    TooLarge {
        /// Largest accepted price.
        max: Decimal,
    },
}

/// A positive monetary amount in the store's currency.
///
/// Serializes as a decimal string (`"999.99"`); deserializes from either a
/// JSON string or a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Fractional digits kept by the store.
    pub const SCALE: u32 = 2;

    /// Largest price the `NUMERIC(12, 2)` column holds.
    #[must_use]
    pub fn max_value() -> Decimal {
        Decimal::new(999_999_999_999, Self::SCALE)
    }

    /// Validate a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the amount is not positive, has more than
    /// two decimal places, or exceeds [`Price::max_value`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise { max: Self::SCALE });
        }
        let max = Self::max_value();
        if amount > max {
            return Err(PriceError::TooLarge { max });
        }
        Ok(Self(amount))
    }

    /// Parse a price from text, as submitted in multipart forms.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotANumber`] if the text is not a decimal, or any
    /// error from [`Price::new`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::NotANumber)?;
        Self::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
