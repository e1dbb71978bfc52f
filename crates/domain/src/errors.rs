use thiserror::Error;

/// Errors from tick/price conversions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MathError {
    /// Conversion between tick and price overflowed the decimal type.
    #[error("overflow converting between tick and price")]
    Overflow,
    /// A price at or below zero has no tick representation.
    #[error("price must be positive")]
    NonPositivePrice,
}
