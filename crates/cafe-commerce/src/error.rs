//! Storefront error types.

use thiserror::Error;

/// Errors that can occur in pricing and order operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorefrontError {
    /// Amount exceeds the range where decimal math stays exact.
    #[error("Amount too large for exact currency math")]
    AmountTooLarge,

    /// Input could not be read as a decimal amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Division by a zero-valued divisor.
    #[error("Division by zero")]
    DivideByZero,

    /// Percentage outside the accepted range.
    #[error("Invalid percentage: {0} (must be within 0.0001..=100)")]
    InvalidPercentage(f64),

    /// Serialized currency payload did not match the wire format.
    #[error("Invalid currency payload: {0}")]
    InvalidPayload(String),

    /// Record not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Mutation attempted against an order that already left `pending`.
    #[error("Order is not pending (status: {0})")]
    OrderNotPending(String),

    /// Two currency values of different kinds were combined.
    #[error("Currency kind mismatch: expected {expected}, got {got}")]
    CurrencyKindMismatch {
        expected: &'static str,
        got: &'static str,
    },

    /// Quantity outside the accepted range.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// Discount attached to the wrong owner for its scope.
    #[error("Invalid discount scope: {0}")]
    InvalidDiscountScope(&'static str),

    /// Tip operation against a shop with tips disabled.
    #[error("Tips are disabled for this shop")]
    TipsDisabled,

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in currency calculation")]
    Overflow,
}
