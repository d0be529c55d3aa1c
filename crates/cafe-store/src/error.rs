//! Store error types.

use cafe_commerce::StorefrontError;
use thiserror::Error;

/// Errors that can occur in the order store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No record with the given id.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// A concurrent writer committed between read and write.
    #[error("Version conflict on {id}: read version {read}, found {found}")]
    VersionConflict { id: String, read: u64, found: u64 },

    /// A domain failure surfaced unchanged from the pricing engine.
    #[error(transparent)]
    Domain(#[from] StorefrontError),
}
