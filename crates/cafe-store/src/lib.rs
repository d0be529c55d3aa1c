//! Order persistence layer for the cafe storefront.
//!
//! Exposes the [`OrderStore`] interface the engine writes through, plus an
//! in-memory implementation with version-checked writes for local use and
//! tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use cafe_store::{MemoryStore, OrderStore};
//!
//! let mut store = MemoryStore::new();
//! let id = store.save(order);
//! let updated = store.update(&id, &shop, ops)?;
//! ```

mod error;
mod store;

pub use error::StoreError;
pub use store::{MemoryStore, OrderStore};
