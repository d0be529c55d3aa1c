//! Pricing and order domain for the cafe storefront.
//!
//! This crate is the storefront's numeric core: exact fixed-point currency
//! math over integer minor units, cart line-item aggregation, scoped
//! discounts, derived totals, and the order state machine. It performs no
//! I/O; persistence and POS/payment sync are external collaborators.
//!
//! # Example
//!
//! ```rust
//! use cafe_commerce::prelude::*;
//!
//! let mut cart = Cart::new("shop-1".into());
//! cart.add_entry(CartEntry {
//!     item: Item {
//!         id: "latte".into(),
//!         name: "Latte".to_string(),
//!         description: None,
//!         image: None,
//!         category: ItemCategory::Espresso,
//!     },
//!     variant: Variant {
//!         id: "12oz".into(),
//!         name: "12oz".to_string(),
//!         price: Currency::from_decimal(CurrencyKind::Usdc, "3.00").unwrap(),
//!     },
//!     mods: vec![],
//!     quantity: 2,
//!     discounts: vec![],
//! }).unwrap();
//!
//! assert_eq!(cart.totals.subtotal.pretty_format(), "6.000000");
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod order;
pub mod shop;

pub use error::StorefrontError;
pub use ids::*;
pub use money::{Currency, CurrencyKind};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::StorefrontError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, CurrencyKind};

    // Catalog
    pub use crate::catalog::{Item, ItemCategory, Modifier, Variant};

    // Cart
    pub use crate::cart::{
        aggregate_entries, calculate_cart_totals, Cart, CartEntry, CartTotals, Discount,
        DiscountScope, DiscountType, LineItem,
    };

    // Order
    pub use crate::order::{ExternalOrderInfo, Order, OrderOp, OrderStatus};

    // Shop
    pub use crate::shop::{Shop, TipConfig};
}
