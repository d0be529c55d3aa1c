//! Shopping cart module.
//!
//! Contains the cart, line item aggregation, discounts, and totals.

mod cart;
mod discount;
mod pricing;

pub use cart::{aggregate_entries, Cart, CartEntry, LineItem};
pub use discount::{Discount, DiscountScope, DiscountType};
pub use pricing::{calculate_cart_totals, CartTotals};
