//! Scoped discount records and the quantity rescaling rule.

use crate::error::StorefrontError;
use crate::ids::{DiscountId, UserId};
use crate::money::Currency;
use serde::{Deserialize, Serialize};

/// How the discount amount was originally expressed.
///
/// Percentage discounts are pre-resolved to a fixed `Currency` amount at
/// quote time; the engine never re-derives a percentage from a promotional
/// rule, so the type is informational once the quote lands here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountType {
    /// Percentage off, already resolved to an amount.
    Percentage,
    /// Fixed amount off.
    Fixed,
}

/// The entity a discount is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountScope {
    /// Lives on a line item; applies to the per-unit price before quantity.
    Item,
    /// Applies once to the whole order.
    Order,
    /// Granted to a user; applies once to the whole order.
    User,
    /// Granted for a menu category; applies once to the whole order.
    Category,
}

/// A discount quote attached to a line item or cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discount {
    /// Unique discount identifier.
    pub id: DiscountId,
    /// Display name (e.g., "Happy hour").
    pub name: String,
    /// The discounted amount. For `Item` scope this is the total across the
    /// line's current quantity, not per unit.
    pub amount: Currency,
    /// How the amount was expressed at quote time.
    pub discount_type: DiscountType,
    /// The entity this discount is attributed to.
    pub scope: DiscountScope,
    /// The user a `User`-scoped grant belongs to; `None` for other scopes.
    pub granted_to: Option<UserId>,
}

impl Discount {
    /// Create a fixed-amount discount.
    pub fn fixed(name: impl Into<String>, amount: Currency, scope: DiscountScope) -> Self {
        Self {
            id: DiscountId::generate(),
            name: name.into(),
            amount,
            discount_type: DiscountType::Fixed,
            scope,
            granted_to: None,
        }
    }

    /// Create a pre-resolved percentage discount.
    pub fn percentage(name: impl Into<String>, amount: Currency, scope: DiscountScope) -> Self {
        Self {
            id: DiscountId::generate(),
            name: name.into(),
            amount,
            discount_type: DiscountType::Percentage,
            scope,
            granted_to: None,
        }
    }

    /// Create a fixed-amount discount granted to a specific user. User
    /// grants apply once to the whole order, like `Order` scope.
    pub fn for_user(name: impl Into<String>, amount: Currency, user: UserId) -> Self {
        Self {
            id: DiscountId::generate(),
            name: name.into(),
            amount,
            discount_type: DiscountType::Fixed,
            scope: DiscountScope::User,
            granted_to: Some(user),
        }
    }

    /// Whether this discount lives on a line item.
    pub fn is_item_scoped(&self) -> bool {
        self.scope == DiscountScope::Item
    }

    /// Rescale an item-scoped total for a quantity change.
    ///
    /// The stored amount means "total across the current quantity", so the
    /// per-unit amount is derived first and then re-multiplied:
    /// `(amount / q) * q'`. Truncating division means the result can drift
    /// by a few minor units when `q` does not divide the amount evenly;
    /// that matches the shipped behavior and is pinned by tests.
    ///
    /// Non-item scopes are untouched by quantity changes on a single line.
    pub fn rescaled(&self, quantity: u32, new_quantity: u32) -> Result<Discount, StorefrontError> {
        if !self.is_item_scoped() || quantity == new_quantity {
            return Ok(self.clone());
        }
        if quantity == 0 {
            return Err(StorefrontError::InvalidQuantity(0));
        }
        let per_unit = self.amount.div_int(i64::from(quantity))?;
        let amount = per_unit.mul_int(i64::from(new_quantity))?;
        Ok(Discount {
            amount,
            ..self.clone()
        })
    }
}
