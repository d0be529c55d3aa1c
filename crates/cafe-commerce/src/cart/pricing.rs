//! Cart totals calculation.

use crate::cart::Cart;
use crate::error::StorefrontError;
use crate::money::{Currency, CurrencyKind};
use serde::{Deserialize, Serialize};

/// Derived totals for a cart.
///
/// Pure derivations of the line items plus tip; recomputed wholesale after
/// every mutation, never patched field by field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Sum of pre-discount line subtotals.
    pub subtotal: Currency,
    /// Tax. Placeholder: always zero, the tax service is an external concern.
    pub tax_total: Currency,
    /// Item-scoped discounts across all lines plus cart-level discounts.
    pub discount_total: Currency,
    /// `subtotal + tax - discounts + tip`.
    pub grand_total: Currency,
}

impl CartTotals {
    /// All-zero totals of the given kind.
    pub const fn zero(kind: CurrencyKind) -> Self {
        Self {
            subtotal: Currency::zero(kind),
            tax_total: Currency::zero(kind),
            discount_total: Currency::zero(kind),
            grand_total: Currency::zero(kind),
        }
    }

    /// Check if any discount applies.
    pub fn has_discounts(&self) -> bool {
        self.discount_total.is_positive()
    }
}

/// Derive the four cart totals.
///
/// This is the only path that computes a grand total:
/// 1. an empty cart yields all-zero totals of the cart's nominal kind;
/// 2. subtotal is the sum of pre-discount line subtotals;
/// 3. tax is zero (placeholder);
/// 4. discounts are the item-scoped amounts plus cart-level discounts;
/// 5. grand total is `subtotal + tax - discounts + tip`.
pub fn calculate_cart_totals(cart: &Cart) -> Result<CartTotals, StorefrontError> {
    let kind = cart.currency_kind();
    if cart.is_empty() {
        return Ok(CartTotals::zero(kind));
    }

    let mut subtotal = Currency::zero(kind);
    for line in &cart.line_items {
        subtotal = subtotal.try_add(&line.subtotal)?;
    }

    let tax_total = Currency::zero(kind);

    let mut discount_total = Currency::zero(kind);
    for line in &cart.line_items {
        discount_total = discount_total.try_add(&line.total_discount)?;
    }
    for discount in &cart.discounts {
        discount_total = discount_total.try_add(&discount.amount)?;
    }

    let tip = cart.tip.unwrap_or_else(|| Currency::zero(kind));
    let grand_total = subtotal
        .try_add(&tax_total)?
        .try_sub(&discount_total)?
        .try_add(&tip)?;

    Ok(CartTotals {
        subtotal,
        tax_total,
        discount_total,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartEntry, Discount, DiscountScope};
    use crate::catalog::{Item, ItemCategory, Modifier, Variant};

    fn usdc(text: &str) -> Currency {
        Currency::from_decimal(CurrencyKind::Usdc, text).unwrap()
    }

    fn entry(name: &str, price: &str, quantity: u32) -> CartEntry {
        CartEntry {
            item: Item {
                id: name.into(),
                name: name.to_string(),
                description: None,
                image: None,
                category: ItemCategory::Coffee,
            },
            variant: Variant {
                id: format!("{name}-12oz").into(),
                name: "12oz".to_string(),
                price: usdc(price),
            },
            mods: vec![],
            quantity,
            discounts: vec![],
        }
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let cart = Cart::new("shop-1".into());
        let totals = calculate_cart_totals(&cart).unwrap();
        assert_eq!(totals, CartTotals::zero(CurrencyKind::Usdc));
    }

    #[test]
    fn test_subtotal_tip_grand_total() {
        // One line: $3.00 * 2, plus a $1.00 tip
        let mut cart = Cart::new("shop-1".into());
        cart.add_entry(entry("latte", "3.00", 2)).unwrap();
        cart.set_tip(Some(usdc("1.00"))).unwrap();

        assert_eq!(cart.totals.subtotal, usdc("6.00"));
        assert_eq!(cart.totals.discount_total, usdc("0"));
        assert_eq!(cart.totals.tax_total, usdc("0"));
        assert_eq!(cart.totals.grand_total, usdc("7.00"));
    }

    #[test]
    fn test_item_discount_rescales_into_totals() {
        // Quantity 2 with a $1.00 item discount, then one more of the same
        // item: the discount rescales to $1.50 at quantity 3.
        let mut cart = Cart::new("shop-1".into());
        let mut discounted = entry("latte", "3.00", 2);
        discounted.discounts = vec![Discount::fixed(
            "loyalty",
            usdc("1.00"),
            DiscountScope::Item,
        )];
        cart.add_entry(discounted).unwrap();
        cart.add_entry(entry("latte", "3.00", 1)).unwrap();

        assert_eq!(cart.totals.subtotal, usdc("9.00"));
        assert_eq!(cart.totals.discount_total, usdc("1.50"));
        assert_eq!(cart.totals.grand_total, usdc("7.50"));
    }

    #[test]
    fn test_cart_level_discount_counts_once() {
        let mut cart = Cart::new("shop-1".into());
        cart.add_entry(entry("latte", "3.00", 2)).unwrap();
        cart.add_entry(entry("drip", "2.50", 1)).unwrap();
        cart.apply_discount(Discount::fixed(
            "welcome",
            usdc("2.00"),
            DiscountScope::Order,
        ))
        .unwrap();

        assert_eq!(cart.totals.subtotal, usdc("8.50"));
        assert_eq!(cart.totals.discount_total, usdc("2.00"));
        assert_eq!(cart.totals.grand_total, usdc("6.50"));
        assert!(cart.totals.has_discounts());
    }

    #[test]
    fn test_mods_included_in_subtotal() {
        let mut cart = Cart::new("shop-1".into());
        let mut with_mod = entry("latte", "3.00", 2);
        with_mod.mods = vec![Modifier {
            id: "oat".into(),
            name: "Oat milk".to_string(),
            price: usdc("0.75"),
        }];
        cart.add_entry(with_mod).unwrap();
        assert_eq!(cart.totals.subtotal, usdc("7.50"));
    }

    #[test]
    fn test_totals_track_every_mutation() {
        let mut cart = Cart::new("shop-1".into());
        let key = cart.add_entry(entry("latte", "3.00", 2)).unwrap();
        assert_eq!(cart.totals.grand_total, usdc("6.00"));

        cart.update_quantity(&key, 1).unwrap();
        assert_eq!(cart.totals.grand_total, usdc("3.00"));

        cart.set_tip(Some(usdc("0.50"))).unwrap();
        assert_eq!(cart.totals.grand_total, usdc("3.50"));

        cart.decrement(&key, 1).unwrap();
        // Empty cart zeroes everything, tip included
        assert_eq!(cart.totals.grand_total, usdc("0"));
    }
}
