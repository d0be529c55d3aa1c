//! Cart and line item types, plus entry aggregation.

use crate::cart::pricing::{calculate_cart_totals, CartTotals};
use crate::cart::Discount;
use crate::catalog::{Item, Modifier, Variant};
use crate::error::StorefrontError;
use crate::ids::{CartId, LineItemId, ModId, ShopId};
use crate::money::{Currency, CurrencyKind};
use serde::{Deserialize, Serialize};

/// A raw cart entry as handed over by the UI or POS sync: not yet aggregated
/// into a unique line item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartEntry {
    /// The menu item.
    pub item: Item,
    /// The chosen variant.
    pub variant: Variant,
    /// Chosen modifiers.
    pub mods: Vec<Modifier>,
    /// Quantity, at least 1.
    pub quantity: u32,
    /// Item-scoped discount quotes attached to this entry.
    pub discounts: Vec<Discount>,
}

/// An aggregated line item: one unique `(item, variant, mod-set)` combination
/// and its quantity.
///
/// Line items are immutable snapshots. Quantity and discount changes produce
/// a whole new record; a quantity of zero removes the record from the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Deterministic aggregation key, see [`LineItemId::derive`].
    pub unique_id: LineItemId,
    /// The menu item.
    pub item: Item,
    /// The chosen variant.
    pub variant: Variant,
    /// Quantity, at least 1.
    pub quantity: u32,
    /// Chosen modifiers.
    pub mods: Vec<Modifier>,
    /// Item-scoped discounts; each amount is the total across `quantity`.
    pub discounts: Vec<Discount>,
    /// Pre-discount total: (variant price + mod prices) * quantity.
    pub subtotal: Currency,
    /// Sum of the item-scoped discount amounts.
    pub total_discount: Currency,
    /// `subtotal - total_discount`.
    pub total: Currency,
}

impl LineItem {
    /// Build a line item, deriving its key and priced fields.
    pub fn build(
        item: Item,
        variant: Variant,
        mods: Vec<Modifier>,
        quantity: u32,
        discounts: Vec<Discount>,
    ) -> Result<Self, StorefrontError> {
        if quantity == 0 {
            return Err(StorefrontError::InvalidQuantity(0));
        }
        let mod_ids: Vec<ModId> = mods.iter().map(|m| m.id.clone()).collect();
        let unique_id = LineItemId::derive(&item.id, &variant.id, &mod_ids);

        let mut unit_price = variant.price;
        for modifier in &mods {
            unit_price = unit_price.try_add(&modifier.price)?;
        }
        let subtotal = unit_price.mul_int(i64::from(quantity))?;

        let mut total_discount = Currency::zero(subtotal.kind());
        for discount in discounts.iter().filter(|d| d.is_item_scoped()) {
            total_discount = total_discount.try_add(&discount.amount)?;
        }
        let total = subtotal.try_sub(&total_discount)?;

        Ok(Self {
            unique_id,
            item,
            variant,
            quantity,
            mods,
            discounts,
            subtotal,
            total_discount,
            total,
        })
    }

    /// Produce a new snapshot at a different quantity, rescaling any
    /// item-scoped discounts to preserve their per-unit amount.
    pub fn with_quantity(&self, quantity: u32) -> Result<Self, StorefrontError> {
        let discounts = self
            .discounts
            .iter()
            .map(|d| d.rescaled(self.quantity, quantity))
            .collect::<Result<Vec<_>, _>>()?;
        Self::build(
            self.item.clone(),
            self.variant.clone(),
            self.mods.clone(),
            quantity,
            discounts,
        )
    }

    /// Convert back to a raw entry (used when re-aggregating).
    pub fn to_entry(&self) -> CartEntry {
        CartEntry {
            item: self.item.clone(),
            variant: self.variant.clone(),
            mods: self.mods.clone(),
            quantity: self.quantity,
            discounts: self.discounts.clone(),
        }
    }
}

/// Group raw entries into unique line items.
///
/// Entries with the same derived key merge by summing quantity and rescaling
/// the existing item-scoped discounts; output order is the insertion order of
/// first occurrence. Aggregating an already-aggregated sequence is a no-op.
pub fn aggregate_entries(entries: &[CartEntry]) -> Result<Vec<LineItem>, StorefrontError> {
    let mut lines: Vec<LineItem> = Vec::new();
    for entry in entries {
        let mod_ids: Vec<ModId> = entry.mods.iter().map(|m| m.id.clone()).collect();
        let key = LineItemId::derive(&entry.item.id, &entry.variant.id, &mod_ids);
        match lines.iter().position(|l| l.unique_id == key) {
            Some(idx) => {
                let merged = lines[idx]
                    .quantity
                    .checked_add(entry.quantity)
                    .ok_or(StorefrontError::Overflow)?;
                // Repeated identical entries carry the same quote, so the
                // existing line's discounts rescale rather than double-count.
                let replacement = lines[idx].with_quantity(merged)?;
                lines[idx] = replacement;
            }
            None => lines.push(LineItem::build(
                entry.item.clone(),
                entry.variant.clone(),
                entry.mods.clone(),
                entry.quantity,
                entry.discounts.clone(),
            )?),
        }
    }
    Ok(lines)
}

/// A shopping cart.
///
/// The `totals` field is a cache: it is recomputed through
/// [`calculate_cart_totals`] after every mutation and never patched
/// incrementally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// The shop this cart belongs to.
    pub shop_id: ShopId,
    /// Aggregated line items.
    pub line_items: Vec<LineItem>,
    /// Cart-level discounts (order/user/category scope).
    pub discounts: Vec<Discount>,
    /// Optional tip, same kind as the cart.
    pub tip: Option<Currency>,
    /// Derived totals, recomputed on every mutation.
    pub totals: CartTotals,
}

impl Cart {
    /// Create an empty cart for a shop.
    pub fn new(shop_id: ShopId) -> Self {
        Self {
            id: CartId::generate(),
            shop_id,
            line_items: Vec::new(),
            discounts: Vec::new(),
            tip: None,
            totals: CartTotals::zero(CurrencyKind::default()),
        }
    }

    /// The kind all currency values in this cart share: the kind of the
    /// first line's variant price, or the default kind while empty.
    pub fn currency_kind(&self) -> CurrencyKind {
        self.line_items
            .first()
            .map(|l| l.variant.price.kind())
            .unwrap_or_default()
    }

    /// Check if the cart has no line items.
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> u64 {
        self.line_items.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Get a line item by its key.
    pub fn get_line(&self, id: &LineItemId) -> Option<&LineItem> {
        self.line_items.iter().find(|l| &l.unique_id == id)
    }

    /// Add a raw entry.
    ///
    /// If a line with the same derived key exists, it is replaced by a new
    /// snapshot with the summed quantity and rescaled discounts; otherwise a
    /// new line is appended.
    pub fn add_entry(&mut self, entry: CartEntry) -> Result<LineItemId, StorefrontError> {
        if !self.is_empty() && entry.variant.price.kind() != self.currency_kind() {
            return Err(StorefrontError::CurrencyKindMismatch {
                expected: self.currency_kind().code(),
                got: entry.variant.price.kind().code(),
            });
        }

        let mod_ids: Vec<ModId> = entry.mods.iter().map(|m| m.id.clone()).collect();
        let key = LineItemId::derive(&entry.item.id, &entry.variant.id, &mod_ids);
        match self.line_items.iter().position(|l| l.unique_id == key) {
            Some(idx) => {
                let merged = self.line_items[idx]
                    .quantity
                    .checked_add(entry.quantity)
                    .ok_or(StorefrontError::Overflow)?;
                let replacement = self.line_items[idx].with_quantity(merged)?;
                self.line_items[idx] = replacement;
            }
            None => {
                self.line_items.push(LineItem::build(
                    entry.item,
                    entry.variant,
                    entry.mods,
                    entry.quantity,
                    entry.discounts,
                )?);
            }
        }
        self.refresh_totals()?;
        Ok(key)
    }

    /// Set a line's quantity, replacing the record. Zero removes the line.
    pub fn update_quantity(
        &mut self,
        id: &LineItemId,
        quantity: u32,
    ) -> Result<(), StorefrontError> {
        let idx = self
            .line_items
            .iter()
            .position(|l| &l.unique_id == id)
            .ok_or_else(|| StorefrontError::NotFound(id.to_string()))?;
        if quantity == 0 {
            self.line_items.remove(idx);
        } else {
            let replacement = self.line_items[idx].with_quantity(quantity)?;
            self.line_items[idx] = replacement;
        }
        self.refresh_totals()
    }

    /// Decrement a line's quantity; reaching zero removes the line.
    pub fn decrement(&mut self, id: &LineItemId, by: u32) -> Result<(), StorefrontError> {
        let current = self
            .get_line(id)
            .ok_or_else(|| StorefrontError::NotFound(id.to_string()))?
            .quantity;
        self.update_quantity(id, current.saturating_sub(by))
    }

    /// Remove a line entirely. Returns whether it existed.
    pub fn remove_line(&mut self, id: &LineItemId) -> Result<bool, StorefrontError> {
        let len_before = self.line_items.len();
        self.line_items.retain(|l| &l.unique_id != id);
        let removed = self.line_items.len() < len_before;
        if removed {
            self.refresh_totals()?;
        }
        Ok(removed)
    }

    /// Apply a cart-level discount, replacing any existing one with the same id.
    pub fn apply_discount(&mut self, discount: Discount) -> Result<(), StorefrontError> {
        if discount.is_item_scoped() {
            return Err(StorefrontError::InvalidDiscountScope(
                "item-scoped discounts belong to a line item",
            ));
        }
        self.discounts.retain(|d| d.id != discount.id);
        self.discounts.push(discount);
        self.refresh_totals()
    }

    /// Set or clear the tip.
    pub fn set_tip(&mut self, tip: Option<Currency>) -> Result<(), StorefrontError> {
        if let Some(amount) = &tip {
            if amount.kind() != self.currency_kind() {
                return Err(StorefrontError::CurrencyKindMismatch {
                    expected: self.currency_kind().code(),
                    got: amount.kind().code(),
                });
            }
        }
        self.tip = tip;
        self.refresh_totals()
    }

    /// Remove all line items. The cart record itself survives.
    pub fn clear(&mut self) -> Result<(), StorefrontError> {
        self.line_items.clear();
        self.discounts.clear();
        self.refresh_totals()
    }

    fn refresh_totals(&mut self) -> Result<(), StorefrontError> {
        let totals = calculate_cart_totals(self)?;
        self.totals = totals;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::DiscountScope;

    fn usdc(text: &str) -> Currency {
        Currency::from_decimal(CurrencyKind::Usdc, text).unwrap()
    }

    fn latte() -> Item {
        Item {
            id: "latte".into(),
            name: "Latte".to_string(),
            description: None,
            image: None,
            category: crate::catalog::ItemCategory::Espresso,
        }
    }

    fn twelve_oz(price: &str) -> Variant {
        Variant {
            id: "12oz".into(),
            name: "12oz".to_string(),
            price: usdc(price),
        }
    }

    fn oat_milk() -> Modifier {
        Modifier {
            id: "oat".into(),
            name: "Oat milk".to_string(),
            price: usdc("0.75"),
        }
    }

    fn entry(quantity: u32) -> CartEntry {
        CartEntry {
            item: latte(),
            variant: twelve_oz("3.00"),
            mods: vec![],
            quantity,
            discounts: vec![],
        }
    }

    #[test]
    fn test_line_item_pricing_with_mods() {
        let line = LineItem::build(
            latte(),
            twelve_oz("3.00"),
            vec![oat_milk()],
            2,
            vec![],
        )
        .unwrap();
        // ($3.00 + $0.75) * 2
        assert_eq!(line.subtotal, usdc("7.50"));
        assert_eq!(line.total, usdc("7.50"));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert_eq!(
            LineItem::build(latte(), twelve_oz("3.00"), vec![], 0, vec![]),
            Err(StorefrontError::InvalidQuantity(0))
        );
    }

    #[test]
    fn test_aggregation_merges_identical_entries() {
        let lines = aggregate_entries(&[entry(1), entry(2)]).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].subtotal, usdc("9.00"));
    }

    #[test]
    fn test_aggregation_keeps_insertion_order() {
        let mut other = entry(1);
        other.variant = Variant {
            id: "16oz".into(),
            name: "16oz".to_string(),
            price: usdc("3.50"),
        };
        let lines = aggregate_entries(&[entry(1), other, entry(1)]).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].variant.id.as_str(), "12oz");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[1].variant.id.as_str(), "16oz");
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let mut discounted = entry(2);
        discounted.mods = vec![oat_milk()];
        discounted.discounts = vec![Discount::fixed(
            "loyalty",
            usdc("1.00"),
            DiscountScope::Item,
        )];
        let first = aggregate_entries(&[entry(1), entry(1), discounted]).unwrap();
        let entries: Vec<CartEntry> = first.iter().map(LineItem::to_entry).collect();
        let second = aggregate_entries(&entries).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mods_distinguish_lines() {
        let mut with_mod = entry(1);
        with_mod.mods = vec![oat_milk()];
        let lines = aggregate_entries(&[entry(1), with_mod]).unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_add_entry_merges_and_rescales_discount() {
        let mut cart = Cart::new("shop-1".into());
        let mut first = entry(2);
        first.discounts = vec![Discount::fixed(
            "loyalty",
            usdc("1.00"),
            DiscountScope::Item,
        )];
        let key = cart.add_entry(first).unwrap();
        cart.add_entry(entry(1)).unwrap();

        let line = cart.get_line(&key).unwrap();
        assert_eq!(line.quantity, 3);
        // $1.00 total at quantity 2 rescaled to quantity 3
        assert_eq!(line.total_discount, usdc("1.50"));
        assert_eq!(line.total, usdc("7.50"));
    }

    #[test]
    fn test_decrement_to_zero_removes_line() {
        let mut cart = Cart::new("shop-1".into());
        let key = cart.add_entry(entry(1)).unwrap();
        cart.decrement(&key, 1).unwrap();
        assert!(cart.is_empty());
        assert!(cart.get_line(&key).is_none());
    }

    #[test]
    fn test_update_quantity_replaces_snapshot() {
        let mut cart = Cart::new("shop-1".into());
        let key = cart.add_entry(entry(1)).unwrap();
        cart.update_quantity(&key, 4).unwrap();
        assert_eq!(cart.get_line(&key).unwrap().quantity, 4);
        assert_eq!(cart.totals.subtotal, usdc("12.00"));
    }

    #[test]
    fn test_update_missing_line_fails() {
        let mut cart = Cart::new("shop-1".into());
        assert!(matches!(
            cart.update_quantity(&LineItemId::new("missing"), 2),
            Err(StorefrontError::NotFound(_))
        ));
    }

    #[test]
    fn test_kind_consistency_enforced() {
        let mut cart = Cart::new("shop-1".into());
        cart.add_entry(entry(1)).unwrap();
        let mut eth_entry = entry(1);
        eth_entry.variant = Variant {
            id: "12oz-eth".into(),
            name: "12oz".to_string(),
            price: Currency::from_decimal(CurrencyKind::Eth, "0.001").unwrap(),
        };
        assert!(matches!(
            cart.add_entry(eth_entry),
            Err(StorefrontError::CurrencyKindMismatch { .. })
        ));
        assert!(matches!(
            cart.set_tip(Some(Currency::from_decimal(CurrencyKind::Eth, "0.1").unwrap())),
            Err(StorefrontError::CurrencyKindMismatch { .. })
        ));
    }

    #[test]
    fn test_clear_keeps_cart_record() {
        let mut cart = Cart::new("shop-1".into());
        cart.add_entry(entry(2)).unwrap();
        cart.clear().unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.totals.grand_total, usdc("0"));
    }
}
