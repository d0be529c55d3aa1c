//! Catalog types consumed by the pricing engine.
//!
//! Items, variants, and modifiers are owned by the menu subsystem and are
//! immutable once fetched; the engine only reads their ids and prices.

use crate::ids::{ItemId, ModId, VariantId};
use crate::money::Currency;
use serde::{Deserialize, Serialize};

/// Menu category for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ItemCategory {
    Espresso,
    #[default]
    Coffee,
    Tea,
    Food,
    Other,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Espresso => "espresso",
            ItemCategory::Coffee => "coffee",
            ItemCategory::Tea => "tea",
            ItemCategory::Food => "food",
            ItemCategory::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "espresso" => Some(ItemCategory::Espresso),
            "coffee" => Some(ItemCategory::Coffee),
            "tea" => Some(ItemCategory::Tea),
            "food" => Some(ItemCategory::Food),
            "other" => Some(ItemCategory::Other),
            _ => None,
        }
    }
}

/// A menu item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Unique item identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Image URL.
    pub image: Option<String>,
    /// Menu category.
    pub category: ItemCategory,
}

/// A sellable variant of an item (e.g., "12oz").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    /// Unique variant identifier.
    pub id: VariantId,
    /// Display name.
    pub name: String,
    /// Per-unit price.
    pub price: Currency,
}

/// A modifier applied to a variant (e.g., "oat milk").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Modifier {
    /// Unique modifier identifier.
    pub id: ModId,
    /// Display name.
    pub name: String,
    /// Per-unit price added on top of the variant price.
    pub price: Currency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for cat in [
            ItemCategory::Espresso,
            ItemCategory::Coffee,
            ItemCategory::Tea,
            ItemCategory::Food,
            ItemCategory::Other,
        ] {
            assert_eq!(ItemCategory::from_str(cat.as_str()), Some(cat));
        }
        assert_eq!(ItemCategory::from_str("pastries"), None);
    }
}
