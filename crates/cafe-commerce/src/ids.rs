//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing an ItemId where a VariantId is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID.
            pub fn generate() -> Self {
                Self(generate_id())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define all ID types
define_id!(ItemId);
define_id!(VariantId);
define_id!(ModId);
define_id!(LineItemId);
define_id!(CartId);
define_id!(OrderId);
define_id!(DiscountId);
define_id!(ShopId);
define_id!(UserId);

impl LineItemId {
    /// Derive the aggregation key for an `(item, variant, mods)` combination.
    ///
    /// The key is a stable FNV-1a hash over the item id, variant id, and the
    /// mod ids in sorted order, so the same combination always maps to the
    /// same line item no matter how the entry was assembled.
    pub fn derive(item: &ItemId, variant: &VariantId, mods: &[ModId]) -> Self {
        let mut mod_ids: Vec<&str> = mods.iter().map(|m| m.as_str()).collect();
        mod_ids.sort_unstable();

        let mut hash = FNV_OFFSET_BASIS;
        for part in [item.as_str(), variant.as_str()]
            .into_iter()
            .chain(mod_ids)
        {
            hash = fnv1a_update(hash, part.as_bytes());
            // Field separator so ("ab", "c") and ("a", "bc") hash apart
            hash = fnv1a_update(hash, &[0x1f]);
        }
        Self(format!("{hash:016x}"))
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a_update(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Generate a unique ID using timestamp and an atomic counter.
fn generate_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{:x}-{:x}", timestamp, counter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ItemId::new("item-123");
        assert_eq!(id.as_str(), "item-123");
    }

    #[test]
    fn test_id_generation() {
        let id1 = CartId::generate();
        let id2 = CartId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_id_display() {
        let id = VariantId::new("var-789");
        assert_eq!(format!("{}", id), "var-789");
    }

    #[test]
    fn test_line_key_is_deterministic() {
        let a = LineItemId::derive(
            &ItemId::new("latte"),
            &VariantId::new("12oz"),
            &[ModId::new("oat-milk"), ModId::new("extra-shot")],
        );
        let b = LineItemId::derive(
            &ItemId::new("latte"),
            &VariantId::new("12oz"),
            &[ModId::new("extra-shot"), ModId::new("oat-milk")],
        );
        // Mod order must not matter
        assert_eq!(a, b);
    }

    #[test]
    fn test_line_key_distinguishes_variants() {
        let small = LineItemId::derive(&ItemId::new("latte"), &VariantId::new("8oz"), &[]);
        let large = LineItemId::derive(&ItemId::new("latte"), &VariantId::new("16oz"), &[]);
        assert_ne!(small, large);
    }

    #[test]
    fn test_line_key_separator_prevents_collisions() {
        let a = LineItemId::derive(&ItemId::new("ab"), &VariantId::new("c"), &[]);
        let b = LineItemId::derive(&ItemId::new("a"), &VariantId::new("bc"), &[]);
        assert_ne!(a, b);
    }
}
