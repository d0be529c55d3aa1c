//! Shop configuration consumed by order operations.

use crate::ids::ShopId;
use serde::{Deserialize, Serialize};

/// Tip configuration for a shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TipConfig {
    /// Whether the shop accepts tips at all.
    pub enabled: bool,
}

/// The slice of shop data the pricing engine needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shop {
    /// Unique shop identifier.
    pub id: ShopId,
    /// Display name.
    pub name: String,
    /// Tip configuration.
    pub tip_config: TipConfig,
}

impl Shop {
    /// Create a shop with tips enabled.
    pub fn new(id: ShopId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tip_config: TipConfig { enabled: true },
        }
    }

    /// Disable tips.
    pub fn without_tips(mut self) -> Self {
        self.tip_config.enabled = false;
        self
    }
}
