//! Order types and the payment/fulfillment state machine.

use crate::cart::{Cart, CartEntry};
use crate::error::StorefrontError;
use crate::ids::{LineItemId, OrderId};
use crate::money::Currency;
use crate::shop::Shop;
use serde::{Deserialize, Serialize};

/// Order status.
///
/// `Pending` is the only mutable state. Payment moves the order to
/// `Submitting`; external sync then advances it to `InProgress` and one of
/// the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Still a cart; mutations are legal.
    #[default]
    Pending,
    /// Payment initiated.
    Submitting,
    /// Confirmed on-chain/POS, externally fulfilling.
    InProgress,
    /// Fulfilled.
    Complete,
    /// Cancelled.
    Cancelled,
    /// Payment or fulfillment failed.
    Error,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Submitting => "submitting",
            OrderStatus::InProgress => "in-progress",
            OrderStatus::Complete => "complete",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Error => "error",
        }
    }

    /// Check if the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Complete | OrderStatus::Cancelled | OrderStatus::Error
        )
    }
}

/// POS/payment-provider status payload attached to a paid order.
///
/// Opaque to the engine except for the mapped `status` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExternalOrderInfo {
    /// Provider-side order id.
    pub external_id: String,
    /// Provider status, already mapped onto the engine's state machine.
    pub status: OrderStatus,
    /// Raw provider payload, passed through untouched.
    pub payload: serde_json::Value,
}

/// A single mutation in a batch order update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum OrderOp {
    /// Append one or many unsaved entries (keys derived on the way in).
    Add(Vec<CartEntry>),
    /// Remove a line by key; fails `NotFound` if absent.
    Delete(LineItemId),
    /// Replace a line with a new quantity; fails `NotFound` if absent.
    UpdateQuantity {
        line_item_id: LineItemId,
        quantity: u32,
    },
    /// Set or clear the tip; fails `TipsDisabled` when the shop disables tips.
    Tip(Option<Currency>),
}

/// A cart that has progressed toward (or past) payment.
///
/// Line items are frozen once the order leaves `Pending`: external sync
/// updates only `status` and `external_order_info`, never the priced content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// The priced content.
    pub cart: Cart,
    /// Current state-machine position.
    pub status: OrderStatus,
    /// Payment transaction hash, stamped when the order leaves `Pending`.
    pub transaction_hash: Option<String>,
    /// POS sync payload from the external collaborator.
    pub external_order_info: Option<ExternalOrderInfo>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Order {
    /// Wrap a cart as a pending order.
    pub fn new(cart: Cart) -> Self {
        let now = current_timestamp();
        Self {
            id: OrderId::generate(),
            cart,
            status: OrderStatus::Pending,
            transaction_hash: None,
            external_order_info: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if payment has been initiated.
    pub fn is_paid(&self) -> bool {
        self.transaction_hash.is_some()
    }

    fn ensure_pending(&self) -> Result<(), StorefrontError> {
        if self.status != OrderStatus::Pending {
            return Err(StorefrontError::OrderNotPending(
                self.status.as_str().to_string(),
            ));
        }
        Ok(())
    }

    /// Initiate payment: `Pending -> Submitting`, stamping the transaction
    /// hash. Illegal if the order already left `Pending`.
    pub fn pay(&mut self, transaction_hash: impl Into<String>) -> Result<(), StorefrontError> {
        self.ensure_pending()?;
        self.status = OrderStatus::Submitting;
        self.transaction_hash = Some(transaction_hash.into());
        self.touch();
        Ok(())
    }

    /// Record an external status update.
    ///
    /// The payload is stored as-is; the mapped status advances the machine
    /// but never regresses a terminal state.
    pub fn sync_external_status(&mut self, info: ExternalOrderInfo) {
        if !self.status.is_terminal() {
            self.status = info.status;
        }
        self.external_order_info = Some(info);
        self.touch();
    }

    /// Empty the line items, keeping the order record. `Pending` only.
    pub fn clear(&mut self) -> Result<(), StorefrontError> {
        self.ensure_pending()?;
        self.cart.clear()?;
        self.touch();
        Ok(())
    }

    /// Apply a batch of operations to a single snapshot.
    ///
    /// The batch runs sequentially against a clone and is returned as one
    /// new order, so a failing operation leaves the original untouched and
    /// readers never observe a partially applied batch.
    pub fn apply_ops(&self, shop: &Shop, ops: Vec<OrderOp>) -> Result<Order, StorefrontError> {
        self.ensure_pending()?;
        let mut next = self.clone();
        for op in ops {
            match op {
                OrderOp::Add(entries) => {
                    for entry in entries {
                        next.cart.add_entry(entry)?;
                    }
                }
                OrderOp::Delete(line_item_id) => {
                    if !next.cart.remove_line(&line_item_id)? {
                        return Err(StorefrontError::NotFound(line_item_id.to_string()));
                    }
                }
                OrderOp::UpdateQuantity {
                    line_item_id,
                    quantity,
                } => {
                    next.cart.update_quantity(&line_item_id, quantity)?;
                }
                OrderOp::Tip(tip) => {
                    if !shop.tip_config.enabled {
                        return Err(StorefrontError::TipsDisabled);
                    }
                    next.cart.set_tip(tip)?;
                }
            }
        }
        next.touch();
        Ok(next)
    }

    fn touch(&mut self) {
        self.updated_at = current_timestamp();
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
