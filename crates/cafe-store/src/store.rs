//! Order persistence.
//!
//! The engine treats `save`/`update` as single logical writes. The in-memory
//! store keeps records in an arena (vector plus id→index map) and guards the
//! read-modify-write cycle with per-record version counters, so a stale
//! writer gets a `VersionConflict` instead of silently clobbering a newer
//! snapshot.

use std::collections::HashMap;

use cafe_commerce::ids::OrderId;
use cafe_commerce::order::{Order, OrderOp};
use cafe_commerce::shop::Shop;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Persistence interface consumed by the storefront.
pub trait OrderStore {
    /// Look up an order by id.
    fn find(&self, id: &OrderId) -> Option<Order>;

    /// Persist an order, inserting or replacing. Returns the persisted id.
    fn save(&mut self, order: Order) -> OrderId;

    /// Apply a batch of operations and persist the result as one write.
    fn update(
        &mut self,
        id: &OrderId,
        shop: &Shop,
        ops: Vec<OrderOp>,
    ) -> Result<Order, StoreError>;
}

struct Record {
    order: Order,
    version: u64,
}

/// In-memory order store.
#[derive(Default)]
pub struct MemoryStore {
    records: Vec<Record>,
    index: HashMap<OrderId, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current version of a record, if present.
    pub fn version(&self, id: &OrderId) -> Option<u64> {
        self.index.get(id).map(|&idx| self.records[idx].version)
    }

    /// Write a snapshot back, verifying the version it was read at.
    ///
    /// Fails with `VersionConflict` when another write landed in between.
    pub fn commit(
        &mut self,
        id: &OrderId,
        order: Order,
        read_version: u64,
    ) -> Result<Order, StoreError> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let record = &mut self.records[idx];
        if record.version != read_version {
            warn!(
                order_id = %id,
                read = read_version,
                found = record.version,
                "rejecting stale order write"
            );
            return Err(StoreError::VersionConflict {
                id: id.to_string(),
                read: read_version,
                found: record.version,
            });
        }
        record.order = order.clone();
        record.version += 1;
        debug!(order_id = %id, version = record.version, "committed order");
        Ok(order)
    }
}

impl OrderStore for MemoryStore {
    fn find(&self, id: &OrderId) -> Option<Order> {
        self.index.get(id).map(|&idx| self.records[idx].order.clone())
    }

    fn save(&mut self, order: Order) -> OrderId {
        let id = order.id.clone();
        match self.index.get(&id) {
            Some(&idx) => {
                let record = &mut self.records[idx];
                record.order = order;
                record.version += 1;
            }
            None => {
                self.index.insert(id.clone(), self.records.len());
                self.records.push(Record { order, version: 0 });
            }
        }
        debug!(order_id = %id, "saved order");
        id
    }

    fn update(
        &mut self,
        id: &OrderId,
        shop: &Shop,
        ops: Vec<OrderOp>,
    ) -> Result<Order, StoreError> {
        let (snapshot, read_version) = {
            let idx = *self
                .index
                .get(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            let record = &self.records[idx];
            (record.order.clone(), record.version)
        };
        let updated = snapshot.apply_ops(shop, ops)?;
        self.commit(id, updated, read_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_commerce::prelude::*;

    fn usdc(text: &str) -> Currency {
        Currency::from_decimal(CurrencyKind::Usdc, text).unwrap()
    }

    fn entry(quantity: u32) -> CartEntry {
        CartEntry {
            item: Item {
                id: "latte".into(),
                name: "Latte".to_string(),
                description: None,
                image: None,
                category: ItemCategory::Espresso,
            },
            variant: Variant {
                id: "12oz".into(),
                name: "12oz".to_string(),
                price: usdc("3.00"),
            },
            mods: vec![],
            quantity,
            discounts: vec![],
        }
    }

    fn shop() -> Shop {
        Shop::new("shop-1".into(), "Corner Cafe")
    }

    fn pending_order() -> Order {
        let mut cart = Cart::new("shop-1".into());
        cart.add_entry(entry(2)).unwrap();
        Order::new(cart)
    }

    #[test]
    fn test_save_and_find() {
        let mut store = MemoryStore::new();
        let order = pending_order();
        let id = store.save(order.clone());
        assert_eq!(store.find(&id), Some(order));
        assert_eq!(store.version(&id), Some(0));
        assert!(store.find(&OrderId::new("missing")).is_none());
    }

    #[test]
    fn test_update_applies_batch_once() {
        let mut store = MemoryStore::new();
        let order = pending_order();
        let key = order.cart.line_items[0].unique_id.clone();
        let id = store.save(order);

        let updated = store
            .update(
                &id,
                &shop(),
                vec![
                    OrderOp::UpdateQuantity {
                        line_item_id: key,
                        quantity: 3,
                    },
                    OrderOp::Tip(Some(usdc("1.00"))),
                ],
            )
            .unwrap();

        assert_eq!(updated.cart.totals.grand_total, usdc("10.00"));
        assert_eq!(store.find(&id).unwrap(), updated);
        assert_eq!(store.version(&id), Some(1));
    }

    #[test]
    fn test_update_missing_order() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.update(&OrderId::new("missing"), &shop(), vec![]),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_domain_errors_pass_through() {
        let mut store = MemoryStore::new();
        let mut order = pending_order();
        order.pay("0xabc").unwrap();
        let id = store.save(order);

        let err = store
            .update(&id, &shop(), vec![OrderOp::Add(vec![entry(1)])])
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(StorefrontError::OrderNotPending(_))
        ));
    }

    #[test]
    fn test_stale_commit_conflicts() {
        let mut store = MemoryStore::new();
        let order = pending_order();
        let id = store.save(order.clone());

        // Reader takes a snapshot at version 0
        let snapshot = store.find(&id).unwrap();
        let read_version = store.version(&id).unwrap();

        // Another writer lands first
        store.save(order);
        assert_eq!(store.version(&id), Some(1));

        let err = store.commit(&id, snapshot, read_version).unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
    }

    #[test]
    fn test_synced_order_round_trips() {
        let mut store = MemoryStore::new();
        let mut order = pending_order();
        order.pay("0xabc").unwrap();
        order.sync_external_status(ExternalOrderInfo {
            external_id: "pos-7".to_string(),
            status: OrderStatus::InProgress,
            payload: serde_json::json!({"ticket": 7}),
        });
        let id = store.save(order);

        let found = store.find(&id).unwrap();
        assert_eq!(found.status, OrderStatus::InProgress);
        assert_eq!(
            found.external_order_info.unwrap().external_id,
            "pos-7"
        );
    }
}
