//! Order table
//!
//! The shared local-ref ↔ broker-id ↔ Order table, accessed from the
//! submission path, the reconciler and strategy reads. One mutex guards
//! both indices so they can never disagree; it is held only for a single
//! read/update and never across the network boundary.

use std::collections::HashMap;
use std::sync::Mutex;

use garuda_core::{Order, OrderRef, OrderStatus};
use log::warn;

struct StoreInner {
    orders: HashMap<OrderRef, Order>,
    by_broker_id: HashMap<String, OrderRef>,
}

/// Shared order table
pub struct OrderStore {
    inner: Mutex<StoreInner>,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                orders: HashMap::new(),
                by_broker_id: HashMap::new(),
            }),
        }
    }

    /// Insert a freshly created order
    pub fn insert(&self, order: Order) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(broker_id) = &order.broker_order_id {
            inner.by_broker_id.insert(broker_id.clone(), order.local_ref);
        }
        inner.orders.insert(order.local_ref, order);
    }

    /// Copy of an order by its local reference
    pub fn get(&self, order_ref: &OrderRef) -> Option<Order> {
        self.inner.lock().unwrap().orders.get(order_ref).cloned()
    }

    /// Resolve a broker order id to the local reference
    pub fn resolve_broker_id(&self, broker_id: &str) -> Option<OrderRef> {
        self.inner
            .lock()
            .unwrap()
            .by_broker_id
            .get(broker_id)
            .copied()
    }

    /// Bind the broker order id and move Created → Submitted.
    ///
    /// The broker id is assigned exactly once; a second bind attempt is
    /// logged and ignored.
    pub fn acknowledge(&self, order_ref: &OrderRef, broker_id: &str) {
        let mut inner = self.inner.lock().unwrap();
        let Some(order) = inner.orders.get_mut(order_ref) else {
            warn!("[ORDERS] acknowledge for unknown order {}", order_ref);
            return;
        };
        if let Some(existing) = &order.broker_order_id {
            warn!(
                "[ORDERS] order {} already bound to broker id {}, ignoring {}",
                order_ref, existing, broker_id
            );
            return;
        }
        order.broker_order_id = Some(broker_id.to_string());
        if order.status == OrderStatus::Created {
            order.status = OrderStatus::Submitted;
        }
        order.updated_at = chrono::Utc::now();
        inner.by_broker_id.insert(broker_id.to_string(), *order_ref);
    }

    /// Run a closure against one order under the table lock.
    ///
    /// The closure must not block; it exists so state-machine decisions and
    /// their writes happen in one critical section.
    pub fn update<R>(&self, order_ref: &OrderRef, f: impl FnOnce(&mut Order) -> R) -> Option<R> {
        let mut inner = self.inner.lock().unwrap();
        inner.orders.get_mut(order_ref).map(f)
    }

    /// Number of orders in the table
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies of all orders still live at the venue
    pub fn active_orders(&self) -> Vec<Order> {
        self.inner
            .lock()
            .unwrap()
            .orders
            .values()
            .filter(|o| o.status.is_active())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garuda_core::{OrderIntent, Side};
    use rust_decimal_macros::dec;

    fn created_order() -> Order {
        Order::from_intent(&OrderIntent::limit("SBIN-EQ", Side::Buy, dec!(10), dec!(800)))
    }

    #[test]
    fn test_insert_and_get() {
        let store = OrderStore::new();
        let order = created_order();
        let order_ref = order.local_ref;

        store.insert(order);
        assert_eq!(store.len(), 1);

        let fetched = store.get(&order_ref).unwrap();
        assert_eq!(fetched.status, OrderStatus::Created);
        assert!(store.resolve_broker_id("B-1").is_none());
    }

    #[test]
    fn test_acknowledge_binds_once() {
        let store = OrderStore::new();
        let order = created_order();
        let order_ref = order.local_ref;
        store.insert(order);

        store.acknowledge(&order_ref, "B-1");
        let order = store.get(&order_ref).unwrap();
        assert_eq!(order.broker_order_id.as_deref(), Some("B-1"));
        assert_eq!(order.status, OrderStatus::Submitted);
        assert_eq!(store.resolve_broker_id("B-1"), Some(order_ref));

        // Second bind is ignored
        store.acknowledge(&order_ref, "B-2");
        let order = store.get(&order_ref).unwrap();
        assert_eq!(order.broker_order_id.as_deref(), Some("B-1"));
        assert!(store.resolve_broker_id("B-2").is_none());
    }

    #[test]
    fn test_active_orders() {
        let store = OrderStore::new();
        let live = created_order();
        let live_ref = live.local_ref;
        let mut dead = created_order();
        dead.status = OrderStatus::Rejected;

        store.insert(live);
        store.insert(dead);
        store.acknowledge(&live_ref, "B-1");

        let active = store.active_orders();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].local_ref, live_ref);
    }
}
