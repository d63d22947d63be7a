//! Order ledger
//!
//! Orders live in one list under `dashboard_orders`, newest first. Orders
//! are never deleted; the only mutation is completing a processing order.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::database::{read_json, read_list_lenient, write_json, KeyValueStore, KEY_CURRENT_ORDER, KEY_ORDERS};
use crate::error::{StoreError, StoreResult};
use crate::model::{NewOrder, Order, OrderStatus};

/// Aggregates shown on the admin dashboard
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct LedgerSummary {
    pub total: usize,
    pub processing: usize,
    pub completed: usize,
    /// Completed revenue per currency code
    pub revenue: BTreeMap<String, f64>,
}

pub struct OrderLedger {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

/// `TX` followed by 9 random digits
fn generate_order_id() -> String {
    let digits: u32 = rand::rng().random_range(0..1_000_000_000);
    format!("TX{:09}", digits)
}

impl OrderLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// All orders, most recent first
    pub fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let raw: Vec<Value> = read_list_lenient(self.store.as_ref(), KEY_ORDERS)?;
        let total = raw.len();
        let orders: Vec<Order> = raw
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();

        if orders.len() != total {
            tracing::debug!(dropped = total - orders.len(), "Dropped malformed order records");
        }
        Ok(orders)
    }

    pub fn find_by_id(&self, order_id: &str) -> StoreResult<Option<Order>> {
        Ok(self.list_orders()?.into_iter().find(|o| o.id == order_id))
    }

    /// Records a new processing order at the front of the ledger
    ///
    /// 1. Validates quantity, amount and currency
    /// 2. Draws `TX` ids until one is not in the ledger
    /// 3. Prepends the order with status `processing` and today's date
    ///
    /// # Arguments
    ///
    /// * `fields` - checkout data; the currency code is upper-cased
    ///
    /// # Returns
    ///
    /// * `Ok(Order)` - the stored order
    /// * `Err(StoreError::Validation)` - zero quantity, negative amount or blank currency
    pub fn create_order(&self, fields: NewOrder) -> StoreResult<Order> {
        if fields.quantity == 0 {
            return Err(StoreError::Validation("quantity must be positive".to_string()));
        }
        if !fields.amount.is_finite() || fields.amount < 0.0 {
            return Err(StoreError::Validation("amount must be non-negative".to_string()));
        }
        if fields.currency.trim().is_empty() {
            return Err(StoreError::Validation("currency is required".to_string()));
        }

        let _guard = self.write_lock.lock().unwrap();
        let mut orders = self.list_orders()?;

        let mut id = generate_order_id();
        while orders.iter().any(|o| o.id == id) {
            id = generate_order_id();
        }

        let order = Order {
            id,
            customer_name: fields.customer_name,
            customer_email: fields.customer_email,
            service: fields.service,
            platform: fields.platform,
            account_url: fields.account_url,
            payment_method: fields.payment_method,
            notes: fields.notes,
            amount: fields.amount,
            currency: fields.currency.trim().to_uppercase(),
            quantity: fields.quantity,
            status: OrderStatus::Processing,
            date: Utc::now().date_naive(),
            transaction_id: None,
        };

        orders.insert(0, order.clone());
        write_json(self.store.as_ref(), KEY_ORDERS, &orders)?;

        tracing::info!(id = %order.id, amount = order.amount, currency = %order.currency, "Order created");
        Ok(order)
    }

    /// Moves an order to `status`, optionally recording the payment transaction
    ///
    /// Only `processing -> completed` is accepted. A transaction id, when
    /// given, replaces the stored one.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - status written
    /// * `Ok(false)` - no order has `order_id`
    /// * `Err(StoreError::InvalidTransition)` - any other transition; nothing is written
    pub fn set_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        transaction_id: Option<String>,
    ) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().unwrap();
        let mut orders = self.list_orders()?;

        let Some(order) = orders.iter_mut().find(|o| o.id == order_id) else {
            return Ok(false);
        };
        if !order.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }

        order.status = status;
        if transaction_id.is_some() {
            order.transaction_id = transaction_id;
        }
        write_json(self.store.as_ref(), KEY_ORDERS, &orders)?;

        tracing::info!(id = %order_id, %status, "Order status updated");
        Ok(true)
    }

    /// Remembers the order the checkout flow is currently paying for
    pub fn set_current_order(&self, order_id: &str) -> StoreResult<()> {
        write_json(self.store.as_ref(), KEY_CURRENT_ORDER, order_id)
    }

    /// Order id saved by [`set_current_order`](Self::set_current_order); a corrupt value reads as none
    pub fn current_order(&self) -> StoreResult<Option<String>> {
        match read_json::<String>(self.store.as_ref(), KEY_CURRENT_ORDER) {
            Err(StoreError::Corrupt { key, source }) => {
                tracing::warn!(%key, error = %source, "Corrupt current order id, ignoring");
                Ok(None)
            }
            other => other,
        }
    }

    /// Counts orders by status and sums completed revenue per currency
    ///
    /// Amounts in different currencies are never converted or added together.
    pub fn summary(&self) -> StoreResult<LedgerSummary> {
        let orders = self.list_orders()?;
        let mut summary = LedgerSummary {
            total: orders.len(),
            ..LedgerSummary::default()
        };

        for order in &orders {
            match order.status {
                OrderStatus::Processing => summary.processing += 1,
                OrderStatus::Completed => {
                    summary.completed += 1;
                    *summary.revenue.entry(order.currency.clone()).or_insert(0.0) += order.amount;
                }
            }
        }
        Ok(summary)
    }
}
