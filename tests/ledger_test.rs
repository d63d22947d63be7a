//! Tests for the order ledger

use std::sync::Arc;

use boostdesk::database::{KeyValueStore, MemoryStore, KEY_ORDERS};
use boostdesk::error::StoreError;
use boostdesk::ledger::OrderLedger;
use boostdesk::model::{NewOrder, OrderStatus};

fn setup_ledger() -> (OrderLedger, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (OrderLedger::new(store.clone()), store)
}

fn new_order(amount: f64, currency: &str) -> NewOrder {
    NewOrder {
        customer_name: "Jamie Doe".to_string(),
        customer_email: "jamie@example.com".to_string(),
        service: "Followers".to_string(),
        platform: "instagram".to_string(),
        account_url: "https://instagram.com/jamie".to_string(),
        payment_method: "paypal".to_string(),
        notes: String::new(),
        amount,
        currency: currency.to_string(),
        quantity: 500,
    }
}

#[test]
fn test_create_then_find_is_processing() {
    let (ledger, _store) = setup_ledger();

    let order = ledger.create_order(new_order(25.0, "usd")).unwrap();

    assert!(order.id.starts_with("TX"));
    assert_eq!(order.id.len(), 11);
    assert!(order.id[2..].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(order.currency, "USD");

    let found = ledger.find_by_id(&order.id).unwrap().unwrap();
    assert_eq!(found.status, OrderStatus::Processing);
    assert_eq!(found.transaction_id, None);
}

#[test]
fn test_orders_are_most_recent_first() {
    let (ledger, _store) = setup_ledger();

    let first = ledger.create_order(new_order(1.0, "USD")).unwrap();
    let second = ledger.create_order(new_order(2.0, "USD")).unwrap();

    let ids: Vec<String> = ledger.list_orders().unwrap().into_iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[test]
fn test_complete_order_with_transaction_id() {
    let (ledger, _store) = setup_ledger();
    let order = ledger.create_order(new_order(10.0, "EUR")).unwrap();

    let updated = ledger
        .set_status(&order.id, OrderStatus::Completed, Some("TXN1".to_string()))
        .unwrap();

    assert!(updated);
    let found = ledger.find_by_id(&order.id).unwrap().unwrap();
    assert_eq!(found.status, OrderStatus::Completed);
    assert_eq!(found.transaction_id.as_deref(), Some("TXN1"));
}

#[test]
fn test_set_status_unknown_order_is_noop() {
    let (ledger, store) = setup_ledger();
    ledger.create_order(new_order(10.0, "USD")).unwrap();
    let before = store.get(KEY_ORDERS).unwrap();

    let updated = ledger
        .set_status("TX000000000", OrderStatus::Completed, None)
        .unwrap();

    assert!(!updated);
    assert_eq!(store.get(KEY_ORDERS).unwrap(), before);
}

#[test]
fn test_status_transitions_are_monotonic() {
    let (ledger, _store) = setup_ledger();
    let order = ledger.create_order(new_order(10.0, "USD")).unwrap();
    ledger
        .set_status(&order.id, OrderStatus::Completed, Some("TXN1".to_string()))
        .unwrap();

    let back = ledger.set_status(&order.id, OrderStatus::Processing, None);
    assert!(matches!(
        back,
        Err(StoreError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Processing
        })
    ));

    let repeat = ledger.set_status(&order.id, OrderStatus::Completed, Some("TXN2".to_string()));
    assert!(matches!(repeat, Err(StoreError::InvalidTransition { .. })));

    let found = ledger.find_by_id(&order.id).unwrap().unwrap();
    assert_eq!(found.transaction_id.as_deref(), Some("TXN1"));
}

#[test]
fn test_create_order_validates_fields() {
    let (ledger, _store) = setup_ledger();

    let mut zero = new_order(10.0, "USD");
    zero.quantity = 0;
    assert!(matches!(ledger.create_order(zero), Err(StoreError::Validation(_))));

    assert!(matches!(
        ledger.create_order(new_order(-1.0, "USD")),
        Err(StoreError::Validation(_))
    ));
    assert!(matches!(
        ledger.create_order(new_order(1.0, " ")),
        Err(StoreError::Validation(_))
    ));
    assert!(ledger.list_orders().unwrap().is_empty());
}

#[test]
fn test_corrupt_ledger_reads_as_empty() {
    let (ledger, store) = setup_ledger();
    store.set(KEY_ORDERS, "not json").unwrap();

    assert!(ledger.list_orders().unwrap().is_empty());
    assert!(ledger.find_by_id("TX123456789").unwrap().is_none());
}

#[test]
fn test_current_order_round_trip() {
    let (ledger, _store) = setup_ledger();
    assert_eq!(ledger.current_order().unwrap(), None);

    let order = ledger.create_order(new_order(3.0, "USD")).unwrap();
    ledger.set_current_order(&order.id).unwrap();

    assert_eq!(ledger.current_order().unwrap(), Some(order.id));
}

#[test]
fn test_summary_counts_and_revenue() {
    let (ledger, _store) = setup_ledger();
    let a = ledger.create_order(new_order(10.0, "USD")).unwrap();
    let b = ledger.create_order(new_order(5.5, "USD")).unwrap();
    let c = ledger.create_order(new_order(7.0, "EUR")).unwrap();
    ledger.create_order(new_order(100.0, "USD")).unwrap();

    for id in [&a.id, &b.id, &c.id] {
        ledger.set_status(id, OrderStatus::Completed, None).unwrap();
    }

    let summary = ledger.summary().unwrap();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.processing, 1);
    assert_eq!(summary.revenue.get("USD"), Some(&15.5));
    assert_eq!(summary.revenue.get("EUR"), Some(&7.0));
}
