use std::{sync::Arc, time::Duration};

use futures_util::future::join_all;
use tokio::sync::mpsc;
use usdc_payment_engine::{
    db_types::{MicroUsdc, OrderId, OrderStatusType},
    events::{EventHandlers, EventHooks, EventProducers, OrderPaidEvent},
    order_objects::{CheckoutItem, CheckoutResult, DepositOutcome},
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        product_id,
        seed_catalog,
        TEST_DEPOSIT_ADDRESS,
    },
    DepositConfig,
    FingerprintAllocator,
    OrderFlowApi,
    OrderManagement,
    SqliteDatabase,
};

async fn setup(producers: EventProducers) -> (OrderFlowApi<SqliteDatabase>, CheckoutItem) {
    let url = random_db_path();
    let db = prepare_test_env(&url).await;
    let catalog = seed_catalog(&db).await;
    let item = CheckoutItem::new(product_id(&catalog, "Digital Badge"), 1);
    let api = OrderFlowApi::new(db, DepositConfig::new(TEST_DEPOSIT_ADDRESS), producers);
    (api, item)
}

async fn checkout(api: &OrderFlowApi<SqliteDatabase>, item: &CheckoutItem) -> CheckoutResult {
    api.create_order("dave@example.com", &[item.clone()]).await.expect("checkout failed")
}

async fn status_of(api: &OrderFlowApi<SqliteDatabase>, id: &OrderId) -> OrderStatusType {
    api.db().fetch_order(id).await.unwrap().unwrap().status
}

/// A hook that forwards every OrderPaid event into a channel
fn capture_paid_events() -> (EventProducers, mpsc::UnboundedReceiver<OrderPaidEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut hooks = EventHooks::default();
    hooks.on_order_paid(move |ev| {
        let tx = tx.clone();
        Box::pin(async move {
            let _ = tx.send(ev);
        })
    });
    let handlers = EventHandlers::new(10, hooks);
    let producers = handlers.producers();
    handlers.start_handlers();
    (producers, rx)
}

#[tokio::test]
async fn matching_deposit_pays_the_order_and_emits_event() {
    let (producers, mut events) = capture_paid_events();
    let (api, item) = setup(producers).await;
    let order = checkout(&api, &item).await;

    let outcome = api.handle_deposit(order.fingerprint_amount, "0xabc123").await.unwrap();
    let DepositOutcome::Matched(paid) = outcome else { panic!("Expected a match, got {outcome:?}") };
    assert_eq!(paid.id, order.order_id);
    assert_eq!(paid.status, OrderStatusType::Paid);
    assert_eq!(paid.deposit_tx_hash.as_deref(), Some("0xabc123"));

    let stored = api.db().fetch_order(&order.order_id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatusType::Paid);
    assert_eq!(stored.deposit_tx_hash.as_deref(), Some("0xabc123"));
    assert!(api.db().is_tx_hash_processed("0xabc123").await.unwrap());

    let ev = tokio::time::timeout(Duration::from_secs(5), events.recv()).await.unwrap().unwrap();
    assert_eq!(ev.order.id, order.order_id);
}

#[tokio::test]
async fn redelivered_deposit_is_a_no_op() {
    let (producers, mut events) = capture_paid_events();
    let (api, item) = setup(producers).await;
    let order = checkout(&api, &item).await;

    let first = api.handle_deposit(order.fingerprint_amount, "0xdup").await.unwrap();
    assert_eq!(first.order_id(), Some(&order.order_id));
    let second = api.handle_deposit(order.fingerprint_amount, "0xdup").await.unwrap();
    assert_eq!(second, DepositOutcome::Duplicate);

    assert!(tokio::time::timeout(Duration::from_secs(5), events.recv()).await.unwrap().is_some());
    // Only one event for the order
    assert!(tokio::time::timeout(Duration::from_millis(300), events.recv()).await.is_err());
}

#[tokio::test]
async fn duplicate_hash_cannot_pay_a_second_order() {
    let (api, item) = setup(EventProducers::default()).await;
    let a = checkout(&api, &item).await;
    let b = checkout(&api, &item).await;
    api.handle_deposit(a.fingerprint_amount, "0xonce").await.unwrap();
    let outcome = api.handle_deposit(b.fingerprint_amount, "0xonce").await.unwrap();
    assert_eq!(outcome, DepositOutcome::Duplicate);
    assert_eq!(status_of(&api, &b.order_id).await, OrderStatusType::PendingPayment);
}

#[tokio::test]
async fn concurrent_redeliveries_pay_exactly_once() {
    let (api, item) = setup(EventProducers::default()).await;
    let order = checkout(&api, &item).await;
    let outcomes = join_all((0..10).map(|_| {
        let api = api.clone();
        async move { api.handle_deposit(order.fingerprint_amount, "0xrace").await.unwrap() }
    }))
    .await;
    let matched = outcomes.iter().filter(|o| matches!(o, DepositOutcome::Matched(_))).count();
    assert_eq!(matched, 1);
    assert!(outcomes.iter().all(|o| matches!(o, DepositOutcome::Matched(_) | DepositOutcome::Duplicate)));
    assert_eq!(status_of(&api, &order.order_id).await, OrderStatusType::Paid);
}

#[tokio::test]
async fn concurrent_deposits_of_the_same_amount_flip_one_order() {
    let (api, item) = setup(EventProducers::default()).await;
    let order = checkout(&api, &item).await;
    let outcomes = join_all((0..10).map(|i| {
        let api = api.clone();
        async move { api.handle_deposit(order.fingerprint_amount, &format!("0xtx{i}")).await.unwrap() }
    }))
    .await;
    let matched = outcomes.iter().filter(|o| matches!(o, DepositOutcome::Matched(_))).count();
    assert_eq!(matched, 1);
    let no_match = outcomes.iter().filter(|o| **o == DepositOutcome::NoMatch).count();
    assert_eq!(no_match, 9);
}

#[tokio::test]
async fn unmatched_deposit_changes_nothing() {
    let (api, item) = setup(EventProducers::default()).await;
    let order = checkout(&api, &item).await;
    // Off by one micro-USDC
    let amount = order.fingerprint_amount + MicroUsdc::from(1);
    let outcome = api.handle_deposit(amount, "0xwrong").await.unwrap();
    assert_eq!(outcome, DepositOutcome::NoMatch);
    assert_eq!(status_of(&api, &order.order_id).await, OrderStatusType::PendingPayment);
    assert!(!api.db().is_tx_hash_processed("0xwrong").await.unwrap());
    // The base total does not match either
    let outcome = api.handle_deposit(order.total_amount, "0xtotal").await.unwrap();
    assert_eq!(outcome, DepositOutcome::NoMatch);
}

#[tokio::test]
async fn reused_fingerprint_after_payment_does_not_match() {
    let (api, item) = setup(EventProducers::default()).await;
    let order = checkout(&api, &item).await;
    api.handle_deposit(order.fingerprint_amount, "0xfirst").await.unwrap();
    let outcome = api.handle_deposit(order.fingerprint_amount, "0xsecond").await.unwrap();
    assert_eq!(outcome, DepositOutcome::NoMatch);
    let stored = api.db().fetch_order(&order.order_id).await.unwrap().unwrap();
    assert_eq!(stored.deposit_tx_hash.as_deref(), Some("0xfirst"));
}

#[tokio::test]
async fn empty_hashes_are_not_deduplicated() {
    let (api, item) = setup(EventProducers::default()).await;
    let api = api.with_allocator(FingerprintAllocator::new(Arc::new(|| 77)));
    let a = checkout(&api, &item).await;
    let outcome = api.handle_deposit(a.fingerprint_amount, "").await.unwrap();
    assert_eq!(outcome.order_id(), Some(&a.order_id));
    let stored = api.db().fetch_order(&a.order_id).await.unwrap().unwrap();
    assert_eq!(stored.deposit_tx_hash, None);

    // The fingerprint is free again, and a second hash-less deposit can pay the new order
    let b = checkout(&api, &item).await;
    assert_eq!(b.fingerprint_amount, a.fingerprint_amount);
    let outcome = api.handle_deposit(b.fingerprint_amount, "  ").await.unwrap();
    assert_eq!(outcome.order_id(), Some(&b.order_id));
}

#[tokio::test]
async fn non_positive_amounts_are_ignored() {
    let (api, item) = setup(EventProducers::default()).await;
    checkout(&api, &item).await;
    assert_eq!(api.handle_deposit(MicroUsdc::from(0), "0xzero").await.unwrap(), DepositOutcome::NoMatch);
    assert_eq!(api.handle_deposit(MicroUsdc::from(-1_000_001), "0xneg").await.unwrap(), DepositOutcome::NoMatch);
}
