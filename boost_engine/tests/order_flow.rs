use bg_common::Money;
use boost_engine::{
    db_types::{NewOrder, OrderStatusType, TransactionType},
    test_utils::{prepare_test_env, random_db_path, seed_catalog, seed_user_with_balance},
    NewOrderRequest,
    OrderError,
    OrderFlowApi,
    SqliteDatabase,
    StoreDatabase,
    WalletApi,
    WalletError,
};
use serde_json::json;

async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

fn order_request(service_id: i64, option_id: i64, quantity: i64) -> NewOrderRequest {
    NewOrderRequest {
        service_id,
        service_option_id: option_id,
        quantity,
        custom_data: json!({"link": "https://youtube.com/watch?v=abc"}),
        period: None,
        interval: None,
        notes: String::new(),
    }
}

#[tokio::test]
async fn placing_an_order_debits_the_wallet_and_appends_to_the_ledger() {
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "alice@example.com", Money::from_dollars(10)).await;
    let api = OrderFlowApi::new(db.clone());
    let wallet = WalletApi::new(db.clone());

    let order = api.place_order(user.id, order_request(catalog.service.id, catalog.option.id, 3)).await.unwrap();
    assert_eq!(order.status, OrderStatusType::Pending);
    assert_eq!(order.unit_price, Money::from_cents(200));
    assert_eq!(order.total_price, Money::from_cents(600));
    assert_eq!(wallet.balance(user.id).await.unwrap(), Money::from_dollars(4));

    let history = wallet.history(user.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].transaction_type, TransactionType::Deposit);
    let purchase = &history[1];
    assert_eq!(purchase.transaction_type, TransactionType::Purchase);
    assert_eq!(purchase.order_id, Some(order.id));
    assert_eq!(purchase.old_balance, Money::from_dollars(10));
    assert_eq!(purchase.new_balance, Money::from_dollars(4));
}

#[tokio::test]
async fn user_discount_override_beats_the_option_discount() {
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "bob@example.com", Money::from_dollars(10)).await;
    // Option discount is 0; a 15% override should win.
    db.set_user_discount(user.id, catalog.option.id, 1500.into()).await.unwrap();
    let api = OrderFlowApi::new(db.clone());

    let order = api.place_order(user.id, order_request(catalog.service.id, catalog.option.id, 3)).await.unwrap();
    assert_eq!(order.unit_price, Money::from_cents(170));
    assert_eq!(order.total_price, Money::from_cents(510));
}

#[tokio::test]
async fn insufficient_funds_leaves_no_trace() {
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "carol@example.com", Money::from_dollars(5)).await;
    db.set_user_discount(user.id, catalog.option.id, 1500.into()).await.unwrap();
    let api = OrderFlowApi::new(db.clone());
    let wallet = WalletApi::new(db.clone());

    // $1.70 * 3 = $5.10, ten cents more than the balance.
    let err = api.place_order(user.id, order_request(catalog.service.id, catalog.option.id, 3)).await.unwrap_err();
    match err {
        OrderError::Wallet(WalletError::InsufficientFunds { required, available }) => {
            assert_eq!(required, Money::from_cents(510));
            assert_eq!(available, Money::from_dollars(5));
        },
        other => panic!("Expected InsufficientFunds, got {other:?}"),
    }
    assert_eq!(wallet.balance(user.id).await.unwrap(), Money::from_dollars(5));
    assert!(api.orders_for_user(user.id).await.unwrap().is_empty());
    // Only the seed deposit is in the ledger.
    assert_eq!(wallet.history(user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn non_positive_quantities_are_rejected_before_anything_is_persisted() {
    use boost_engine::pricing::PricingError;
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "qty@example.com", Money::from_dollars(10)).await;
    let api = OrderFlowApi::new(db.clone());
    let wallet = WalletApi::new(db.clone());

    for quantity in [0, -3] {
        let err =
            api.place_order(user.id, order_request(catalog.service.id, catalog.option.id, quantity)).await.unwrap_err();
        assert!(matches!(err, OrderError::Pricing(PricingError::InvalidQuantity(q)) if q == quantity));
    }
    assert_eq!(wallet.balance(user.id).await.unwrap(), Money::from_dollars(10));
    assert!(api.orders_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn interval_is_required_and_bounded_when_the_option_demands_it() {
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "dave@example.com", Money::from_dollars(50)).await;
    let api = OrderFlowApi::new(db.clone());

    let mut req = order_request(catalog.service.id, catalog.interval_option.id, 5);
    let err = api.place_order(user.id, req.clone()).await.unwrap_err();
    assert!(matches!(err, OrderError::IntervalRequired));

    req.interval = Some(0);
    assert!(matches!(api.place_order(user.id, req.clone()).await.unwrap_err(), OrderError::IntervalRequired));
    req.interval = Some(61);
    assert!(matches!(api.place_order(user.id, req.clone()).await.unwrap_err(), OrderError::IntervalRequired));

    req.interval = Some(30);
    let order = api.place_order(user.id, req).await.unwrap();
    assert_eq!(order.interval, Some(30));
}

#[tokio::test]
async fn interval_is_dropped_when_the_option_does_not_use_it() {
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "erin@example.com", Money::from_dollars(10)).await;
    let api = OrderFlowApi::new(db.clone());

    let mut req = order_request(catalog.service.id, catalog.option.id, 1);
    req.interval = Some(10);
    let order = api.place_order(user.id, req).await.unwrap();
    assert_eq!(order.interval, None);
}

#[tokio::test]
async fn an_option_must_belong_to_the_requested_service() {
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "frank@example.com", Money::from_dollars(10)).await;
    let api = OrderFlowApi::new(db.clone());

    // Real option, wrong service.
    let err =
        api.place_order(user.id, order_request(catalog.service.id + 1, catalog.option.id, 1)).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidServiceOption));
    // Option that does not exist at all.
    let err = api.place_order(user.id, order_request(catalog.service.id, 9999, 1)).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidServiceOption));
}

#[tokio::test]
async fn the_order_state_machine_only_moves_forward() {
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "grace@example.com", Money::from_dollars(10)).await;
    let api = OrderFlowApi::new(db.clone());

    let order = api.place_order(user.id, order_request(catalog.service.id, catalog.option.id, 1)).await.unwrap();

    let running = api.start_order(order.id).await.unwrap();
    assert_eq!(running.status, OrderStatusType::Running);
    // The seeded option bills daily, so starting stamps an auto-completion deadline.
    assert!(running.completed_at.is_some());

    // Starting again is invalid.
    let err = api.start_order(order.id).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { from: OrderStatusType::Running, .. }));

    let done = api.complete_order(order.id, "admin@example.com").await.unwrap();
    assert_eq!(done.status, OrderStatusType::Completed);
    assert_eq!(done.completed_by.as_deref(), Some("admin@example.com"));
    assert!(done.completed_at.is_some());

    // Nothing leaves Completed.
    assert!(matches!(
        api.complete_order(order.id, "admin@example.com").await.unwrap_err(),
        OrderError::InvalidTransition { from: OrderStatusType::Completed, .. }
    ));
    assert!(matches!(
        api.start_order(order.id).await.unwrap_err(),
        OrderError::InvalidTransition { from: OrderStatusType::Completed, .. }
    ));
}

#[tokio::test]
async fn a_pending_order_can_be_completed_directly() {
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "heidi@example.com", Money::from_dollars(10)).await;
    let api = OrderFlowApi::new(db.clone());

    let order = api.place_order(user.id, order_request(catalog.service.id, catalog.option.id, 1)).await.unwrap();
    let done = api.complete_order(order.id, "admin@example.com").await.unwrap();
    assert_eq!(done.status, OrderStatusType::Completed);
}

#[tokio::test]
async fn unknown_orders_are_reported_as_not_found() {
    let db = new_db().await;
    let api = OrderFlowApi::new(db.clone());
    assert!(matches!(api.start_order(404).await.unwrap_err(), OrderError::OrderNotFound(404)));
    assert!(matches!(api.complete_order(404, "admin").await.unwrap_err(), OrderError::OrderNotFound(404)));
}

#[tokio::test]
async fn the_overdue_sweep_completes_expired_running_orders() {
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "ivan@example.com", Money::from_dollars(10)).await;
    let api = OrderFlowApi::new(db.clone());

    let order = api.place_order(user.id, order_request(catalog.service.id, catalog.option.id, 1)).await.unwrap();
    api.start_order(order.id).await.unwrap();
    // Nothing is overdue yet.
    assert!(api.auto_complete_overdue().await.unwrap().is_empty());

    // Backdate the deadline and sweep again.
    sqlx::query("UPDATE orders SET completed_at = datetime('now', '-1 hour') WHERE id = $1")
        .bind(order.id)
        .execute(db.pool())
        .await
        .unwrap();
    let completed = api.auto_complete_overdue().await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, order.id);
    assert_eq!(completed[0].status, OrderStatusType::Completed);
    assert_eq!(completed[0].completed_by.as_deref(), Some("auto"));
}

#[tokio::test]
async fn a_failed_order_insert_rolls_back_the_debit() {
    let db = new_db().await;
    let _catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "judy@example.com", Money::from_dollars(10)).await;
    let wallet = WalletApi::new(db.clone());

    // Bypass the order flow validation with an order that violates the service FK. The debit
    // runs first in the transaction and must not survive the failed insert.
    let bad = NewOrder {
        user_id: user.id,
        service_id: 9999,
        service_option_id: 9999,
        custom_data: json!({}),
        quantity: 1,
        unit_price: Money::from_dollars(2),
        total_price: Money::from_dollars(2),
        currency: user.currency.clone(),
        period: None,
        interval: None,
        notes: String::new(),
    };
    db.create_paid_order(bad).await.unwrap_err();
    assert_eq!(wallet.balance(user.id).await.unwrap(), Money::from_dollars(10));
    assert_eq!(wallet.history(user.id).await.unwrap().len(), 1);
}
