use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bg_common::{Money, Secret};
use boost_engine::{
    db_types::NewTopUp,
    test_utils::seed_user_with_balance,
    SqliteDatabase,
    StoreDatabase,
    TopUpApi,
    WalletApi,
};
use plisio_tools::{helpers::sign_callback, PlisioApi};
use serde_json::{json, Value};

use super::helpers::{get_request, new_db, post_request};
use crate::{
    config::ServerConfig,
    integrations::PlisioGateway,
    payment_routes::PlisioWebhookRoute,
    routes::MyBalanceRoute,
};

const HMAC_SECRET: &str = "endpoint-test-secret";

fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.plisio.hmac_secret = Secret::new(HMAC_SECRET.to_string());
    config
}

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let config = test_config();
        let plisio = PlisioApi::new(config.plisio.clone()).expect("Error creating Plisio client");
        let gateway = PlisioGateway::new(plisio);
        let top_up_api = TopUpApi::new(db.clone(), gateway, config.plisio.callback_url.clone());
        cfg.service(PlisioWebhookRoute::<SqliteDatabase>::new())
            .service(MyBalanceRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(config))
            .app_data(web::Data::new(top_up_api))
            .app_data(web::Data::new(WalletApi::new(db)));
    }
}

fn signed_notification(invoice_id: &str, status: &str) -> Value {
    let mut payload = json!({
        "txn_id": invoice_id,
        "status": status,
        "amount": "25.00",
        "currency": "BTC",
    });
    let hash = sign_callback(HMAC_SECRET, &payload);
    payload["verify_hash"] = Value::String(hash);
    payload
}

async fn pending_top_up(db: &SqliteDatabase, email: &str, invoice_id: &str) -> i64 {
    let user = seed_user_with_balance(db, email, Money::default()).await;
    db.insert_top_up(NewTopUp {
        user_id: user.id,
        amount: Money::from_cents(2500),
        currency: user.currency.clone(),
        invoice_id: invoice_id.to_string(),
    })
    .await
    .expect("Error inserting top-up");
    user.id
}

#[actix_web::test]
async fn a_signed_paid_notification_credits_the_wallet() {
    let db = new_db().await;
    let user_id = pending_top_up(&db, "paid@webhook.test", "inv-paid-1").await;
    let payload = signed_notification("inv-paid-1", "completed");
    let (status, _) = post_request(None, "/plisio", &payload, configure(db.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        get_request(Some((user_id, "customer")), "/balance", configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let balance = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(balance["balance"].as_i64(), Some(2500));
}

#[actix_web::test]
async fn a_redelivered_notification_does_not_credit_twice() {
    let db = new_db().await;
    let user_id = pending_top_up(&db, "redelivery@webhook.test", "inv-paid-2").await;
    let payload = signed_notification("inv-paid-2", "completed");
    for _ in 0..3 {
        let (status, _) =
            post_request(None, "/plisio", &payload, configure(db.clone())).await.expect("Request failed");
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) = get_request(Some((user_id, "customer")), "/balance", configure(db)).await.expect("Request failed");
    let balance = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(balance["balance"].as_i64(), Some(2500));
}

#[actix_web::test]
async fn a_tampered_notification_is_forbidden() {
    let db = new_db().await;
    let user_id = pending_top_up(&db, "tampered@webhook.test", "inv-tampered").await;
    let mut payload = signed_notification("inv-tampered", "completed");
    payload["amount"] = Value::String("9925.00".into());
    let (status, _) = post_request(None, "/plisio", &payload, configure(db.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = get_request(Some((user_id, "customer")), "/balance", configure(db)).await.expect("Request failed");
    let balance = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(balance["balance"].as_i64(), Some(0));
}

#[actix_web::test]
async fn an_unsigned_notification_is_forbidden() {
    let db = new_db().await;
    let payload = json!({ "txn_id": "inv-unsigned", "status": "completed" });
    let (status, _) = post_request(None, "/plisio", &payload, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn an_unknown_invoice_is_not_found() {
    let db = new_db().await;
    let payload = signed_notification("inv-never-created", "completed");
    let (status, _) = post_request(None, "/plisio", &payload, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn a_failed_notification_closes_without_credit() {
    let db = new_db().await;
    let user_id = pending_top_up(&db, "failed@webhook.test", "inv-failed").await;
    let payload = signed_notification("inv-failed", "error");
    let (status, _) = post_request(None, "/plisio", &payload, configure(db.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_request(Some((user_id, "customer")), "/balance", configure(db)).await.expect("Request failed");
    let balance = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(balance["balance"].as_i64(), Some(0));
}

#[actix_web::test]
async fn in_flight_statuses_are_acknowledged_but_ignored() {
    let db = new_db().await;
    let user_id = pending_top_up(&db, "pending@webhook.test", "inv-pending").await;
    let payload = signed_notification("inv-pending", "confirming");
    let (status, body) = post_request(None, "/plisio", &payload, configure(db.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ignored"), "Unexpected body: {body}");

    let (_, body) = get_request(Some((user_id, "customer")), "/balance", configure(db)).await.expect("Request failed");
    let balance = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(balance["balance"].as_i64(), Some(0));
}
