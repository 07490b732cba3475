use std::time::Duration;

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bg_common::Money;
use boost_engine::{test_utils::seed_user_with_balance, SqliteDatabase, TopUpApi, WalletApi};
use plisio_tools::{PlisioApi, PlisioConfig};
use serde_json::{json, Value};

use super::helpers::{get_request, new_db, post_request};
use crate::{
    integrations::PlisioGateway,
    routes::{CreateTopUpRoute, MyTopUpsRoute},
};

/// A gateway client pointed at a port nothing listens on, so every invoice request fails with a
/// connection error instead of going out to the network.
fn dead_gateway() -> PlisioGateway {
    let config = PlisioConfig {
        api_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_millis(250),
        ..PlisioConfig::default()
    };
    PlisioGateway::new(PlisioApi::new(config).expect("Error creating Plisio client"))
}

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let top_up_api = TopUpApi::new(db.clone(), dead_gateway(), "https://store.test/webhook/plisio".into());
        cfg.service(CreateTopUpRoute::<SqliteDatabase>::new())
            .service(MyTopUpsRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(top_up_api))
            .app_data(web::Data::new(WalletApi::new(db)));
    }
}

#[actix_web::test]
async fn an_unreachable_gateway_is_a_bad_gateway_and_records_nothing() {
    let db = new_db().await;
    let user = seed_user_with_balance(&db, "downstream@endpoint.test", Money::default()).await;
    let body = json!({ "amount": 2500 });
    let (status, body) =
        post_request(Some((user.id, "customer")), "/top-ups", &body, configure(db.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let detail = serde_json::from_str::<Value>(&body).unwrap();
    assert!(detail["detail"].as_str().unwrap().contains("gateway is unavailable"), "Unexpected body: {detail}");

    // The failed request left no pending top-up behind.
    let (status, body) =
        get_request(Some((user.id, "customer")), "/top-ups", configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let top_ups = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(top_ups.as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn non_positive_amounts_are_rejected_before_the_gateway_is_called() {
    let db = new_db().await;
    let user = seed_user_with_balance(&db, "zero@endpoint.test", Money::default()).await;
    // The gateway here can only fail with 502, so a 400 proves validation ran first.
    let body = json!({ "amount": 0 });
    let (status, _) =
        post_request(Some((user.id, "customer")), "/top-ups", &body, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn a_top_up_for_an_unknown_user_is_not_found() {
    let db = new_db().await;
    let body = json!({ "amount": 2500 });
    let (status, _) =
        post_request(Some((999, "customer")), "/top-ups", &body, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
}
