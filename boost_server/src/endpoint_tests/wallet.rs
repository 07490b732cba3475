use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bg_common::Money;
use boost_engine::{
    test_utils::{seed_catalog, seed_user_with_balance},
    CatalogApi,
    SqliteDatabase,
    WalletApi,
};
use serde_json::{json, Value};

use super::helpers::{get_request, new_db, post_request};
use crate::routes::{DepositRoute, MyBalanceRoute, MyHistoryRoute};

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(MyBalanceRoute::<SqliteDatabase>::new())
            .service(MyHistoryRoute::<SqliteDatabase>::new())
            .service(DepositRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(WalletApi::new(db.clone())))
            .app_data(web::Data::new(CatalogApi::new(db)));
    }
}

#[actix_web::test]
async fn the_balance_endpoint_reports_the_wallet() {
    let db = new_db().await;
    let user = seed_user_with_balance(&db, "balance@endpoint.test", Money::from_dollars(5)).await;
    let (status, body) =
        get_request(Some((user.id, "customer")), "/balance", configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let balance = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(balance["balance"].as_i64(), Some(500));
    assert_eq!(balance["currency"].as_str(), Some("USD"));
}

#[actix_web::test]
async fn an_admin_deposit_shows_up_in_the_customer_history() {
    let db = new_db().await;
    let user = seed_user_with_balance(&db, "deposit@endpoint.test", Money::default()).await;
    let body = json!({ "user_id": user.id, "amount": 2500 });
    let (status, _) =
        post_request(Some((1, "admin")), "/deposit", &body, configure(db.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        get_request(Some((user.id, "customer")), "/history", configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let history = serde_json::from_str::<Value>(&body).unwrap();
    let entries = history.as_array().expect("History should be a list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["transaction_type"].as_str(), Some("AdminDeposit"));
    assert_eq!(entries[0]["new_balance"].as_i64(), Some(2500));
}

#[actix_web::test]
async fn customers_cannot_make_deposits() {
    let db = new_db().await;
    let body = json!({ "user_id": 1, "amount": 2500 });
    let err = post_request(Some((1, "customer")), "/deposit", &body, configure(db))
        .await
        .expect_err("Request should have been rejected");
    assert_eq!(err, "Insufficient permissions");
}

#[actix_web::test]
async fn a_deposit_for_a_missing_user_is_not_found() {
    let db = new_db().await;
    let body = json!({ "user_id": 999, "amount": 100 });
    let (status, _) =
        post_request(Some((1, "admin")), "/deposit", &body, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn a_discount_override_changes_the_quoted_price() {
    use crate::routes::{CreateOrderRoute, SetDiscountRoute};
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "vip@endpoint.test", Money::from_dollars(10)).await;
    let configure_all = |db: SqliteDatabase| {
        move |cfg: &mut ServiceConfig| {
            cfg.service(SetDiscountRoute::<SqliteDatabase>::new())
                .service(CreateOrderRoute::<SqliteDatabase>::new())
                .app_data(web::Data::new(CatalogApi::new(db.clone())))
                .app_data(web::Data::new(boost_engine::OrderFlowApi::new(db)));
        }
    };
    let discount = json!({ "user_id": user.id, "service_option_id": catalog.option.id, "discount": 1550 });
    let req = actix_web::test::TestRequest::put()
        .uri("/discounts")
        .insert_header(("x-user-id", "1"))
        .insert_header(("x-user-roles", "admin"))
        .set_json(&discount);
    let app = actix_web::App::new().wrap(crate::middleware::IdentityMiddlewareFactory).configure(configure_all(db.clone()));
    let service = actix_web::test::init_service(app).await;
    let res = actix_web::test::call_service(&service, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    // A 15.50% discount takes the $2.00 option to $1.69 a unit.
    let order = json!({
        "service_id": catalog.service.id,
        "service_option_id": catalog.option.id,
        "quantity": 1,
    });
    let (status, body) =
        post_request(Some((user.id, "customer")), "/orders", &order, configure_all(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let order = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(order["unit_price"].as_i64(), Some(169));
}
