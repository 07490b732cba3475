use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bg_common::Money;
use boost_engine::{
    test_utils::{seed_catalog, seed_user_with_balance},
    OrderFlowApi,
    SqliteDatabase,
};
use serde_json::{json, Value};

use super::helpers::{get_request, new_db, post_request};
use crate::routes::{CompleteOrderRoute, CreateOrderRoute, MyOrdersRoute, StartOrderRoute};

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(StartOrderRoute::<SqliteDatabase>::new())
            .service(CompleteOrderRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(OrderFlowApi::new(db)));
    }
}

#[actix_web::test]
async fn orders_require_identity_headers() {
    let db = new_db().await;
    let err = get_request(None, "/orders", configure(db)).await.expect_err("Expected error");
    assert_eq!(err, "No identity claims were attached to the request");
}

#[actix_web::test]
async fn placing_an_order_through_the_api() {
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "buyer@endpoint.test", Money::from_dollars(10)).await;
    let body = json!({
        "service_id": catalog.service.id,
        "service_option_id": catalog.option.id,
        "quantity": 3,
    });
    let (status, body) =
        post_request(Some((user.id, "customer")), "/orders", &body, configure(db.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let order = serde_json::from_str::<Value>(&body).expect("Response should be an order");
    assert_eq!(order["user_id"].as_i64(), Some(user.id));
    assert_eq!(order["total_price"].as_i64(), Some(600));
    assert_eq!(order["status"].as_str(), Some("Pending"));

    let (status, body) =
        get_request(Some((user.id, "customer")), "/orders", configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let orders = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(orders.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn an_unaffordable_order_is_a_bad_request() {
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "broke@endpoint.test", Money::from_cents(100)).await;
    let body = json!({
        "service_id": catalog.service.id,
        "service_option_id": catalog.option.id,
        "quantity": 5,
    });
    let (status, body) =
        post_request(Some((user.id, "customer")), "/orders", &body, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Insufficient funds"), "Unexpected body: {body}");
}

#[actix_web::test]
async fn customers_cannot_complete_orders() {
    let db = new_db().await;
    let err = post_request(Some((1, "customer")), "/orders/1/complete", &json!({}), configure(db))
        .await
        .expect_err("Request should have been rejected");
    assert_eq!(err, "Insufficient permissions");
}

#[actix_web::test]
async fn admins_drive_the_fulfilment_transitions() {
    let db = new_db().await;
    let catalog = seed_catalog(&db).await;
    let user = seed_user_with_balance(&db, "fulfil@endpoint.test", Money::from_dollars(10)).await;
    let body = json!({
        "service_id": catalog.service.id,
        "service_option_id": catalog.option.id,
        "quantity": 1,
    });
    let (status, body) =
        post_request(Some((user.id, "customer")), "/orders", &body, configure(db.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let order_id = serde_json::from_str::<Value>(&body).unwrap()["id"].as_i64().unwrap();

    let (status, body) =
        post_request(Some((99, "admin")), &format!("/orders/{order_id}/start"), &json!({}), configure(db.clone()))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let started = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(started["status"].as_str(), Some("Running"));

    let (status, body) =
        post_request(Some((99, "admin")), &format!("/orders/{order_id}/complete"), &json!({}), configure(db))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let completed = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(completed["status"].as_str(), Some("Completed"));
    assert_eq!(completed["completed_by"].as_str(), Some("admin:99"));
}

#[actix_web::test]
async fn starting_a_missing_order_is_not_found() {
    let db = new_db().await;
    let (status, _) =
        post_request(Some((1, "admin")), "/orders/999/start", &json!({}), configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
}
