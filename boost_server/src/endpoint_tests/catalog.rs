use actix_web::{http::StatusCode, web, web::ServiceConfig};
use boost_engine::{CatalogApi, OrderFlowApi, SqliteDatabase, WalletApi};
use serde_json::{json, Value};

use super::helpers::{new_db, post_request};
use crate::routes::{CreateOrderRoute, CreateServiceOptionRoute, CreateServiceRoute, DepositRoute, RegisterUserRoute};

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(RegisterUserRoute::<SqliteDatabase>::new())
            .service(CreateServiceRoute::<SqliteDatabase>::new())
            .service(CreateServiceOptionRoute::<SqliteDatabase>::new())
            .service(DepositRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(WalletApi::new(db.clone())))
            .app_data(web::Data::new(CatalogApi::new(db.clone())))
            .app_data(web::Data::new(OrderFlowApi::new(db)));
    }
}

// Provisions a store from nothing using admin endpoints only, then places an order as the new
// customer.
#[actix_web::test]
async fn a_store_can_be_provisioned_over_http() {
    let admin = Some((1, "admin"));
    let db = new_db().await;

    let (status, body) = post_request(admin, "/users", &json!({"email": "new@catalog.test"}), configure(db.clone()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let user = serde_json::from_str::<Value>(&body).unwrap();
    let user_id = user["id"].as_i64().unwrap();
    assert_eq!(user["balance"].as_i64(), Some(0));
    assert_eq!(user["is_active"].as_bool(), Some(false));

    let (status, body) = post_request(admin, "/services", &json!({"name": "TikTok", "icon": null}), configure(db.clone()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let service_id = serde_json::from_str::<Value>(&body).unwrap()["id"].as_i64().unwrap();

    let option = json!({
        "name": "Followers",
        "unit_price": 150,
        "discount": 1000,
        "required_fields": {"profile": "url"},
    });
    let (status, body) =
        post_request(admin, &format!("/services/{service_id}/options"), &option, configure(db.clone()))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let option = serde_json::from_str::<Value>(&body).unwrap();
    let option_id = option["id"].as_i64().unwrap();
    assert_eq!(option["service_id"].as_i64(), Some(service_id));

    let (status, _) =
        post_request(admin, "/deposit", &json!({"user_id": user_id, "amount": 1000}), configure(db.clone()))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);

    // 10% off the $1.50 unit price is $1.35.
    let order = json!({"service_id": service_id, "service_option_id": option_id, "quantity": 2});
    let (status, body) = post_request(Some((user_id, "customer")), "/orders", &order, configure(db))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let order = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(order["unit_price"].as_i64(), Some(135));
    assert_eq!(order["total_price"].as_i64(), Some(270));
}

#[actix_web::test]
async fn a_zero_priced_option_is_rejected() {
    let db = new_db().await;
    let (status, _) = post_request(Some((1, "admin")), "/services", &json!({"name": "X", "icon": null}), configure(db.clone()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let option = json!({"name": "Free stuff", "unit_price": 0});
    let (status, _) =
        post_request(Some((1, "admin")), "/services/1/options", &option, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
