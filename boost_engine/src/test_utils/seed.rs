use bg_common::Money;
use serde_json::json;

use crate::{
    db_types::{NewService, NewServiceOption, NewUser, Period, Service, ServiceOption, TransactionType, User},
    traits::StoreDatabase,
};

pub struct SeededCatalog {
    pub service: Service,
    /// A plain option: no discount, daily period, no interval needed.
    pub option: ServiceOption,
    /// An option that requires a delivery interval.
    pub interval_option: ServiceOption,
}

/// Seeds a small catalog: one service with a plain $2.00 option and a $1.00 option that
/// requires a delivery interval.
pub async fn seed_catalog<B: StoreDatabase>(db: &B) -> SeededCatalog {
    let service =
        db.create_service(NewService { name: "YouTube".into(), icon: None }).await.expect("Error creating service");
    let option = db
        .create_service_option(NewServiceOption {
            service_id: service.id,
            name: "Views".into(),
            unit_price: Money::from_cents(200),
            discount: 0.into(),
            period: Some(Period::Day),
            is_interval_required: false,
            required_fields: json!({"link": "url"}),
        })
        .await
        .expect("Error creating service option");
    let interval_option = db
        .create_service_option(NewServiceOption {
            service_id: service.id,
            name: "Likes".into(),
            unit_price: Money::from_cents(100),
            discount: 0.into(),
            period: None,
            is_interval_required: true,
            required_fields: json!({"link": "url"}),
        })
        .await
        .expect("Error creating service option");
    SeededCatalog { service, option, interval_option }
}

/// Registers a user and, when `balance` is positive, credits it through the normal deposit path
/// so the ledger chain starts with a `Deposit` entry.
pub async fn seed_user_with_balance<B: StoreDatabase>(db: &B, email: &str, balance: Money) -> User {
    let user = db.register_user(NewUser::new(email)).await.expect("Error registering user");
    if balance.is_positive() {
        db.credit_balance(user.id, balance, TransactionType::Deposit, None).await.expect("Error seeding balance");
    }
    db.fetch_user(user.id).await.expect("Error fetching user").expect("User should exist")
}
