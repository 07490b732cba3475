use log::debug;
use sqlx::{types::Json, SqliteConnection};

use crate::{
    db_types::{DiscountBps, NewService, NewServiceOption, Service, ServiceOption},
    traits::AccountApiError,
};

pub async fn insert_service(service: NewService, conn: &mut SqliteConnection) -> Result<Service, AccountApiError> {
    let service = sqlx::query_as::<_, Service>(r#"INSERT INTO services (name, icon) VALUES ($1, $2) RETURNING *"#)
        .bind(&service.name)
        .bind(&service.icon)
        .fetch_one(conn)
        .await?;
    debug!("🗃️ Service #{} ({}) created", service.id, service.name);
    Ok(service)
}

pub async fn fetch_service(service_id: i64, conn: &mut SqliteConnection) -> Result<Option<Service>, AccountApiError> {
    let service = sqlx::query_as::<_, Service>(r#"SELECT id, name, icon, created_at FROM services WHERE id = $1"#)
        .bind(service_id)
        .fetch_optional(conn)
        .await?;
    Ok(service)
}

pub async fn insert_service_option(
    option: NewServiceOption,
    currency: &str,
    conn: &mut SqliteConnection,
) -> Result<ServiceOption, AccountApiError> {
    if !option.unit_price.is_positive() {
        return Err(AccountApiError::QueryError(format!(
            "The unit price must be positive. Got {}",
            option.unit_price
        )));
    }
    if !option.discount.is_valid() {
        return Err(AccountApiError::QueryError(format!("Discount {} is outside [0%, 100%]", option.discount)));
    }
    let option = sqlx::query_as::<_, ServiceOption>(
        r#"INSERT INTO service_options
           (service_id, name, unit_price, currency, discount, period, is_interval_required, required_fields)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
           RETURNING *"#,
    )
    .bind(option.service_id)
    .bind(&option.name)
    .bind(option.unit_price)
    .bind(currency)
    .bind(option.discount)
    .bind(option.period)
    .bind(option.is_interval_required)
    .bind(Json(option.required_fields))
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Service option #{} ({}) created for service #{}", option.id, option.name, option.service_id);
    Ok(option)
}

pub async fn fetch_service_option(
    option_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ServiceOption>, AccountApiError> {
    let option = sqlx::query_as::<_, ServiceOption>(
        r#"SELECT id, service_id, name, unit_price, currency, discount, period, is_interval_required,
                  required_fields, created_at
           FROM service_options WHERE id = $1"#,
    )
    .bind(option_id)
    .fetch_optional(conn)
    .await?;
    Ok(option)
}

/// Sets or replaces the per-user discount override for the (user, option) pair. The UNIQUE
/// constraint on the pair keeps this a single-row upsert.
pub async fn set_user_discount(
    user_id: i64,
    option_id: i64,
    discount: DiscountBps,
    conn: &mut SqliteConnection,
) -> Result<(), AccountApiError> {
    if !discount.is_valid() {
        return Err(AccountApiError::QueryError(format!("Discount {discount} is outside [0%, 100%]")));
    }
    sqlx::query(
        r#"INSERT INTO user_service_discounts (user_id, service_option_id, discount) VALUES ($1, $2, $3)
           ON CONFLICT (user_id, service_option_id) DO UPDATE SET discount = excluded.discount"#,
    )
    .bind(user_id)
    .bind(option_id)
    .bind(discount)
    .execute(conn)
    .await?;
    debug!("🗃️ Discount for user #{user_id} on option #{option_id} set to {discount}");
    Ok(())
}

pub async fn user_discount(
    user_id: i64,
    option_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<DiscountBps>, AccountApiError> {
    let discount = sqlx::query_scalar::<_, DiscountBps>(
        r#"SELECT discount FROM user_service_discounts WHERE user_id = $1 AND service_option_id = $2"#,
    )
    .bind(user_id)
    .bind(option_id)
    .fetch_optional(conn)
    .await?;
    Ok(discount)
}
