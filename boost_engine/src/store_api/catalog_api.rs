use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{DiscountBps, NewService, NewServiceOption, Service, ServiceOption},
    traits::{AccountApiError, StoreDatabase},
};

/// `CatalogApi` manages the sellable catalog: services, their options, and per-user discount
/// overrides. All mutations here are admin operations.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: StoreDatabase
{
    pub async fn create_service(&self, service: NewService) -> Result<Service, AccountApiError> {
        let service = self.db.create_service(service).await?;
        info!("🛍️ Service #{} ({}) created", service.id, service.name);
        Ok(service)
    }

    pub async fn create_service_option(&self, option: NewServiceOption) -> Result<ServiceOption, AccountApiError> {
        let option = self.db.create_service_option(option).await?;
        info!("🛍️ Option #{} ({}) created for service #{} at {} each", option.id, option.name, option.service_id, option.unit_price);
        Ok(option)
    }

    /// Sets (or replaces) the per-user discount override for a service option. The pricing
    /// engine applies the larger of this override and the option's base discount.
    pub async fn set_user_discount(
        &self,
        user_id: i64,
        option_id: i64,
        discount: DiscountBps,
    ) -> Result<(), AccountApiError> {
        self.db.set_user_discount(user_id, option_id, discount).await?;
        info!("🛍️ Discount override of {discount} set for user #{user_id} on option #{option_id}");
        Ok(())
    }

    pub async fn fetch_service(&self, service_id: i64) -> Result<Option<Service>, AccountApiError> {
        self.db.fetch_service(service_id).await
    }

    pub async fn fetch_service_option(&self, option_id: i64) -> Result<Option<ServiceOption>, AccountApiError> {
        self.db.fetch_service_option(option_id).await
    }
}
