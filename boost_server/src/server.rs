use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use boost_engine::{CatalogApi, OrderFlowApi, SqliteDatabase, TopUpApi, WalletApi};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_sweep_worker,
    integrations::PlisioGateway,
    middleware::IdentityMiddlewareFactory,
    payment_routes::PlisioWebhookRoute,
    routes::{
        health,
        CompleteOrderRoute,
        CreateOrderRoute,
        CreateServiceOptionRoute,
        CreateServiceRoute,
        CreateTopUpRoute,
        DepositRoute,
        MyBalanceRoute,
        MyHistoryRoute,
        MyOrdersRoute,
        MyTopUpsRoute,
        RegisterUserRoute,
        SetDiscountRoute,
        StartOrderRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.enable_sweep {
        let _ = start_sweep_worker(db.clone(), config.top_up_expiry, config.sweep_interval_secs);
    }
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let plisio = plisio_tools::PlisioApi::new(config.plisio.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = HttpServer::new(move || {
        let gateway = PlisioGateway::new(plisio.clone());
        let orders_api = OrderFlowApi::new(db.clone());
        let wallet_api = WalletApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let top_up_api = TopUpApi::new(db.clone(), gateway, config.plisio.callback_url.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bg::access_log"))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(wallet_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(top_up_api));
        // Routes that require an authenticated identity
        let api_scope = web::scope("/api")
            .wrap(IdentityMiddlewareFactory)
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(StartOrderRoute::<SqliteDatabase>::new())
            .service(CompleteOrderRoute::<SqliteDatabase>::new())
            .service(MyBalanceRoute::<SqliteDatabase>::new())
            .service(MyHistoryRoute::<SqliteDatabase>::new())
            .service(DepositRoute::<SqliteDatabase>::new())
            .service(CreateTopUpRoute::<SqliteDatabase>::new())
            .service(MyTopUpsRoute::<SqliteDatabase>::new())
            .service(SetDiscountRoute::<SqliteDatabase>::new())
            .service(RegisterUserRoute::<SqliteDatabase>::new())
            .service(CreateServiceRoute::<SqliteDatabase>::new())
            .service(CreateServiceOptionRoute::<SqliteDatabase>::new());
        // The gateway authenticates itself with the verify_hash signature inside the payload,
        // so the webhook scope carries no identity middleware.
        let webhook_scope = web::scope("/webhook").service(PlisioWebhookRoute::<SqliteDatabase>::new());
        app.service(health).service(api_scope).service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
