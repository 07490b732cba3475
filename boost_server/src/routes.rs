//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database operations)
//! must be expressed as a future or asynchronous function so worker threads can interleave requests.
use actix_web::{get, web, HttpResponse, Responder};
use boost_engine::{
    db_types::{NewService, NewUser, Role},
    CatalogApi,
    NewOrderRequest,
    OrderFlowApi,
    StoreDatabase,
    TopUpApi,
    WalletApi,
};
use log::*;

use crate::{
    auth::UserClaims,
    data_objects::{
        BalanceResponse,
        DepositRequest,
        DiscountRequest,
        JsonResponse,
        NewServiceOptionRequest,
        NewTopUpRequest,
        TopUpResponse,
    },
    errors::ServerError,
    integrations::PlisioGateway,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:expr),+])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(create_order => Post "/orders" impl StoreDatabase where requires [Role::Customer]);
/// Route handler for placing a new order.
///
/// The request is validated against the catalog and priced server-side; the client never
/// supplies a price. Payment is taken from the wallet balance in the same transaction that
/// creates the order, so a 201 here means the order is both paid for and recorded.
pub async fn create_order<B: StoreDatabase>(
    claims: UserClaims,
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST create_order for user #{}", claims.user_id);
    let order = api.place_order(claims.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/orders" impl StoreDatabase where requires [Role::Customer]);
pub async fn my_orders<B: StoreDatabase>(
    claims: UserClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for user #{}", claims.user_id);
    let orders = api.orders_for_user(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(start_order => Post "/orders/{id}/start" impl StoreDatabase where requires [Role::Admin]);
/// Route handler for starting fulfilment of a pending order. Admin only. If the order carries a
/// billing period, its completion deadline is stamped here and the background sweep completes
/// the order once the deadline passes.
pub async fn start_order<B: StoreDatabase>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ POST start_order #{order_id}");
    let order = api.start_order(order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(complete_order => Post "/orders/{id}/complete" impl StoreDatabase where requires [Role::Admin]);
/// Route handler for completing an order manually. Admin only. Valid from `Pending` or
/// `Running`; the completing admin is recorded on the order.
pub async fn complete_order<B: StoreDatabase>(
    claims: UserClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let completed_by = format!("admin:{}", claims.user_id);
    debug!("💻️ POST complete_order #{order_id} by {completed_by}");
    let order = api.complete_order(order_id, &completed_by).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Wallet  ----------------------------------------------------

route!(my_balance => Get "/balance" impl StoreDatabase where requires [Role::Customer]);
pub async fn my_balance<B: StoreDatabase>(
    claims: UserClaims,
    api: web::Data<WalletApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_balance for user #{}", claims.user_id);
    let user =
        api.fetch_user(claims.user_id).await?.ok_or_else(|| ServerError::NoRecordFound("No such user".into()))?;
    let balance = BalanceResponse { user_id: user.id, balance: user.balance, currency: user.currency };
    Ok(HttpResponse::Ok().json(balance))
}

route!(my_history => Get "/history" impl StoreDatabase where requires [Role::Customer]);
/// Route handler for the balance ledger. Entries are returned oldest first and chain: each
/// entry's `old_balance` equals the previous entry's `new_balance`.
pub async fn my_history<B: StoreDatabase>(
    claims: UserClaims,
    api: web::Data<WalletApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_history for user #{}", claims.user_id);
    let history = api.history(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(history))
}

route!(deposit => Post "/deposit" impl StoreDatabase where requires [Role::Admin]);
/// Route handler for manual admin deposits. These land in the ledger as `AdminDeposit` entries
/// so they stay distinguishable from gateway top-ups.
pub async fn deposit<B: StoreDatabase>(
    body: web::Json<DepositRequest>,
    api: web::Data<WalletApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let DepositRequest { user_id, amount } = body.into_inner();
    debug!("💻️ POST deposit of {amount} for user #{user_id}");
    let entry = api.admin_deposit(user_id, amount).await?;
    Ok(HttpResponse::Ok().json(entry))
}

//----------------------------------------------   Top-ups  ----------------------------------------------------

route!(create_top_up => Post "/top-ups" impl StoreDatabase where requires [Role::Customer]);
/// Route handler for requesting a wallet top-up.
///
/// An invoice is created with the payment gateway and a `Pending` top-up recorded against it.
/// The wallet is only credited once the gateway's payment notification arrives and is
/// reconciled. The response carries the invoice URL the customer pays at.
pub async fn create_top_up<B: StoreDatabase>(
    claims: UserClaims,
    body: web::Json<NewTopUpRequest>,
    wallet: web::Data<WalletApi<B>>,
    api: web::Data<TopUpApi<B, PlisioGateway>>,
) -> Result<HttpResponse, ServerError> {
    let amount = body.into_inner().amount;
    debug!("💻️ POST create_top_up of {amount} for user #{}", claims.user_id);
    let user =
        wallet.fetch_user(claims.user_id).await?.ok_or_else(|| ServerError::NoRecordFound("No such user".into()))?;
    let (top_up, invoice) = api.request_top_up(&user, amount).await?;
    let response = TopUpResponse { top_up_id: top_up.id, invoice_id: invoice.invoice_id, invoice_url: invoice.invoice_url };
    Ok(HttpResponse::Created().json(response))
}

route!(my_top_ups => Get "/top-ups" impl StoreDatabase where requires [Role::Customer]);
pub async fn my_top_ups<B: StoreDatabase>(
    claims: UserClaims,
    api: web::Data<TopUpApi<B, PlisioGateway>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_top_ups for user #{}", claims.user_id);
    let top_ups = api.top_ups_for_user(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(top_ups))
}

//----------------------------------------------   Catalog  ----------------------------------------------------

route!(register_user => Post "/users" impl StoreDatabase where requires [Role::Admin]);
/// Route handler for provisioning a new customer account. Token issuance and email
/// confirmation live upstream; here the account is created inactive with a zero balance.
pub async fn register_user<B: StoreDatabase>(
    body: web::Json<NewUser>,
    api: web::Data<WalletApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let new_user = body.into_inner();
    debug!("💻️ POST register_user {}", new_user.email);
    let user = api.register_user(new_user).await?;
    Ok(HttpResponse::Created().json(user))
}

route!(create_service => Post "/services" impl StoreDatabase where requires [Role::Admin]);
pub async fn create_service<B: StoreDatabase>(
    body: web::Json<NewService>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let service = body.into_inner();
    debug!("💻️ POST create_service {}", service.name);
    let service = api.create_service(service).await?;
    Ok(HttpResponse::Created().json(service))
}

route!(create_service_option => Post "/services/{id}/options" impl StoreDatabase where requires [Role::Admin]);
/// Route handler for adding a purchasable option to a service. The unit price must be positive
/// and the discount within [0, 100] percent; both are enforced by the backend.
pub async fn create_service_option<B: StoreDatabase>(
    path: web::Path<i64>,
    body: web::Json<NewServiceOptionRequest>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let service_id = path.into_inner();
    let option = body.into_inner().into_new_option(service_id);
    debug!("💻️ POST create_service_option {} for service #{service_id}", option.name);
    let option = api.create_service_option(option).await?;
    Ok(HttpResponse::Created().json(option))
}

route!(set_discount => Put "/discounts" impl StoreDatabase where requires [Role::Admin]);
/// Route handler for setting a per-user discount override on a service option. Admin only.
/// The pricing engine applies the larger of the override and the option's base discount.
pub async fn set_discount<B: StoreDatabase>(
    body: web::Json<DiscountRequest>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let DiscountRequest { user_id, service_option_id, discount } = body.into_inner();
    if !discount.is_valid() {
        return Err(ServerError::ValidationError(format!("{discount} is not a valid discount")));
    }
    debug!("💻️ PUT set_discount {discount} for user #{user_id} on option #{service_option_id}");
    api.set_user_discount(user_id, service_option_id, discount).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!(
        "Discount for user {user_id} on option {service_option_id} set to {discount}"
    ))))
}
