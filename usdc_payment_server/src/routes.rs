//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database operations,
//! calls to Mural etc.) must be expressed as futures or asynchronous functions.
use std::str::FromStr;

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use usdc_payment_engine::{
    db_types::OrderId,
    order_objects::DepositOutcome,
    traits::{CatalogManagement, OrderManagement, PaymentGatewayDatabase, WithdrawalManagement},
    CatalogApi,
    MerchantApi,
    OrderFlowApi,
    OrderQueryFilter,
    PayoutProvider,
};

use crate::{
    data_objects::{CheckoutRequest, MerchantOrderQuery, MuralWebhookEvent, WebhookResponse},
    errors::ServerError,
    webhook::{WebhookVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ ; provider $($pbounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B, P>(core::marker::PhantomData<fn() -> (B, P)>);}
        paste::paste! { impl<B, P> [<$name:camel Route>]<B, P> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> (B, P)>)
            }
        }}
        paste::paste! { impl<B, P> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B, P>
        where
            B: $($bounds +)+ 'static,
            P: $($pbounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B, P>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

/// Returns checkout body errors as JSON, like every other error
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into())
}

fn parse_order_id(id: &str) -> Result<OrderId, ServerError> {
    OrderId::from_str(id).map_err(|e| ServerError::InvalidRequestPath(e.to_string()))
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(products => Get "/products" impl CatalogManagement);
pub async fn products<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET products");
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl CatalogManagement, OrderManagement, PaymentGatewayDatabase);
/// Checkout. Prices the cart and hands out the exact amount the customer must deposit.
pub async fn create_order<B>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: CatalogManagement + OrderManagement + PaymentGatewayDatabase,
{
    trace!("💻️ POST checkout for {}", body.customer_email);
    let items = body.checkout_items();
    let checkout = api.create_order(&body.customer_email, &items).await.map_err(|e| {
        debug!("💻️ Checkout for {} failed. {e}", body.customer_email);
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Created().json(checkout))
}

route!(get_order => Get "/orders/{id}" impl OrderManagement);
pub async fn get_order<B: OrderManagement>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = parse_order_id(&path.into_inner())?;
    trace!("💻️ GET order [{order_id}]");
    let order = api.get_order(&order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(mural_webhook => Post "/webhooks/mural" impl PaymentGatewayDatabase);
/// Receives Mural balance activity events.
///
/// Deliveries are acknowledged with a 200 and `{"received": true}` whatever their content, including those with an
/// invalid signature, so that Mural does not keep redelivering them. Only a backend failure returns an error, which
/// lets Mural retry once the database is available again. Redelivery is harmless since a transaction is only ever
/// applied once.
pub async fn mural_webhook<B: PaymentGatewayDatabase>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B>>,
    verifier: web::Data<WebhookVerifier>,
) -> Result<HttpResponse, ServerError> {
    let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok());
    let check = verifier.check(header(SIGNATURE_HEADER), header(TIMESTAMP_HEADER), body.as_ref());
    if check.is_rejected() {
        warn!("💻️ Invalid webhook signature. Ignoring delivery.");
        return Ok(HttpResponse::Ok().json(WebhookResponse::rejected("invalid signature")));
    }
    let event = match serde_json::from_slice::<MuralWebhookEvent>(body.as_ref()) {
        Ok(ev) => ev,
        Err(e) => {
            warn!("💻️ Could not read webhook payload. {e}");
            return Ok(HttpResponse::Ok().json(WebhookResponse::rejected("invalid payload")));
        },
    };
    info!("💻️ Webhook event: {}", event.event_type());
    let Some((amount, tx_hash)) = event.credited_deposit() else {
        return Ok(HttpResponse::Ok().json(WebhookResponse::received()));
    };
    let outcome = api.handle_deposit(amount, tx_hash).await?;
    if let DepositOutcome::NoMatch = outcome {
        info!("💻️ Deposit of {amount} USDC ({tx_hash}) did not match any pending order");
    }
    let order_id = outcome.order_id().cloned();
    Ok(HttpResponse::Ok().json(WebhookResponse::routed(order_id)))
}

//----------------------------------------------   Merchant  ----------------------------------------------------
route!(merchant_orders => Get "/merchant/orders" impl OrderManagement, WithdrawalManagement; provider PayoutProvider);
pub async fn merchant_orders<B, P>(
    query: web::Query<MerchantOrderQuery>,
    api: web::Data<MerchantApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + WithdrawalManagement,
    P: PayoutProvider,
{
    let filter = OrderQueryFilter::try_from(query.into_inner())?;
    trace!("💻️ GET merchant orders. {filter:?}");
    let orders = api.list_orders(filter).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(merchant_order => Get "/merchant/orders/{id}" impl OrderManagement, WithdrawalManagement; provider PayoutProvider);
pub async fn merchant_order<B, P>(
    path: web::Path<String>,
    api: web::Data<MerchantApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + WithdrawalManagement,
    P: PayoutProvider,
{
    let order_id = parse_order_id(&path.into_inner())?;
    trace!("💻️ GET merchant order [{order_id}]");
    let detail = api
        .order_detail(&order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(detail))
}

route!(merchant_withdrawals => Get "/merchant/withdrawals" impl WithdrawalManagement; provider PayoutProvider);
pub async fn merchant_withdrawals<B, P>(api: web::Data<MerchantApi<B, P>>) -> Result<HttpResponse, ServerError>
where
    B: WithdrawalManagement,
    P: PayoutProvider,
{
    trace!("💻️ GET merchant withdrawals");
    let withdrawals = api.list_withdrawals().await?;
    Ok(HttpResponse::Ok().json(withdrawals))
}
