use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use usdc_payment_engine::{CatalogApi, MerchantApi, OrderFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::mural::{create_payout_event_handlers, MuralPayoutProvider},
    payout_worker::start_payout_recovery_worker,
    routes::{
        health,
        json_config,
        CreateOrderRoute,
        GetOrderRoute,
        MerchantOrderRoute,
        MerchantOrdersRoute,
        MerchantWithdrawalsRoute,
        MuralWebhookRoute,
        ProductsRoute,
    },
    webhook::WebhookVerifier,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.seed_catalog {
        CatalogApi::new(db.clone()).seed_demo_catalog().await?;
    }
    let verifier = match &config.webhook_public_key {
        Some(pem) => WebhookVerifier::from_pem(pem).map_err(|e| ServerError::ConfigurationError(e.to_string()))?,
        None => WebhookVerifier::disabled(),
    };
    let provider =
        MuralPayoutProvider::new(config.mural.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_payout_event_handlers(db.clone(), provider.clone(), config.payout_config());
    let producers = handlers.producers();
    handlers.start_handlers();
    let _worker = start_payout_recovery_worker(
        db.clone(),
        config.deposit_config(),
        producers.clone(),
        config.payout_recovery_interval,
    );
    let orders_api = OrderFlowApi::new(db.clone(), config.deposit_config(), producers);
    let srv = create_server_instance(config, db, orders_api, provider, verifier)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    orders_api: OrderFlowApi<SqliteDatabase>,
    provider: MuralPayoutProvider,
    verifier: WebhookVerifier,
) -> Result<Server, ServerError> {
    info!("💻️ Deposits go to {} on {}", config.deposit_address, config.deposit_network);
    let srv = HttpServer::new(move || {
        let catalog_api = CatalogApi::new(db.clone());
        let merchant_api = MerchantApi::new(db.clone(), provider.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("upg::access_log"))
            .app_data(json_config())
            .app_data(web::Data::new(orders_api.clone()))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(merchant_api))
            .app_data(web::Data::new(verifier.clone()))
            .service(health)
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(GetOrderRoute::<SqliteDatabase>::new())
            .service(MuralWebhookRoute::<SqliteDatabase>::new())
            .service(MerchantOrdersRoute::<SqliteDatabase, MuralPayoutProvider>::new())
            .service(MerchantOrderRoute::<SqliteDatabase, MuralPayoutProvider>::new())
            .service(MerchantWithdrawalsRoute::<SqliteDatabase, MuralPayoutProvider>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
