use actix_web::{http::StatusCode, web, web::ServiceConfig};
use usdc_payment_engine::{
    db_types::{MicroUsdc, OrderStatusType},
    events::EventProducers,
    ClaimDepositResult,
    DepositConfig,
    OrderFlowApi,
    PaymentGatewayError,
};

use super::{
    helpers::{json, order, post_request, DEPOSIT_ADDRESS},
    mocks::MockGateway,
};
use crate::{
    routes::MuralWebhookRoute,
    webhook::{
        test::{new_signing_key, sign},
        WebhookVerifier,
        SIGNATURE_HEADER,
        TIMESTAMP_HEADER,
    },
};

const CREDITED: &str = r#"{
    "type": "account_credited",
    "accountId": "acc-123",
    "token": {"tokenAmount": 2.000417, "tokenSymbol": "USDC"},
    "transactionDetails": {"hash": "0xfeed", "blockchain": "POLYGON"}
}"#;

fn configure_webhook(db: MockGateway, verifier: WebhookVerifier, cfg: &mut ServiceConfig) {
    let api = OrderFlowApi::new(db, DepositConfig::new(DEPOSIT_ADDRESS), EventProducers::default());
    cfg.service(MuralWebhookRoute::<MockGateway>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(verifier));
}

fn matching_db() -> MockGateway {
    let mut db = MockGateway::new();
    db.expect_claim_deposit().times(1).returning(|amount, tx_hash| {
        assert_eq!(amount, MicroUsdc::from(2_000_417));
        assert_eq!(tx_hash, "0xfeed");
        Ok(ClaimDepositResult::Matched(order("ord-1", OrderStatusType::Paid)))
    });
    db
}

#[actix_web::test]
async fn credited_deposit_pays_the_order() {
    let _ = env_logger::try_init();
    let (status, body) =
        post_request("/webhooks/mural", CREDITED, &[], |cfg| configure_webhook(matching_db(), WebhookVerifier::disabled(), cfg))
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":true,"matched":true,"order_id":"ord-1"}"#);
}

#[actix_web::test]
async fn unmatched_and_duplicate_deposits_are_acknowledged() {
    let _ = env_logger::try_init();
    for result in [ClaimDepositResult::NoMatch, ClaimDepositResult::AlreadyProcessed] {
        let (status, body) = post_request("/webhooks/mural", CREDITED, &[], move |cfg| {
            let mut db = MockGateway::new();
            db.expect_claim_deposit().times(1).returning(move |_, _| Ok(result.clone()));
            configure_webhook(db, WebhookVerifier::disabled(), cfg)
        })
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"received":true,"matched":false}"#);
    }
}

#[actix_web::test]
async fn string_token_amounts_are_accepted() {
    let _ = env_logger::try_init();
    let payload = r#"{"type":"account_credited","token":{"tokenAmount":"2.000417","tokenSymbol":"USDC"},"transactionDetails":{"hash":"0xfeed"}}"#;
    let (status, body) =
        post_request("/webhooks/mural", payload, &[], |cfg| configure_webhook(matching_db(), WebhookVerifier::disabled(), cfg))
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["order_id"], "ord-1");
}

#[actix_web::test]
async fn other_events_are_ignored() {
    let _ = env_logger::try_init();
    let payload = r#"{"type": "payout_request_updated", "payoutRequestId": "pr-1"}"#;
    let (status, body) = post_request("/webhooks/mural", payload, &[], |cfg| {
        let mut db = MockGateway::new();
        db.expect_claim_deposit().never();
        configure_webhook(db, WebhookVerifier::disabled(), cfg)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":true}"#);
}

#[actix_web::test]
async fn unreadable_payloads_are_acknowledged() {
    let _ = env_logger::try_init();
    let (status, body) = post_request("/webhooks/mural", "{not json", &[], |cfg| {
        let mut db = MockGateway::new();
        db.expect_claim_deposit().never();
        configure_webhook(db, WebhookVerifier::disabled(), cfg)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":true,"error":"invalid payload"}"#);
}

#[actix_web::test]
async fn signed_delivery_is_processed() {
    let _ = env_logger::try_init();
    let (key, pem) = new_signing_key();
    let timestamp = "2024-06-12T15:02:11.000Z".to_string();
    let headers = [(SIGNATURE_HEADER, sign(&key, &timestamp, CREDITED)), (TIMESTAMP_HEADER, timestamp)];
    let (status, body) = post_request("/webhooks/mural", CREDITED, &headers, move |cfg| {
        let verifier = WebhookVerifier::from_pem(&pem).unwrap();
        configure_webhook(matching_db(), verifier, cfg)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["matched"], true);
}

#[actix_web::test]
async fn forged_delivery_is_acknowledged_but_ignored() {
    let _ = env_logger::try_init();
    let (key, pem) = new_signing_key();
    let timestamp = "2024-06-12T15:02:11.000Z".to_string();
    // Signed over a different body
    let signature = sign(&key, &timestamp, r#"{"type":"account_credited"}"#);
    let headers = [(SIGNATURE_HEADER, signature), (TIMESTAMP_HEADER, timestamp)];
    let (status, body) = post_request("/webhooks/mural", CREDITED, &headers, move |cfg| {
        let mut db = MockGateway::new();
        db.expect_claim_deposit().never();
        configure_webhook(db, WebhookVerifier::from_pem(&pem).unwrap(), cfg)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":true,"error":"invalid signature"}"#);
}

#[actix_web::test]
async fn unsigned_delivery_is_processed_when_a_key_is_configured() {
    let _ = env_logger::try_init();
    let (_, pem) = new_signing_key();
    let (status, body) = post_request("/webhooks/mural", CREDITED, &[], move |cfg| {
        configure_webhook(matching_db(), WebhookVerifier::from_pem(&pem).unwrap(), cfg)
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["order_id"], "ord-1");
}

#[actix_web::test]
async fn backend_failure_asks_for_redelivery() {
    let _ = env_logger::try_init();
    let (status, body) = post_request("/webhooks/mural", CREDITED, &[], |cfg| {
        let mut db = MockGateway::new();
        db.expect_claim_deposit().returning(|_, _| Err(PaymentGatewayError::DatabaseError("disk I/O error".into())));
        configure_webhook(db, WebhookVerifier::disabled(), cfg)
    })
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json(&body)["error"].as_str().is_some());
}
