use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json as json_value;
use usdc_payment_engine::{
    db_types::{OrderStatusType, WithdrawalStatus},
    MerchantApi,
    OrderQueryFilter,
    PayoutProviderError,
    PayoutRequestInfo,
    PayoutRequestStatus,
};

use super::{
    helpers::{get_request, json, order, order_item, withdrawal},
    mocks::{MockGateway, MockProvider},
};
use crate::routes::{MerchantOrderRoute, MerchantOrdersRoute, MerchantWithdrawalsRoute};

fn merchant_api(db: MockGateway, provider: MockProvider) -> web::Data<MerchantApi<MockGateway, MockProvider>> {
    web::Data::new(MerchantApi::new(db, provider))
}

fn configure_orders(db: MockGateway, cfg: &mut ServiceConfig) {
    cfg.service(MerchantOrdersRoute::<MockGateway, MockProvider>::new())
        .service(MerchantOrderRoute::<MockGateway, MockProvider>::new())
        .app_data(merchant_api(db, MockProvider::new()));
}

#[actix_web::test]
async fn list_orders_by_status() {
    let _ = env_logger::try_init();
    let (status, body) = get_request("/merchant/orders?status=paid,withdrawal_failed&limit=5", |cfg| {
        let mut db = MockGateway::new();
        db.expect_search_orders()
            .withf(|q: &OrderQueryFilter| {
                q.statuses == Some(vec![OrderStatusType::Paid, OrderStatusType::WithdrawalFailed]) &&
                    q.limit == Some(5) &&
                    q.customer_email.is_none()
            })
            .times(1)
            .returning(|_| {
                Ok(vec![order("ord-2", OrderStatusType::WithdrawalFailed), order("ord-1", OrderStatusType::Paid)])
            });
        configure_orders(db, cfg);
    })
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let orders = json(&body);
    assert_eq!(orders[0]["id"], "ord-2");
    assert_eq!(orders[0]["status"], "withdrawal_failed");
    assert_eq!(orders[1]["id"], "ord-1");
}

#[actix_web::test]
async fn list_orders_rejects_unknown_statuses() {
    let _ = env_logger::try_init();
    let (status, body) = get_request("/merchant/orders?status=refunded", |cfg| {
        let mut db = MockGateway::new();
        db.expect_search_orders().never();
        configure_orders(db, cfg);
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().is_some());
}

#[actix_web::test]
async fn order_detail_includes_the_withdrawal() {
    let _ = env_logger::try_init();
    let (status, body) = get_request("/merchant/orders/ord-1", |cfg| {
        let mut db = MockGateway::new();
        db.expect_fetch_order().returning(|_| Ok(Some(order("ord-1", OrderStatusType::WithdrawalInitiated))));
        db.expect_fetch_order_items().returning(|_| Ok(vec![order_item("ord-1", "pro-upgrade", 1, 200)]));
        db.expect_fetch_withdrawal_for_order()
            .returning(|_| Ok(Some(withdrawal(7, "ord-1", WithdrawalStatus::Executing))));
        configure_orders(db, cfg);
    })
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let detail = json(&body);
    assert_eq!(detail["status"], "withdrawal_initiated");
    assert_eq!(detail["items"][0]["product_id"], "pro-upgrade");
    assert_eq!(detail["withdrawal"]["id"], 7);
    assert_eq!(detail["withdrawal"]["status"], "executing");
    assert_eq!(detail["withdrawal"]["amount"], "2.000000");
}

#[actix_web::test]
async fn order_detail_for_unknown_order() {
    let _ = env_logger::try_init();
    let (status, _) = get_request("/merchant/orders/nope", |cfg| {
        let mut db = MockGateway::new();
        db.expect_fetch_order().returning(|_| Ok(None));
        configure_orders(db, cfg);
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure_withdrawals(db: MockGateway, provider: MockProvider, cfg: &mut ServiceConfig) {
    cfg.service(MerchantWithdrawalsRoute::<MockGateway, MockProvider>::new()).app_data(merchant_api(db, provider));
}

#[actix_web::test]
async fn withdrawals_are_refreshed_from_the_provider() {
    let _ = env_logger::try_init();
    let (status, body) = get_request("/merchant/withdrawals", |cfg| {
        let mut db = MockGateway::new();
        db.expect_fetch_withdrawals().returning(|| {
            Ok(vec![withdrawal(2, "ord-2", WithdrawalStatus::Executing), withdrawal(1, "ord-1", WithdrawalStatus::Completed)])
        });
        db.expect_transition_withdrawal()
            .withf(|id, from, to| *id == 2 && *from == WithdrawalStatus::Executing && *to == WithdrawalStatus::Completed)
            .times(1)
            .returning(|_, _, to| Ok(Some(withdrawal(2, "ord-2", to))));
        let mut provider = MockProvider::new();
        // Only the executing withdrawal is looked up
        provider.expect_get_payout_request().times(1).returning(|id| {
            assert_eq!(id, "payout-request-2");
            Ok(PayoutRequestInfo {
                id: id.to_string(),
                status: PayoutRequestStatus::Executed,
                payouts: vec![json_value!({"id": "payout-1", "amount": {"tokenAmount": 2.0, "tokenSymbol": "USDC"}})],
            })
        });
        configure_withdrawals(db, provider, cfg);
    })
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let list = json(&body);
    assert_eq!(list[0]["id"], 2);
    assert_eq!(list[0]["status"], "completed");
    assert_eq!(list[0]["provider_status"], "EXECUTED");
    assert_eq!(list[0]["payouts"][0]["id"], "payout-1");
    assert_eq!(list[1]["id"], 1);
    assert_eq!(list[1]["status"], "completed");
    assert!(list[1]["provider_status"].is_null());
}

#[actix_web::test]
async fn withdrawals_survive_a_provider_outage() {
    let _ = env_logger::try_init();
    let (status, body) = get_request("/merchant/withdrawals", |cfg| {
        let mut db = MockGateway::new();
        db.expect_fetch_withdrawals().returning(|| Ok(vec![withdrawal(3, "ord-3", WithdrawalStatus::Executing)]));
        db.expect_transition_withdrawal().never();
        let mut provider = MockProvider::new();
        provider.expect_get_payout_request().returning(|_| Err(PayoutProviderError::Timeout));
        configure_withdrawals(db, provider, cfg);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let list = json(&body);
    assert_eq!(list[0]["status"], "executing");
    assert!(list[0]["provider_status"].is_null());
}
