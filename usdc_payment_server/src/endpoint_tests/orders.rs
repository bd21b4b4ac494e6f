use actix_web::{http::StatusCode, web, web::ServiceConfig};
use usdc_payment_engine::{
    db_types::{OrderStatusType, ProductId},
    events::EventProducers,
    CatalogApi,
    DepositConfig,
    InsertOrderResult,
    OrderFlowApi,
    MAX_ALLOCATION_ATTEMPTS,
};

use super::{
    helpers::{get_request, json, order, order_item, post_request, product, stored_order, DEPOSIT_ADDRESS},
    mocks::MockGateway,
};
use crate::routes::{CreateOrderRoute, GetOrderRoute, ProductsRoute};

const CHECKOUT: &str =
    r#"{"customerEmail": "alice@example.com", "items": [{"productId": "sticker-pack", "quantity": 2}]}"#;

fn order_api(db: MockGateway) -> web::Data<OrderFlowApi<MockGateway>> {
    web::Data::new(OrderFlowApi::new(db, DepositConfig::new(DEPOSIT_ADDRESS), EventProducers::default()))
}

fn configure_checkout(db: MockGateway, cfg: &mut ServiceConfig) {
    cfg.service(CreateOrderRoute::<MockGateway>::new()).app_data(order_api(db));
}

fn catalog_db() -> MockGateway {
    let mut db = MockGateway::new();
    db.expect_fetch_products_by_ids().returning(|ids: &[ProductId]| {
        assert_eq!(ids, [ProductId::from("sticker-pack")]);
        Ok(vec![product("sticker-pack", "Sticker Pack", 50)])
    });
    db
}

#[actix_web::test]
async fn list_products() {
    let _ = env_logger::try_init();
    let (status, body) = get_request("/products", |cfg| {
        let mut db = MockGateway::new();
        db.expect_fetch_products().returning(|| {
            Ok(vec![product("sticker-pack", "Sticker Pack", 50), product("pro-upgrade", "Pro Upgrade", 300)])
        });
        cfg.service(ProductsRoute::<MockGateway>::new()).app_data(web::Data::new(CatalogApi::new(db)));
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let products = json(&body);
    assert_eq!(products.as_array().map(Vec::len), Some(2));
    assert_eq!(products[0]["id"], "sticker-pack");
    assert_eq!(products[0]["price"], "0.500000");
    assert_eq!(products[1]["price"], "3.000000");
}

#[actix_web::test]
async fn checkout_allocates_a_fingerprint() {
    let _ = env_logger::try_init();
    let (status, body) = post_request("/orders", CHECKOUT, &[], |cfg| {
        let mut db = catalog_db();
        db.expect_fetch_pending_order_by_fingerprint().times(1).returning(|_| Ok(None));
        db.expect_insert_order().times(1).returning(|new_order| {
            assert_eq!(new_order.customer_email, "alice@example.com");
            assert_eq!(new_order.items.len(), 1);
            assert_eq!(new_order.items[0].quantity, 2);
            Ok(InsertOrderResult::Inserted(stored_order(new_order)))
        });
        configure_checkout(db, cfg);
    })
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let checkout = json(&body);
    assert_eq!(checkout["status"], "pending_payment");
    assert_eq!(checkout["total_amount"], "1.000000");
    assert_eq!(checkout["deposit_address"], DEPOSIT_ADDRESS);
    assert_eq!(checkout["network"], "Polygon");
    let fingerprint = checkout["fingerprint_amount"].as_str().unwrap();
    assert!(fingerprint.starts_with("1.000") && fingerprint != "1.000000", "{fingerprint}");
    let instructions = checkout["instructions"].as_str().unwrap();
    assert_eq!(instructions, format!("Send exactly {fingerprint} USDC to {DEPOSIT_ADDRESS} on Polygon"));
}

#[actix_web::test]
async fn checkout_accepts_snake_case_fields() {
    let _ = env_logger::try_init();
    let body = r#"{"customer_email": "alice@example.com", "items": [{"product_id": "sticker-pack", "quantity": 2}]}"#;
    let (status, _) = post_request("/orders", body, &[], |cfg| {
        let mut db = catalog_db();
        db.expect_fetch_pending_order_by_fingerprint().returning(|_| Ok(None));
        db.expect_insert_order().returning(|o| Ok(InsertOrderResult::Inserted(stored_order(o))));
        configure_checkout(db, cfg);
    })
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_web::test]
async fn invalid_checkouts() {
    let _ = env_logger::try_init();
    // An empty cart never reaches the database
    let body = r#"{"customerEmail": "alice@example.com", "items": []}"#;
    let (status, body) = post_request("/orders", body, &[], |cfg| {
        let mut db = MockGateway::new();
        db.expect_insert_order().never();
        configure_checkout(db, cfg);
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().is_some());

    let (status, body) = post_request("/orders", r#"{"items": "nope"}"#, &[], |cfg| {
        configure_checkout(MockGateway::new(), cfg);
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().unwrap().starts_with("Could not read request body"), "{body}");
}

#[actix_web::test]
async fn checkout_with_no_free_fingerprint() {
    let _ = env_logger::try_init();
    let (status, body) = post_request("/orders", CHECKOUT, &[], |cfg| {
        let mut db = catalog_db();
        db.expect_fetch_pending_order_by_fingerprint()
            .times(MAX_ALLOCATION_ATTEMPTS)
            .returning(|_| Ok(Some(order("someone-else", OrderStatusType::PendingPayment))));
        db.expect_insert_order().never();
        configure_checkout(db, cfg);
    })
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

#[actix_web::test]
async fn fetch_order() {
    let _ = env_logger::try_init();
    let (status, body) = get_request("/orders/ord-1", |cfg| {
        let mut db = MockGateway::new();
        db.expect_fetch_order().returning(|id| {
            assert_eq!(id.as_str(), "ord-1");
            Ok(Some(order("ord-1", OrderStatusType::Paid)))
        });
        db.expect_fetch_order_items().returning(|_| Ok(vec![order_item("ord-1", "pro-upgrade", 1, 200)]));
        cfg.service(GetOrderRoute::<MockGateway>::new()).app_data(order_api(db));
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let detail = json(&body);
    assert_eq!(detail["id"], "ord-1");
    assert_eq!(detail["status"], "paid");
    assert_eq!(detail["fingerprint_amount"], "2.000417");
    assert_eq!(detail["deposit_tx_hash"], "0xfeed");
    assert_eq!(detail["items"][0]["unit_price"], "2.000000");
}

#[actix_web::test]
async fn fetch_unknown_order() {
    let _ = env_logger::try_init();
    let (status, body) = get_request("/orders/missing", |cfg| {
        let mut db = MockGateway::new();
        db.expect_fetch_order().returning(|_| Ok(None));
        db.expect_fetch_order_items().never();
        cfg.service(GetOrderRoute::<MockGateway>::new()).app_data(order_api(db));
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json(&body)["error"].as_str().is_some());
}
