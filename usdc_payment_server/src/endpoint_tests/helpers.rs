use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::{TimeZone, Utc};
use log::debug;
use usdc_payment_engine::db_types::{
    MicroUsdc,
    NewOrder,
    Order,
    OrderItem,
    OrderStatusType,
    Product,
    Withdrawal,
    WithdrawalStatus,
};

use crate::routes::json_config;

pub const DEPOSIT_ADDRESS: &str = "0x2222333344445555666677778888999900001111";

pub async fn get_request<F>(path: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    send(TestRequest::get().uri(path), configure).await
}

pub async fn post_request<F>(path: &str, body: &str, headers: &[(&str, String)], configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let mut req =
        TestRequest::post().uri(path).insert_header(("Content-Type", "application/json")).set_payload(body.to_string());
    for (name, value) in headers {
        req = req.insert_header((*name, value.as_str()));
    }
    send(req, configure).await
}

async fn send<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().app_data(json_config()).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = res.into_body().try_into_bytes().map(|b| String::from_utf8_lossy(&b).into_owned()).unwrap_or_default();
    (status, body)
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"))
}

fn timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 12, 15, 2, 11).unwrap()
}

pub fn product(id: &str, name: &str, cents: i64) -> Product {
    Product {
        id: id.into(),
        name: name.to_string(),
        description: None,
        price: MicroUsdc::from_cents(cents),
        created_at: timestamp(),
    }
}

pub fn order(id: &str, status: OrderStatusType) -> Order {
    Order {
        id: id.parse().unwrap(),
        customer_email: "alice@example.com".to_string(),
        status,
        total_amount: MicroUsdc::from_units(2),
        fingerprint_amount: MicroUsdc::from(2_000_417),
        deposit_address: DEPOSIT_ADDRESS.to_string(),
        deposit_tx_hash: (status != OrderStatusType::PendingPayment).then(|| "0xfeed".to_string()),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// The order the database would have stored for `new_order`
pub fn stored_order(new_order: NewOrder) -> Order {
    Order {
        id: new_order.id,
        customer_email: new_order.customer_email,
        status: OrderStatusType::PendingPayment,
        total_amount: new_order.total_amount,
        fingerprint_amount: new_order.fingerprint_amount,
        deposit_address: new_order.deposit_address,
        deposit_tx_hash: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn order_item(order_id: &str, product_id: &str, quantity: i64, cents: i64) -> OrderItem {
    OrderItem {
        id: 1,
        order_id: order_id.parse().unwrap(),
        product_id: product_id.into(),
        quantity,
        unit_price: MicroUsdc::from_cents(cents),
    }
}

pub fn withdrawal(id: i64, order_id: &str, status: WithdrawalStatus) -> Withdrawal {
    Withdrawal {
        id,
        order_id: order_id.parse().unwrap(),
        provider_payout_request_id: format!("payout-request-{id}"),
        amount: MicroUsdc::from_units(2),
        status,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}
