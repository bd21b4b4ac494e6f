pub mod prepare_env;
mod scripted_provider;

use serde_json::json;
pub use scripted_provider::ScriptedPayoutProvider;

use crate::{
    db_types::{Product, ProductId},
    payout_provider::{PayoutRecipient, PhysicalAddress},
    CatalogApi,
    PayoutConfig,
    SqliteDatabase,
};

pub const TEST_DEPOSIT_ADDRESS: &str = "0x1111222233334444555566667777888899990000";

pub fn test_payout_config() -> PayoutConfig {
    PayoutConfig {
        source_account_id: "acct-test-0001".to_string(),
        recipient: PayoutRecipient {
            first_name: "Maria".to_string(),
            last_name: "Gomez".to_string(),
            email: "maria@example.com".to_string(),
            physical_address: PhysicalAddress {
                address1: "Calle 100 #10-20".to_string(),
                city: "Bogota".to_string(),
                state: "DC".to_string(),
                country: "CO".to_string(),
                zip: "110111".to_string(),
            },
            bank_name: "Bancolombia".to_string(),
            bank_account_owner: "Maria Gomez".to_string(),
            fiat_and_rail_details: json!({
                "type": "cop",
                "symbol": "COP",
                "phoneNumber": "+573001234567",
                "accountType": "SAVINGS",
                "bankAccountNumber": "1234567890",
                "documentNumber": "1234567890",
                "documentType": "NATIONAL_ID"
            }),
        },
    }
}

/// Seeds the demo catalog and returns it, cheapest first.
pub async fn seed_catalog(db: &SqliteDatabase) -> Vec<Product> {
    let api = CatalogApi::new(db.clone());
    api.seed_demo_catalog().await.expect("Error seeding catalog");
    api.products().await.expect("Error fetching catalog")
}

/// Looks up a product id in a seeded catalog by name.
pub fn product_id(catalog: &[Product], name: &str) -> ProductId {
    catalog.iter().find(|p| p.name == name).map(|p| p.id.clone()).expect("Product not in catalog")
}
