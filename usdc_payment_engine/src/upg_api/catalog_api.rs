use log::*;

use crate::{
    db_types::{MicroUsdc, NewProduct, Product},
    traits::{CatalogManagement, PaymentGatewayError},
};

/// The demo catalog of digital goods: (name, description, price in cents).
const DEMO_CATALOG: [(&str, &str, i64); 5] = [
    ("Sticker Pack", "A pack of digital stickers", 50),
    ("Digital Badge", "A collectible profile badge", 100),
    ("Premium Theme", "A premium colour theme", 150),
    ("Gift Card $2", "A $2 store gift card", 200),
    ("Pro Upgrade", "One month of pro features", 300),
];

#[derive(Clone)]
pub struct CatalogApi<B> {
    db: B,
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// All products, cheapest first.
    pub async fn products(&self) -> Result<Vec<Product>, PaymentGatewayError> {
        self.db.fetch_products().await
    }

    /// Adds the demo catalog, unless the catalog already has products in it. Returns the number of products added.
    pub async fn seed_demo_catalog(&self) -> Result<usize, PaymentGatewayError> {
        if !self.db.fetch_products().await?.is_empty() {
            debug!("🛒️ Catalog already has products. Not seeding.");
            return Ok(0);
        }
        for (name, description, cents) in DEMO_CATALOG {
            let product = NewProduct::new(name, MicroUsdc::from_cents(cents)).with_description(description);
            self.db.insert_product(product).await?;
        }
        info!("🛒️ Seeded the catalog with {} demo products", DEMO_CATALOG.len());
        Ok(DEMO_CATALOG.len())
    }
}
