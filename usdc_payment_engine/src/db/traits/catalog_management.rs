use crate::{
    db_types::{NewProduct, Product, ProductId},
    traits::PaymentGatewayError,
};

/// Read access to the product catalog, plus the ability to add products.
///
/// The order flow never modifies products. It only reads prices at checkout time.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Returns all products, cheapest first.
    async fn fetch_products(&self) -> Result<Vec<Product>, PaymentGatewayError>;

    /// Returns the products with the given ids. Unknown ids are silently skipped, so the result may be shorter than
    /// `ids`.
    async fn fetch_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, PaymentGatewayError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, PaymentGatewayError>;
}
