use sqlx::{QueryBuilder, SqliteConnection};

use super::single_row;
use crate::db_types::{NewProduct, Product, ProductId};

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products ORDER BY price, name").fetch_all(conn).await?;
    Ok(products)
}

pub async fn fetch_products_by_ids(ids: &[ProductId], conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM products WHERE id IN (");
    let mut list = builder.separated(", ");
    for id in ids {
        list.push_bind(id.as_str());
    }
    list.push_unseparated(")");
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    Ok(products)
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let rows = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, name, description, price) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(product.id.as_str())
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .fetch_all(conn)
    .await?;
    single_row(rows)
}
