use log::{debug, trace};
use shop_common::Money;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewProduct, Product, ProductId},
    traits::{CatalogError, Reservation},
};

/// Fetches all products whose id is in `ids`, in a single query. Missing ids are silently skipped.
pub async fn fetch_products_by_ids(ids: &[ProductId], conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM products WHERE id IN (");
    let mut id_list = builder.separated(", ");
    for id in ids {
        id_list.push_bind(*id);
    }
    builder.push(") ORDER BY id");
    trace!("🗃️ Executing query: {}", builder.sql());
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    Ok(products)
}

pub async fn fetch_all_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products ORDER BY id").fetch_all(conn).await?;
    Ok(products)
}

pub async fn fetch_product(id: ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(product)
}

/// Inserts a new product into the catalog. The product is validated first, since the table constraints would
/// otherwise surface as opaque database errors.
pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, CatalogError> {
    product.validate()?;
    let product: Product = sqlx::query_as(
        r#"
            INSERT INTO products (name, description, price, inventory)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.inventory)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Product #{} ({}) added to the catalog", product.id, product.name);
    Ok(product)
}

/// Takes `quantity` units of the product out of stock, if and only if at least that many are available.
///
/// This is a single conditional `UPDATE`, so two callers can never both take the last unit: the loser's predicate
/// no longer matches and it affects zero rows. The unit price is read by the same statement.
///
/// Returns `None` if the product does not exist or does not have enough stock. No locks are held beyond those of the
/// surrounding transaction, if any.
pub async fn reserve_inventory(
    product_id: ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Reservation>, sqlx::Error> {
    let row: Option<(ProductId, Money)> = sqlx::query_as(
        r#"
            UPDATE products SET inventory = inventory - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND inventory >= $1
            RETURNING id, price;
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    let reservation =
        row.map(|(product_id, unit_price)| Reservation { product_id, quantity, unit_price });
    match &reservation {
        Some(r) => trace!("🗃️ Reserved {quantity} x product #{product_id} at {}", r.unit_price),
        None => trace!("🗃️ Could not reserve {quantity} x product #{product_id}"),
    }
    Ok(reservation)
}

/// The stock level for a product, or `None` if it does not exist.
pub async fn fetch_inventory(product_id: ProductId, conn: &mut SqliteConnection) -> Result<Option<i64>, sqlx::Error> {
    let inventory: Option<(i64,)> = sqlx::query_as("SELECT inventory FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(inventory.map(|(v,)| v))
}
