//! Cart rows live in `cart_items`, one row per (user, product). Every row carries the expiry time of the whole cart,
//! and every access refreshes it for all of the user's rows.
use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{CartContents, ProductId, UserId};

/// Deletes the user's cart if it has expired at `now` (unix seconds).
pub async fn purge_expired(user_id: UserId, now: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND expires_at <= $2")
        .bind(user_id)
        .bind(now)
        .execute(conn)
        .await?;
    let purged = result.rows_affected();
    if purged > 0 {
        trace!("🗃️ Purged {purged} expired cart rows for user {user_id}");
    }
    Ok(purged)
}

pub async fn fetch_cart(user_id: UserId, conn: &mut SqliteConnection) -> Result<CartContents, sqlx::Error> {
    let rows: Vec<(ProductId, i64)> = sqlx::query_as("SELECT product_id, quantity FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().collect())
}

pub async fn refresh_expiry(user_id: UserId, expires_at: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE cart_items SET expires_at = $1 WHERE user_id = $2")
        .bind(expires_at)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Adds `quantity` units to the cart line, unless the line would then hold more than `max_quantity` units. Returns
/// false, and writes nothing, in that case.
pub async fn increment_item(
    user_id: UserId,
    product_id: ProductId,
    quantity: i64,
    max_quantity: i64,
    expires_at: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            INSERT INTO cart_items (user_id, product_id, quantity, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = quantity + excluded.quantity, expires_at = excluded.expires_at
            WHERE quantity + excluded.quantity <= $5;
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .bind(expires_at)
    .bind(max_quantity)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_item(
    user_id: UserId,
    product_id: ProductId,
    quantity: i64,
    expires_at: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO cart_items (user_id, product_id, quantity, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = excluded.quantity, expires_at = excluded.expires_at;
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .bind(expires_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn remove_item(user_id: UserId, product_id: ProductId, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
        .bind(user_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn clear_cart(user_id: UserId, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1").bind(user_id).execute(conn).await?;
    Ok(())
}
