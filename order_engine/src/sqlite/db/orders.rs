use log::{debug, trace};
use shop_common::Money;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Order, OrderId, OrderItem, OrderLine, OrderStatusType, UserId},
    traits::Reservation,
};

/// Inserts a new `pending` order header. This is not atomic. Embed the call inside a transaction along with the
/// item inserts, and pass `&mut tx` as the connection argument.
pub async fn insert_order(
    user_id: UserId,
    total_amount: Money,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (user_id, status, total_amount)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(OrderStatusType::Pending.to_string())
    .bind(total_amount)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order #{} for user {user_id} inserted with total {total_amount}", order.id);
    Ok(order)
}

/// Inserts a line item at the price that was captured when its stock was reserved.
pub async fn insert_order_item(
    order_id: OrderId,
    reservation: &Reservation,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, quantity, price_at_purchase)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(reservation.product_id)
    .bind(reservation.quantity)
    .bind(reservation.unit_price)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_order_by_id(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches the order only if it belongs to `user_id`. Someone else's order is indistinguishable from a missing one.
pub async fn fetch_order_for_user(
    id: OrderId,
    user_id: UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// All orders for the user, newest first.
pub async fn fetch_orders_for_user(user_id: UserId, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    trace!("🗃️ Fetched {} orders for user {user_id}", orders.len());
    Ok(orders)
}

pub async fn fetch_items_for_order(order_id: OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items =
        sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id").bind(order_id).fetch_all(conn).await?;
    Ok(items)
}

/// The order's items, joined with the catalog for the product name and description.
pub async fn fetch_lines_for_order(order_id: OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderLine>, sqlx::Error> {
    let lines = sqlx::query_as(
        r#"
            SELECT oi.product_id, p.name, p.description, oi.quantity, oi.price_at_purchase
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
        "#,
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(lines)
}

/// Sets the status of a `pending` order. Returns `None`, and writes nothing, if the order does not exist or is not
/// `pending` any more.
pub async fn update_pending_order_status(
    id: OrderId,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = 'pending'
            RETURNING *;
        "#,
    )
    .bind(status.to_string())
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Sets the order status regardless of its current value.
pub async fn update_order_status(
    id: OrderId,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
        .bind(status.to_string())
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn count_orders(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders").fetch_one(conn).await?;
    Ok(count)
}
