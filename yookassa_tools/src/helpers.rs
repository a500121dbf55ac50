use shop_common::Money;

/// YooKassa wants amounts as decimal strings with exactly two places, e.g. `"25.00"`.
pub fn yookassa_amount(amount: Money) -> String {
    amount.to_string()
}

/// Every payment attempt needs its own idempotence key, otherwise YooKassa replays the first response.
pub fn idempotence_key(order_id: i64) -> String {
    format!("{order_id}-{}", uuid::Uuid::new_v4())
}

pub fn order_description(order_id: i64) -> String {
    format!("Заказ №{order_id}")
}
