use thiserror::Error;

use crate::{
    db_types::{CartLine, ProductId, UserId},
    traits::data_objects::PlacedOrder,
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutDatabaseError {
    #[error("Not enough inventory for product {product_id}: need {requested}, available {available}")]
    InsufficientInventory { product_id: ProductId, requested: i64, available: i64 },
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),
    #[error("Checkout requires at least one line item")]
    NoLineItems,
    #[error("The order total is too large")]
    TotalTooLarge,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CheckoutDatabaseError {
    fn from(e: sqlx::Error) -> Self {
        CheckoutDatabaseError::DatabaseError(e.to_string())
    }
}

/// The atomic part of checkout.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase {
    /// In a single transaction:
    /// * reserves stock for every line with a conditional decrement, reading the unit price in the same statement,
    /// * inserts a `pending` order whose total is the sum of the reserved line subtotals,
    /// * inserts the order items at the reserved prices.
    ///
    /// If any line cannot be reserved, or any write fails, the transaction is rolled back and nothing changes.
    async fn place_order(&self, user_id: UserId, lines: &[CartLine]) -> Result<PlacedOrder, CheckoutDatabaseError>;
}
