use thiserror::Error;

use crate::{
    db_types::{Order, OrderId, OrderStatusType, OrderWithItems, UserId},
    traits::data_objects::StatusTransition,
};

#[derive(Debug, Clone, Error)]
pub enum OrderError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        OrderError::DatabaseError(e.to_string())
    }
}

/// Queries and status changes for orders that already exist.
///
/// Orders are created exclusively by [`crate::traits::CheckoutDatabase::place_order`].
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// All orders for the user, newest first.
    async fn fetch_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError>;

    /// Fetches the order, with its items joined against the catalog, if and only if it belongs to `user_id`.
    async fn fetch_order_for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Option<OrderWithItems>, OrderError>;

    async fn fetch_order_by_id(&self, order_id: OrderId) -> Result<Option<Order>, OrderError>;

    /// Moves a `pending` order to `new_status` with a single conditional write.
    ///
    /// An order that is already in `new_status` is left alone and reported as [`StatusTransition::AlreadyInStatus`],
    /// so redelivered notifications are harmless. An order in any other final status is never overwritten.
    async fn transition_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatusType,
    ) -> Result<StatusTransition, OrderError>;

    /// Unconditionally sets the order status. This is the administrative escape hatch for orders that the provider
    /// and the store disagree about, and it is the only way to leave a final status.
    async fn force_order_status(&self, order_id: OrderId, new_status: OrderStatusType) -> Result<Order, OrderError>;
}
