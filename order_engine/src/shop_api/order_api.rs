use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderId, OrderStatusType, OrderWithItems, UserId},
    events::{EventProducers, OrderAnnulledEvent, OrderPaidEvent},
    traits::{OrderError, OrderManagement},
};

/// `OrderApi` lets customers look at their own orders, and lets administrators override an order's status.
pub struct OrderApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B: Debug> Debug for OrderApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi ({:?})", self.db)
    }
}

impl<B> OrderApi<B>
where B: OrderManagement
{
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    /// All of the user's orders, newest first.
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    /// The order and its items. Orders belonging to other users are reported as missing.
    pub async fn order_for_user(&self, order_id: OrderId, user_id: UserId) -> Result<Option<OrderWithItems>, OrderError> {
        self.db.fetch_order_for_user(order_id, user_id).await
    }

    /// Sets the order status regardless of its current value, and publishes the matching event. Use this to resolve
    /// orders that the provider and the store disagree about.
    pub async fn force_status(
        &self,
        order_id: OrderId,
        status: OrderStatusType,
        reason: &str,
    ) -> Result<Order, OrderError> {
        let previous = self.db.fetch_order_by_id(order_id).await?.ok_or(OrderError::OrderNotFound(order_id))?;
        let order = self.db.force_order_status(order_id, status).await?;
        warn!(
            "🛒️ Order #{order_id} status was changed from {} to {status} by an administrator. Reason: {reason}",
            previous.status
        );
        if previous.status != status {
            match status {
                OrderStatusType::Paid => self.producers.publish_order_paid(OrderPaidEvent::new(order.clone())).await,
                OrderStatusType::Canceled => {
                    self.producers.publish_order_annulled(OrderAnnulledEvent::new(order.clone())).await
                },
                OrderStatusType::Pending => {},
            }
        }
        Ok(order)
    }
}
