use std::{fmt::Debug, net::IpAddr};

use log::*;

use crate::{
    db_types::{OrderId, OrderStatusType},
    events::{EventProducers, OrderAnnulledEvent, OrderPaidEvent},
    helpers::AddressAllowList,
    shop_api::notification_objects::{PaymentNotification, EVENT_PAYMENT_CANCELED, EVENT_PAYMENT_SUCCEEDED},
    traits::{OrderError, OrderManagement, StatusTransition},
};

/// How a payment notification was handled. The provider only sees the status code: anything other than `200` makes
/// it retry the notification later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookResponse {
    /// Processed, or deliberately ignored.
    Ok,
    /// The sender is not one of the provider's addresses. The body was not read.
    Forbidden,
    /// The body is not a well-formed notification, or carries no usable order id.
    BadRequest,
    /// The notification was valid, but the order could not be brought into line with it.
    InternalError,
}

impl WebhookResponse {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Forbidden => 403,
            Self::BadRequest => 400,
            Self::InternalError => 500,
        }
    }
}

/// `ReconciliationApi` applies the provider's asynchronous payment notifications to orders.
///
/// Notifications can arrive late, more than once, or in any order. All status writes are guarded so that only a
/// `pending` order ever changes:
/// * a repeated `payment.succeeded` for a paid order is acknowledged and changes nothing,
/// * a late `payment.canceled` can never overwrite `paid`,
/// * a `payment.succeeded` for a canceled order is refused with [`WebhookResponse::InternalError`], so that the
///   provider keeps the notification alive and the conflict is visible in the logs for manual resolution.
pub struct ReconciliationApi<B> {
    db: B,
    allow_list: AddressAllowList,
    producers: EventProducers,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi ({})", self.allow_list)
    }
}

impl<B> ReconciliationApi<B> {
    pub fn new(db: B, allow_list: AddressAllowList, producers: EventProducers) -> Self {
        Self { db, allow_list, producers }
    }
}

impl<B> ReconciliationApi<B>
where B: OrderManagement
{
    /// Handles one notification. `source` is the address the notification came from, if it could be determined.
    pub async fn handle_notification(&self, source: Option<IpAddr>, body: &[u8]) -> WebhookResponse {
        let allowed = match source {
            Some(ip) => self.allow_list.contains(&ip),
            None => {
                warn!("🪝️ Payment notification has no identifiable source address. Denying access.");
                false
            },
        };
        if !allowed {
            warn!("🪝️ Payment notification from {source:?} is not from an allowed address. Denying access.");
            return WebhookResponse::Forbidden;
        }
        let notification = match serde_json::from_slice::<PaymentNotification>(body) {
            Ok(n) => n,
            Err(e) => {
                warn!("🪝️ Could not parse payment notification. {e}");
                return WebhookResponse::BadRequest;
            },
        };
        if !notification.is_notification() {
            debug!("🪝️ Ignoring message of type '{}'", notification.notification_type);
            return WebhookResponse::Ok;
        }
        trace!("🪝️ {} received for payment {}", notification.event, notification.object.id);
        match notification.event.as_str() {
            EVENT_PAYMENT_SUCCEEDED => self.payment_succeeded(&notification).await,
            EVENT_PAYMENT_CANCELED => self.payment_canceled(&notification).await,
            other => {
                debug!("🪝️ Ignoring unhandled event '{other}' for payment {}", notification.object.id);
                WebhookResponse::Ok
            },
        }
    }

    async fn payment_succeeded(&self, notification: &PaymentNotification) -> WebhookResponse {
        let Some(order_id) = notification.order_id() else {
            warn!("🪝️ Payment {} succeeded, but it carries no valid order id", notification.object.id);
            return WebhookResponse::BadRequest;
        };
        match self.transition(order_id, OrderStatusType::Paid).await {
            Ok(StatusTransition::Applied(order)) => {
                info!("🪝️ Order #{order_id} has been paid (payment {})", notification.object.id);
                self.producers.publish_order_paid(OrderPaidEvent::new(order)).await;
                WebhookResponse::Ok
            },
            Ok(StatusTransition::AlreadyInStatus(_)) => {
                debug!("🪝️ Order #{order_id} is already paid. Duplicate notification acknowledged.");
                WebhookResponse::Ok
            },
            Ok(StatusTransition::Rejected(order)) => {
                error!(
                    "🪝️ Payment {} succeeded for order #{order_id}, but the order is {}. This needs to be resolved \
                     manually.",
                    notification.object.id, order.status
                );
                WebhookResponse::InternalError
            },
            Ok(StatusTransition::NotFound) => {
                error!("🪝️ Payment {} succeeded for order #{order_id}, which does not exist", notification.object.id);
                WebhookResponse::InternalError
            },
            Err(e) => {
                error!("🪝️ Could not mark order #{order_id} as paid. {e}");
                WebhookResponse::InternalError
            },
        }
    }

    /// Cancellation is best effort. Whatever happens, the provider is told the notification was received.
    async fn payment_canceled(&self, notification: &PaymentNotification) -> WebhookResponse {
        let Some(order_id) = notification.order_id() else {
            debug!("🪝️ Payment {} was canceled, but it carries no valid order id. Ignoring.", notification.object.id);
            return WebhookResponse::Ok;
        };
        match self.transition(order_id, OrderStatusType::Canceled).await {
            Ok(StatusTransition::Applied(order)) => {
                info!("🪝️ Order #{order_id} has been canceled (payment {})", notification.object.id);
                self.producers.publish_order_annulled(OrderAnnulledEvent::new(order)).await;
            },
            Ok(StatusTransition::AlreadyInStatus(_)) => {
                debug!("🪝️ Order #{order_id} is already canceled. Duplicate notification acknowledged.");
            },
            Ok(StatusTransition::Rejected(order)) => {
                warn!("🪝️ Ignoring cancellation of order #{order_id}, which is already {}", order.status);
            },
            Ok(StatusTransition::NotFound) => {
                warn!("🪝️ Ignoring cancellation of order #{order_id}, which does not exist");
            },
            Err(e) => {
                warn!("🪝️ Could not cancel order #{order_id}. {e}");
            },
        }
        WebhookResponse::Ok
    }

    async fn transition(&self, order_id: OrderId, status: OrderStatusType) -> Result<StatusTransition, OrderError> {
        self.db.transition_order_status(order_id, status).await
    }
}
