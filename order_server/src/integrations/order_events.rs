//! Order lifecycle hooks for the server.
//!
//! Out of the box, the server only records order events in the log, under the `shop::orders` target. This is the
//! place to add notifications to customers or to fulfilment.
use log::*;
use order_engine::events::{EventHandlers, EventHooks, OrderAnnulledEvent};

const ORDER_EVENT_BUFFER_SIZE: usize = 25;
const ORDER_LOG_TARGET: &str = "shop::orders";

pub fn create_order_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_created(|ev| {
        Box::pin(async move {
            let units: i64 = ev.items.iter().map(|i| i.quantity).sum();
            info!(
                target: ORDER_LOG_TARGET,
                "📬️ Order #{} created for user {}. {units} units, total {}", ev.order.id, ev.order.user_id,
                ev.order.total_amount
            );
        })
    });
    hooks.on_order_paid(|ev| {
        Box::pin(async move {
            info!(target: ORDER_LOG_TARGET, "📬️ Order #{} has been paid ({})", ev.order.id, ev.order.total_amount);
        })
    });
    hooks.on_order_annulled(|ev| {
        let OrderAnnulledEvent { order, status } = ev;
        Box::pin(async move {
            info!(target: ORDER_LOG_TARGET, "📬️ Order #{} has been annulled. Status: {status}", order.id);
        })
    });
    EventHandlers::new(ORDER_EVENT_BUFFER_SIZE, hooks)
}
