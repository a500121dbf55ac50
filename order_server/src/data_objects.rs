use std::fmt::Display;

use chrono::{DateTime, Utc};
use order_engine::{
    db_types::{Order, OrderId, OrderLine, OrderStatusType, OrderWithItems, ProductId},
    shop_api::checkout_objects::CheckoutOutcome,
};
use serde::{Deserialize, Serialize};
use shop_common::Money;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The response to a successful checkout. `payment_url` is empty if the payment could not be started, in which case
/// `message` says so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: OrderId,
    pub status: OrderStatusType,
    pub total_amount: Money,
    pub payment_url: String,
    pub message: String,
}

impl From<CheckoutOutcome> for CreateOrderResponse {
    fn from(outcome: CheckoutOutcome) -> Self {
        Self {
            order_id: outcome.order.id,
            status: outcome.order.status,
            total_amount: outcome.order.total_amount,
            payment_url: outcome.payment_url(),
            message: outcome.message(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub status: OrderStatusType,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderSummary {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            status: order.status,
            total_amount: order.total_amount,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub quantity: i64,
    pub subtotal: Money,
}

impl From<OrderLine> for OrderItemResponse {
    fn from(line: OrderLine) -> Self {
        let subtotal = line.subtotal();
        Self {
            product_id: line.product_id,
            name: line.name,
            description: line.description,
            price: line.price_at_purchase,
            quantity: line.quantity,
            subtotal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderSummary,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderWithItems> for OrderDetailResponse {
    fn from(value: OrderWithItems) -> Self {
        Self { order: value.order.into(), items: value.items.into_iter().map(OrderItemResponse::from).collect() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartItemParams {
    pub product_id: ProductId,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCartItemParams {
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusParams {
    pub status: OrderStatusType,
    #[serde(default)]
    pub reason: String,
}
