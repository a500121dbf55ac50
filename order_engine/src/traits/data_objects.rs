use serde::{Deserialize, Serialize};
use shop_common::Money;

use crate::db_types::{Order, OrderItem, ProductId};

/// The result of a successful conditional inventory decrement.
///
/// `unit_price` is the catalog price read by the same statement that took the stock, so the price charged always
/// matches the stock that was reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

impl Reservation {
    /// `None` if the subtotal does not fit in a [`Money`] value.
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// A freshly committed order, with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// The outcome of a guarded status change on an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTransition {
    /// The order was `pending` and now has the requested status.
    Applied(Order),
    /// The order already had the requested status. Nothing was written.
    AlreadyInStatus(Order),
    /// The order is in a different final status, and cannot be moved by this transition.
    Rejected(Order),
    /// No order with that id exists.
    NotFound,
}

impl StatusTransition {
    /// True if, after this call, the order is in the requested status.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Applied(_) | Self::AlreadyInStatus(_))
    }
}

/// Where to send the customer to complete a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRedirect {
    /// The provider's identifier for the payment.
    pub payment_id: String,
    pub confirmation_url: String,
    pub status: String,
}
