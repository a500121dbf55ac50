use std::{collections::HashMap, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use shop_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;

pub type UserId = i64;
pub type ProductId = i64;
pub type OrderId = i64;

/// A user's cart: product id to quantity. Quantities are always at least one; a product that is removed from the cart
/// is removed from the map.
pub type CartContents = HashMap<ProductId, i64>;

//--------------------------------------        Product        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    /// Units in stock. The database refuses to let this go negative.
    pub inventory: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewProduct      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub inventory: i64,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid product. {0}")]
pub struct ProductValidationError(pub String);

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Money, inventory: i64) -> Self {
        Self { name: name.into(), description: String::default(), price, inventory }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> Result<(), ProductValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProductValidationError("A product name is required".into()));
        }
        if !self.price.is_positive() {
            return Err(ProductValidationError(format!("Price must be positive, got {}", self.price)));
        }
        if self.inventory < 0 {
            return Err(ProductValidationError(format!("Inventory cannot be negative, got {}", self.inventory)));
        }
        Ok(())
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been placed and inventory reserved, but payment has not been confirmed.
    Pending,
    /// The payment provider has confirmed payment for the order.
    Paid,
    /// The payment was cancelled, or the order was cancelled by an administrator.
    Canceled,
}

impl OrderStatusType {
    /// `Paid` and `Canceled` are terminal. Only the administrative override moves an order out of them.
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Paid => write!(f, "paid"),
            OrderStatusType::Canceled => write!(f, "canceled"),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to pending");
            OrderStatusType::Pending
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            _ => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatusType,
    /// Computed once at checkout from the prices that were reserved. Never recomputed.
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// The unit price at the moment inventory was reserved.
    pub price_at_purchase: Money,
}

impl OrderItem {
    pub fn subtotal(&self) -> Money {
        self.price_at_purchase * self.quantity
    }
}

//--------------------------------------      OrderLine        ---------------------------------------------------------
/// An order item joined with the catalog entry it refers to, for display.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub price_at_purchase: Money,
}

impl OrderLine {
    pub fn subtotal(&self) -> Money {
        self.price_at_purchase * self.quantity
    }
}

//--------------------------------------   OrderWithItems      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderLine>,
}

//--------------------------------------      CartLine         ---------------------------------------------------------
/// One line of a cart snapshot that has been checked against the catalog, and is about to be reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self { product_id, quantity }
    }
}
