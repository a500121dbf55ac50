use serde::{Deserialize, Serialize};
use shop_common::Money;

use crate::db_types::{Product, ProductId};

/// A cart line, priced against the current catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub quantity: i64,
    pub subtotal: Money,
}

impl CartItemView {
    /// Prices the line. Returns `None` if the subtotal is too large to represent.
    pub fn new(product: &Product, quantity: i64) -> Option<Self> {
        Some(Self {
            product_id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            quantity,
            subtotal: product.price.checked_mul(quantity)?,
        })
    }
}

/// The cart as the customer sees it. The total is indicative only: the order total is fixed when stock is reserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: Money,
    /// The number of units in the cart, not the number of lines.
    pub item_count: i64,
}

impl CartView {
    /// Returns `None` if the total or the unit count is too large to represent.
    pub fn new(items: Vec<CartItemView>) -> Option<Self> {
        let total = Money::checked_sum(items.iter().map(|i| i.subtotal))?;
        let item_count = items.iter().try_fold(0i64, |count, i| count.checked_add(i.quantity))?;
        Some(Self { items, total, item_count })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
