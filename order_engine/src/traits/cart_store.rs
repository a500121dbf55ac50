use thiserror::Error;

use crate::db_types::{CartContents, ProductId, UserId};

/// How long an untouched cart lives, unless configured otherwise.
pub const DEFAULT_CART_TTL_HOURS: i64 = 24 * 7;
/// The most units of one product a cart line may hold.
pub const MAX_CART_QUANTITY: i64 = 10_000;

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("Cart storage error: {0}")]
    StorageError(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),
    #[error("Quantity {0} is more than the {MAX_CART_QUANTITY} units a cart line may hold")]
    QuantityTooLarge(i64),
}

impl CartError {
    /// Checks that `quantity` units fit in one cart line.
    pub fn check_line_quantity(quantity: i64) -> Result<(), CartError> {
        if quantity > MAX_CART_QUANTITY {
            return Err(CartError::QuantityTooLarge(quantity));
        }
        Ok(())
    }
}

impl From<sqlx::Error> for CartError {
    fn from(e: sqlx::Error) -> Self {
        CartError::StorageError(e.to_string())
    }
}

/// Ephemeral per-user carts.
///
/// A cart is not the source of truth for anything: prices and stock are always re-read from the catalog at checkout.
/// Carts expire after a period of inactivity. Every mutation, and every read, pushes the expiry time out again.
#[allow(async_fn_in_trait)]
pub trait CartStore {
    /// Returns the current cart for the user. A user with no cart, or an expired cart, gets an empty map.
    async fn get_cart(&self, user_id: UserId) -> Result<CartContents, CartError>;

    /// Empties the user's cart. Clearing an empty cart is not an error.
    async fn clear_cart(&self, user_id: UserId) -> Result<(), CartError>;

    /// Adds `quantity` units of the product to the cart. `quantity` must be positive.
    async fn add_item(&self, user_id: UserId, product_id: ProductId, quantity: i64) -> Result<(), CartError>;

    /// Sets the quantity of the product in the cart. A quantity of zero or less removes the product.
    async fn set_item(&self, user_id: UserId, product_id: ProductId, quantity: i64) -> Result<(), CartError>;

    /// Removes the product from the cart. Removing a product that is not in the cart is not an error.
    async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Result<(), CartError>;
}
