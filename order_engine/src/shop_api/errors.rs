use thiserror::Error;

use crate::{
    db_types::ProductId,
    traits::{CartError, CatalogError, CheckoutDatabaseError},
};

/// Reasons a checkout did not produce an order. In every case, no inventory was taken and no order exists.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("not enough inventory for product {product_id}: need {requested}, available {available}")]
    InsufficientInventory { product_id: ProductId, requested: i64, available: i64 },
    #[error("the order total is too large")]
    TotalTooLarge,
    #[error("the cart could not be read. {0}")]
    CartUnavailable(String),
    #[error("the order could not be stored. {0}")]
    PersistenceFailure(String),
}

impl From<CatalogError> for CheckoutError {
    fn from(e: CatalogError) -> Self {
        Self::PersistenceFailure(e.to_string())
    }
}

impl From<CartError> for CheckoutError {
    fn from(e: CartError) -> Self {
        Self::CartUnavailable(e.to_string())
    }
}

impl From<CheckoutDatabaseError> for CheckoutError {
    fn from(e: CheckoutDatabaseError) -> Self {
        match e {
            CheckoutDatabaseError::InsufficientInventory { product_id, requested, available } => {
                Self::InsufficientInventory { product_id, requested, available }
            },
            CheckoutDatabaseError::ProductNotFound(id) => Self::ProductNotFound(id),
            CheckoutDatabaseError::NoLineItems => Self::EmptyCart,
            CheckoutDatabaseError::TotalTooLarge => Self::TotalTooLarge,
            CheckoutDatabaseError::DatabaseError(s) => Self::PersistenceFailure(s),
        }
    }
}
