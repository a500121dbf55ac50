//! An in-process [`CartStore`].
//!
//! Carts are only ever read and cleared by checkout, so they do not need to survive a restart. This store keeps them
//! in a map behind a mutex, with the same expiry rules as the SQLite store. Clones share the same carts.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Duration, Utc};
use log::trace;

use crate::{
    db_types::{CartContents, ProductId, UserId},
    traits::{CartError, CartStore, DEFAULT_CART_TTL_HOURS},
};

#[derive(Debug, Clone)]
struct Cart {
    items: CartContents,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MemoryCartStore {
    carts: Arc<Mutex<HashMap<UserId, Cart>>>,
    ttl: Duration,
}

impl Default for MemoryCartStore {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_CART_TTL_HOURS))
    }
}

impl MemoryCartStore {
    pub fn new(ttl: Duration) -> Self {
        Self { carts: Arc::new(Mutex::new(HashMap::new())), ttl }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, Cart>>, CartError> {
        self.carts.lock().map_err(|e| CartError::StorageError(format!("Cart store lock is poisoned. {e}")))
    }

    /// Returns the live cart for the user, creating an empty one if needed, with its expiry pushed out.
    fn touch<'a>(&self, carts: &'a mut HashMap<UserId, Cart>, user_id: UserId) -> &'a mut Cart {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let cart = carts.entry(user_id).or_insert_with(|| Cart { items: CartContents::new(), expires_at });
        if cart.expires_at <= now {
            trace!("🛒️ Cart for user {user_id} expired");
            cart.items.clear();
        }
        cart.expires_at = expires_at;
        cart
    }
}

impl CartStore for MemoryCartStore {
    async fn get_cart(&self, user_id: UserId) -> Result<CartContents, CartError> {
        let mut carts = self.lock()?;
        if !carts.contains_key(&user_id) {
            return Ok(CartContents::new());
        }
        let cart = self.touch(&mut carts, user_id);
        Ok(cart.items.clone())
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<(), CartError> {
        self.lock()?.remove(&user_id);
        Ok(())
    }

    async fn add_item(&self, user_id: UserId, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let mut carts = self.lock()?;
        let cart = self.touch(&mut carts, user_id);
        let current = cart.items.get(&product_id).copied().unwrap_or(0);
        let total = current.checked_add(quantity).ok_or(CartError::QuantityTooLarge(quantity))?;
        CartError::check_line_quantity(total)?;
        cart.items.insert(product_id, total);
        Ok(())
    }

    async fn set_item(&self, user_id: UserId, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        CartError::check_line_quantity(quantity)?;
        let mut carts = self.lock()?;
        let cart = self.touch(&mut carts, user_id);
        if quantity <= 0 {
            cart.items.remove(&product_id);
        } else {
            cart.items.insert(product_id, quantity);
        }
        Ok(())
    }

    async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Result<(), CartError> {
        let mut carts = self.lock()?;
        let cart = self.touch(&mut carts, user_id);
        cart.items.remove(&product_id);
        Ok(())
    }
}
