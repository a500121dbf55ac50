use std::{collections::HashMap, fmt::Debug};

use log::*;

use crate::{
    db_types::{Product, ProductId, UserId},
    shop_api::cart_objects::{CartItemView, CartView},
    traits::{CartError, CartStore, CatalogError, CatalogManagement},
};

#[derive(Debug, Clone, thiserror::Error)]
pub enum CartApiError {
    #[error("{0}")]
    Cart(#[from] CartError),
    #[error("{0}")]
    Catalog(#[from] CatalogError),
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("the cart total is too large")]
    TotalTooLarge,
}

/// `CartApi` manages the customer's cart. Items are checked against the catalog when they are added, and the cart is
/// priced against the catalog every time it is read.
pub struct CartApi<B, C> {
    db: B,
    carts: C,
}

impl<B, C> Debug for CartApi<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B, C> CartApi<B, C>
where
    B: CatalogManagement,
    C: CartStore,
{
    pub fn new(db: B, carts: C) -> Self {
        Self { db, carts }
    }

    /// The user's cart, priced at current catalog prices. Products that have left the catalog are skipped.
    pub async fn cart_view(&self, user_id: UserId) -> Result<CartView, CartApiError> {
        let cart = self.carts.get_cart(user_id).await?;
        if cart.is_empty() {
            return Ok(CartView::default());
        }
        let mut ids = cart.keys().copied().collect::<Vec<ProductId>>();
        ids.sort_unstable();
        let products = self.db.fetch_products_by_ids(&ids).await?;
        let catalog = products.iter().map(|p| (p.id, p)).collect::<HashMap<ProductId, &Product>>();
        let mut items = Vec::with_capacity(ids.len());
        for id in &ids {
            match catalog.get(id) {
                Some(product) => {
                    let item = CartItemView::new(product, cart[id]).ok_or(CartApiError::TotalTooLarge)?;
                    items.push(item);
                },
                None => debug!("🛒️ Product #{id} in the cart for user {user_id} is no longer in the catalog"),
            }
        }
        CartView::new(items).ok_or(CartApiError::TotalTooLarge)
    }

    /// Adds units of a catalog product to the cart. Stock is not checked here; that happens at checkout.
    pub async fn add_item(&self, user_id: UserId, product_id: ProductId, quantity: i64) -> Result<(), CartApiError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity).into());
        }
        CartError::check_line_quantity(quantity)?;
        self.ensure_product_exists(product_id).await?;
        self.carts.add_item(user_id, product_id, quantity).await?;
        trace!("🛒️ User {user_id} added {quantity} x #{product_id} to their cart");
        Ok(())
    }

    /// Sets the quantity of a cart line. Zero or less removes it.
    pub async fn set_item(&self, user_id: UserId, product_id: ProductId, quantity: i64) -> Result<(), CartApiError> {
        if quantity > 0 {
            CartError::check_line_quantity(quantity)?;
            self.ensure_product_exists(product_id).await?;
        }
        self.carts.set_item(user_id, product_id, quantity).await?;
        Ok(())
    }

    pub async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Result<(), CartApiError> {
        self.carts.remove_item(user_id, product_id).await?;
        Ok(())
    }

    pub async fn clear(&self, user_id: UserId) -> Result<(), CartApiError> {
        self.carts.clear_cart(user_id).await?;
        Ok(())
    }

    async fn ensure_product_exists(&self, product_id: ProductId) -> Result<(), CartApiError> {
        let found = self.db.fetch_products_by_ids(&[product_id]).await?;
        if found.is_empty() {
            return Err(CartApiError::ProductNotFound(product_id));
        }
        Ok(())
    }
}
