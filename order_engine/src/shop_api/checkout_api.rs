use std::{collections::HashMap, fmt::Debug, time::Duration};

use log::*;
use shop_common::Money;

use crate::{
    db_types::{CartContents, CartLine, Order, Product, ProductId, UserId},
    events::{EventProducers, OrderCreatedEvent},
    shop_api::{
        checkout_objects::{CheckoutOutcome, CheckoutWarning},
        errors::CheckoutError,
    },
    traits::{CartStore, CatalogManagement, CheckoutDatabase, PaymentGateway, PaymentGatewayError, PaymentRedirect},
};

pub const DEFAULT_PAYMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// `CheckoutApi` turns a user's cart into a committed order and starts the payment for it.
///
/// Checkout happens in two phases.
/// 1. The all-or-nothing phase. The cart is read, every product is checked against the catalog, and then stock is
///    reserved and the order written in a single database transaction. If anything fails here, nothing has changed
///    and a [`CheckoutError`] is returned.
/// 2. The best-effort phase. Once the order is committed, the cart is cleared and a payment is requested from the
///    provider. Failures here are logged and reported as [`CheckoutWarning`]s on the outcome, but never undo the
///    order. An order whose payment could not be started simply stays `pending`.
pub struct CheckoutApi<B, C, P> {
    db: B,
    carts: C,
    payments: P,
    producers: EventProducers,
    payment_timeout: Duration,
}

impl<B, C, P> Debug for CheckoutApi<B, C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B, C, P> CheckoutApi<B, C, P> {
    pub fn new(db: B, carts: C, payments: P, producers: EventProducers) -> Self {
        Self { db, carts, payments, producers, payment_timeout: DEFAULT_PAYMENT_TIMEOUT }
    }

    /// Sets the upper bound on how long checkout waits for the payment provider.
    pub fn with_payment_timeout(mut self, timeout: Duration) -> Self {
        self.payment_timeout = timeout;
        self
    }
}

impl<B, C, P> CheckoutApi<B, C, P>
where
    B: CatalogManagement + CheckoutDatabase,
    C: CartStore,
    P: PaymentGateway,
{
    /// Places an order for everything in the user's cart.
    ///
    /// The order total is computed from the prices read while reserving stock, never from the cart.
    pub async fn create_order(&self, user_id: UserId) -> Result<CheckoutOutcome, CheckoutError> {
        let cart = self.carts.get_cart(user_id).await?;
        let lines = cart_lines(&cart);
        if lines.is_empty() {
            debug!("🛒️ User {user_id} tried to check out with an empty cart");
            return Err(CheckoutError::EmptyCart);
        }
        let ids = lines.iter().map(|l| l.product_id).collect::<Vec<ProductId>>();
        let products = self.db.fetch_products_by_ids(&ids).await?;
        check_against_catalog(&lines, &products)?;
        trace!("🛒️ Cart for user {user_id} passed the stock pre-check. Reserving {} lines", lines.len());

        let placed = self.db.place_order(user_id, &lines).await.map_err(|e| {
            warn!("🛒️ Checkout for user {user_id} failed. {e}");
            CheckoutError::from(e)
        })?;
        let order = placed.order;
        let items = placed.items;
        info!("🛒️ Order #{} placed for user {user_id}. Total: {}", order.id, order.total_amount);

        let mut warnings = Vec::new();
        if let Err(e) = self.carts.clear_cart(user_id).await {
            warn!("🛒️ Order #{} was placed, but the cart for user {user_id} could not be cleared. {e}", order.id);
            warnings.push(CheckoutWarning::CartNotCleared(e.to_string()));
        }
        let payment = match self.initiate_payment(&order).await {
            Ok(redirect) => {
                debug!("🛒️ Payment {} created for order #{}", redirect.payment_id, order.id);
                Some(redirect)
            },
            Err(e) => {
                warn!("🛒️ Order #{} was placed, but payment could not be initiated. It will remain pending. {e}", order.id);
                warnings.push(CheckoutWarning::PaymentInitiationFailed(e.to_string()));
                None
            },
        };
        self.producers.publish_order_created(OrderCreatedEvent::new(order.clone(), items.clone())).await;
        Ok(CheckoutOutcome { order, items, payment, warnings })
    }

    async fn initiate_payment(&self, order: &Order) -> Result<PaymentRedirect, PaymentGatewayError> {
        match tokio::time::timeout(self.payment_timeout, self.payments.create_payment(order)).await {
            Ok(result) => result,
            Err(_) => Err(PaymentGatewayError::Timeout),
        }
    }
}

/// Converts the cart into reservation lines, in ascending product order. Non-positive quantities are dropped.
fn cart_lines(cart: &CartContents) -> Vec<CartLine> {
    let mut lines = cart
        .iter()
        .filter(|(_, &quantity)| quantity > 0)
        .map(|(&product_id, &quantity)| CartLine::new(product_id, quantity))
        .collect::<Vec<_>>();
    lines.sort_by_key(|l| l.product_id);
    lines
}

/// The optimistic pre-check. It fails fast on obviously impossible carts without touching stock, but it is not what
/// guarantees correctness: stock can change between this check and the reservation, which re-checks atomically.
fn check_against_catalog(lines: &[CartLine], products: &[Product]) -> Result<(), CheckoutError> {
    let catalog = products.iter().map(|p| (p.id, p)).collect::<HashMap<ProductId, &Product>>();
    let mut total = Money::default();
    for line in lines {
        let product = catalog.get(&line.product_id).ok_or(CheckoutError::ProductNotFound(line.product_id))?;
        if line.quantity > product.inventory {
            return Err(CheckoutError::InsufficientInventory {
                product_id: line.product_id,
                requested: line.quantity,
                available: product.inventory,
            });
        }
        total = product
            .price
            .checked_mul(line.quantity)
            .and_then(|subtotal| total.checked_add(subtotal))
            .ok_or(CheckoutError::TotalTooLarge)?;
    }
    Ok(())
}
