//! `SqliteDatabase` is a concrete implementation of an order engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the storage traits defined in the
//! [`crate::traits`] module. Carts are kept in the same database, in a table with a per-user expiry.
use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::*;
use shop_common::Money;
use sqlx::{migrate, SqlitePool};

use super::db::{carts, db_url, new_pool, orders, products};
use crate::{
    db_types::{
        CartContents,
        CartLine,
        NewProduct,
        Order,
        OrderId,
        OrderStatusType,
        OrderWithItems,
        Product,
        ProductId,
        UserId,
    },
    traits::{
        CartError,
        CartStore,
        CatalogError,
        CatalogManagement,
        CheckoutDatabase,
        CheckoutDatabaseError,
        DEFAULT_CART_TTL_HOURS,
        MAX_CART_QUANTITY,
        OrderError,
        OrderManagement,
        PlacedOrder,
        Reservation,
        StatusTransition,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
    cart_ttl: Duration,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in the `SHOP_DATABASE_URL` environment variable.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool, cart_ttl: Duration::hours(DEFAULT_CART_TTL_HOURS) })
    }

    /// Sets how long an untouched cart survives.
    pub fn with_cart_ttl(mut self, ttl: Duration) -> Self {
        self.cart_ttl = ttl;
        self
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date using the migrations embedded in this crate.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }

    fn cart_expiry(&self) -> i64 {
        (Utc::now() + self.cart_ttl).timestamp()
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products_by_ids(ids, &mut conn).await?;
        Ok(products)
    }

    async fn fetch_all_products(&self) -> Result<Vec<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_all_products(&mut conn).await?;
        Ok(products)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let mut tx = self.pool.begin().await?;
        let product = products::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }
}

impl CartStore for SqliteDatabase {
    async fn get_cart(&self, user_id: UserId) -> Result<CartContents, CartError> {
        let mut conn = self.pool.acquire().await?;
        carts::purge_expired(user_id, Utc::now().timestamp(), &mut conn).await?;
        let cart = carts::fetch_cart(user_id, &mut conn).await?;
        if !cart.is_empty() {
            carts::refresh_expiry(user_id, self.cart_expiry(), &mut conn).await?;
        }
        Ok(cart)
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<(), CartError> {
        let mut conn = self.pool.acquire().await?;
        carts::clear_cart(user_id, &mut conn).await?;
        trace!("🗃️ Cart for user {user_id} cleared");
        Ok(())
    }

    async fn add_item(&self, user_id: UserId, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        CartError::check_line_quantity(quantity)?;
        let expires_at = self.cart_expiry();
        let mut tx = self.pool.begin().await?;
        carts::purge_expired(user_id, Utc::now().timestamp(), &mut tx).await?;
        if !carts::increment_item(user_id, product_id, quantity, MAX_CART_QUANTITY, expires_at, &mut tx).await? {
            return Err(CartError::QuantityTooLarge(quantity));
        }
        carts::refresh_expiry(user_id, expires_at, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn set_item(&self, user_id: UserId, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        CartError::check_line_quantity(quantity)?;
        let expires_at = self.cart_expiry();
        let mut tx = self.pool.begin().await?;
        carts::purge_expired(user_id, Utc::now().timestamp(), &mut tx).await?;
        if quantity <= 0 {
            carts::remove_item(user_id, product_id, &mut tx).await?;
        } else {
            carts::set_item(user_id, product_id, quantity, expires_at, &mut tx).await?;
        }
        carts::refresh_expiry(user_id, expires_at, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Result<(), CartError> {
        let expires_at = self.cart_expiry();
        let mut tx = self.pool.begin().await?;
        carts::remove_item(user_id, product_id, &mut tx).await?;
        carts::refresh_expiry(user_id, expires_at, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

impl CheckoutDatabase for SqliteDatabase {
    async fn place_order(&self, user_id: UserId, lines: &[CartLine]) -> Result<PlacedOrder, CheckoutDatabaseError> {
        if lines.is_empty() {
            return Err(CheckoutDatabaseError::NoLineItems);
        }
        // Reserve in a fixed order so that competing checkouts always contend on the same row first.
        let mut lines = lines.to_vec();
        lines.sort_by_key(|l| l.product_id);
        // The first statement in the transaction is a write, so SQLite takes the write lock up front and competing
        // checkouts wait on the busy timeout instead of failing on a stale read snapshot.
        let mut tx = self.pool.begin().await?;
        let mut reservations = Vec::with_capacity(lines.len());
        for line in &lines {
            match products::reserve_inventory(line.product_id, line.quantity, &mut tx).await? {
                Some(reservation) => reservations.push(reservation),
                None => {
                    let available = products::fetch_inventory(line.product_id, &mut tx).await?;
                    tx.rollback().await?;
                    warn!(
                        "🗃️ Checkout for user {user_id} rolled back. Product #{} could not be reserved ({} requested, \
                         {available:?} available)",
                        line.product_id, line.quantity
                    );
                    return Err(match available {
                        Some(available) => CheckoutDatabaseError::InsufficientInventory {
                            product_id: line.product_id,
                            requested: line.quantity,
                            available,
                        },
                        None => CheckoutDatabaseError::ProductNotFound(line.product_id),
                    });
                },
            }
        }
        let total =
            reservations.iter().map(Reservation::subtotal).collect::<Option<Vec<Money>>>().and_then(Money::checked_sum);
        let Some(total) = total else {
            tx.rollback().await?;
            warn!("🗃️ Checkout for user {user_id} rolled back. The order total does not fit in a money amount");
            return Err(CheckoutDatabaseError::TotalTooLarge);
        };
        let order = orders::insert_order(user_id, total, &mut tx).await?;
        let mut items = Vec::with_capacity(reservations.len());
        for reservation in &reservations {
            items.push(orders::insert_order_item(order.id, reservation, &mut tx).await?);
        }
        tx.commit().await?;
        debug!("🗃️ Order #{} committed with {} items, total {}", order.id, items.len(), order.total_amount);
        Ok(PlacedOrder { order, items })
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_order_for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Option<OrderWithItems>, OrderError> {
        let mut conn = self.pool.acquire().await?;
        let order = match orders::fetch_order_for_user(order_id, user_id, &mut conn).await? {
            Some(order) => order,
            None => return Ok(None),
        };
        let items = orders::fetch_lines_for_order(order.id, &mut conn).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    async fn fetch_order_by_id(&self, order_id: OrderId) -> Result<Option<Order>, OrderError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn transition_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatusType,
    ) -> Result<StatusTransition, OrderError> {
        let mut tx = self.pool.begin().await?;
        if let Some(order) = orders::update_pending_order_status(order_id, new_status, &mut tx).await? {
            tx.commit().await?;
            debug!("🗃️ Order #{order_id} is now {new_status}");
            return Ok(StatusTransition::Applied(order));
        }
        // Nothing was written. Find out why.
        let result = match orders::fetch_order_by_id(order_id, &mut tx).await? {
            None => StatusTransition::NotFound,
            Some(order) if order.status == new_status => StatusTransition::AlreadyInStatus(order),
            Some(order) => StatusTransition::Rejected(order),
        };
        tx.commit().await?;
        Ok(result)
    }

    async fn force_order_status(&self, order_id: OrderId, new_status: OrderStatusType) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::update_order_status(order_id, new_status, &mut tx).await?;
        tx.commit().await?;
        let order = order.ok_or(OrderError::OrderNotFound(order_id))?;
        info!("🗃️ Order #{order_id} status forced to {new_status}");
        Ok(order)
    }
}
