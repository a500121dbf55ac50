//! Order Engine
//!
//! The order engine turns shopping carts into orders and keeps those orders in step with an external payment
//! provider. It is provider-agnostic: the payment provider, the cart store and the database are all reached through
//! the traits in [`mod@traits`].
//!
//! The library is divided into three main sections:
//! 1. Storage ([`mod@sqlite`]). SQLite is the supported backend. It holds the catalog, the orders and, optionally,
//!    the carts. Its inventory reservation is the only place stock is ever taken, and it is safe under concurrent
//!    checkouts.
//! 2. The public API ([`mod@shop_api`]). [`CheckoutApi`] places orders and starts payments, [`ReconciliationApi`]
//!    applies payment notifications, and the smaller APIs cover the catalog, carts and order history.
//! 3. Events ([`mod@events`]). An event is emitted when an order is created, paid or annulled, and hooks can be
//!    registered to react to them off the request path.
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod memory_cart;
pub mod shop_api;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use memory_cart::MemoryCartStore;
pub use shop_api::{
    cart_api::{CartApi, CartApiError},
    catalog_api::CatalogApi,
    checkout_api::CheckoutApi,
    errors::CheckoutError,
    order_api::OrderApi,
    reconciliation_api::{ReconciliationApi, WebhookResponse},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
