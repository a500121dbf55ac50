//! # Order engine public API
//!
//! The `shop_api` module exposes the programmatic API of the order engine. Each API is generic over the backend
//! traits it needs, so clients pick only the functionality they use.
//!
//! * [`checkout_api`] turns a cart into an order, reserving stock atomically, and starts the payment.
//! * [`reconciliation_api`] applies the payment provider's notifications to orders.
//! * [`catalog_api`], [`cart_api`] and [`order_api`] cover the catalog, the customer's cart and order history, and
//!   the administrative status override.
//!
//! # API usage
//!
//! An API instance is created by supplying backends that implement the traits the API requires.
//!
//! ```rust,ignore
//! use order_engine::{CheckoutApi, SqliteDatabase, events::EventProducers};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements CatalogManagement, CheckoutDatabase and CartStore
//! let api = CheckoutApi::new(db.clone(), db, gateway, EventProducers::default());
//! let outcome = api.create_order(user_id).await?;
//! ```
pub mod cart_api;
pub mod cart_objects;
pub mod catalog_api;
pub mod checkout_api;
pub mod checkout_objects;
pub mod errors;
pub mod notification_objects;
pub mod order_api;
pub mod reconciliation_api;
