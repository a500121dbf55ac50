//! # Backend capability traits
//!
//! The order engine never talks to a concrete store. Each API in [`crate::shop_api`] is generic over the handful of
//! capabilities it needs, and backends (or test doubles) implement them.
//!
//! * [`CatalogManagement`] reads and creates products.
//! * [`CartStore`] holds the ephemeral per-user carts.
//! * [`CheckoutDatabase`] provides the all-or-nothing reservation and order insert.
//! * [`OrderManagement`] queries orders and changes their status.
//! * [`PaymentGateway`] initiates payments with the external provider.
mod cart_store;
mod catalog_management;
mod checkout_database;
mod order_management;
mod payment_gateway;

pub mod data_objects;

pub use cart_store::{CartError, CartStore, DEFAULT_CART_TTL_HOURS, MAX_CART_QUANTITY};
pub use catalog_management::{CatalogError, CatalogManagement};
pub use checkout_database::{CheckoutDatabase, CheckoutDatabaseError};
pub use data_objects::{PaymentRedirect, PlacedOrder, Reservation, StatusTransition};
pub use order_management::{OrderError, OrderManagement};
pub use payment_gateway::{PaymentGateway, PaymentGatewayError};
