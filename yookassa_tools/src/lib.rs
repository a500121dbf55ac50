//! Client for the parts of the YooKassa payments API that the shop uses: creating a redirect payment for an order.
//!
//! Notifications from YooKassa are not handled here. They are parsed and applied by the order engine.
mod api;
mod config;
mod error;

pub mod data_objects;
pub mod helpers;

pub use api::YooKassaApi;
pub use config::YooKassaConfig;
pub use data_objects::{NewPayment, PaymentAmount, PaymentConfirmation, PaymentResponse};
pub use error::YooKassaApiError;
