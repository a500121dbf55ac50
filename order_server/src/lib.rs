//! # Shop order server
//! This crate hosts the HTTP front end for the order engine. It is responsible for:
//! * Checkout: turning a customer's cart into an order and handing them a payment link.
//! * Listening for payment notifications from YooKassa and applying them to orders.
//! * Cart editing, the product catalog and the administrative order status override.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/webhook/payment`: Payment notifications. Only accepted from the provider's addresses.
//! * `/payment/success` and `/payment/fail`: Where customers land after paying.
//! * `/api/...`: The customer (bearer token) and admin (API key) routes. See [routes](routes/index.html).
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
