use std::time::Duration;

use log::*;
use shop_common::{Secret, DEFAULT_CURRENCY_CODE};

pub const DEFAULT_API_URL: &str = "https://api.yookassa.ru/v3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct YooKassaConfig {
    pub shop_id: String,
    pub secret_key: Secret<String>,
    /// Base URL of the API, without a trailing slash.
    pub api_url: String,
    /// Where the customer lands after completing, or abandoning, the payment.
    pub return_url: String,
    pub currency: String,
    pub timeout: Duration,
}

impl Default for YooKassaConfig {
    fn default() -> Self {
        Self {
            shop_id: String::default(),
            secret_key: Secret::default(),
            api_url: DEFAULT_API_URL.to_string(),
            return_url: "http://localhost:8080/payment/success".to_string(),
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl YooKassaConfig {
    pub fn new_from_env_or_default() -> Self {
        let defaults = Self::default();
        let shop_id = std::env::var("YOOKASSA_SHOP_ID").unwrap_or_else(|_| {
            warn!("💳️ YOOKASSA_SHOP_ID not set. Payments cannot be created until it is.");
            defaults.shop_id.clone()
        });
        let secret_key = Secret::new(std::env::var("YOOKASSA_SECRET_KEY").unwrap_or_else(|_| {
            warn!("💳️ YOOKASSA_SECRET_KEY not set. Payments cannot be created until it is.");
            String::default()
        }));
        let api_url = std::env::var("YOOKASSA_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| {
                info!("💳️ YOOKASSA_API_URL not set, using {DEFAULT_API_URL}");
                defaults.api_url.clone()
            });
        let return_url = std::env::var("YOOKASSA_RETURN_URL").unwrap_or_else(|_| {
            warn!("💳️ YOOKASSA_RETURN_URL not set, using {} (probably useless default)", defaults.return_url);
            defaults.return_url.clone()
        });
        let currency = std::env::var("YOOKASSA_CURRENCY").unwrap_or_else(|_| defaults.currency.clone());
        let timeout = std::env::var("YOOKASSA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("💳️ Invalid YOOKASSA_TIMEOUT_SECS '{s}'. {e}. Using the default."))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        Self { shop_id, secret_key, api_url, return_url, currency, timeout }
    }
}
