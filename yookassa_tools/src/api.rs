use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    StatusCode,
};
use shop_common::Money;

use crate::{
    config::YooKassaConfig,
    data_objects::{NewPayment, PaymentResponse, CONFIRMATION_REDIRECT},
    helpers::idempotence_key,
    YooKassaApiError,
};

#[derive(Clone)]
pub struct YooKassaApi {
    config: YooKassaConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for YooKassaApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "YooKassaApi ({}, shop {})", self.config.api_url, self.config.shop_id)
    }
}

impl YooKassaApi {
    pub fn new(config: YooKassaConfig) -> Result<Self, YooKassaApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| YooKassaApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &YooKassaConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Creates a redirect payment for the order, and returns the payment with the URL the customer must visit.
    pub async fn create_payment(&self, order_id: i64, amount: Money) -> Result<PaymentResponse, YooKassaApiError> {
        let body = NewPayment::for_order(order_id, amount, &self.config.currency, &self.config.return_url);
        let key = idempotence_key(order_id);
        debug!("💳️ Creating payment for order #{order_id} ({amount} {}). Idempotence key {key}", self.config.currency);
        let response = self
            .client
            .post(self.url("/payments"))
            .basic_auth(&self.config.shop_id, Some(self.config.secret_key.reveal()))
            .header("Idempotence-Key", key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let message = response.text().await.unwrap_or_default();
            warn!("💳️ Payment for order #{order_id} was refused. {status}. {message}");
            return Err(YooKassaApiError::QueryError { status: status.as_u16(), message });
        }
        let payment =
            response.json::<PaymentResponse>().await.map_err(|e| YooKassaApiError::JsonError(e.to_string()))?;
        if payment.confirmation.confirmation_type != CONFIRMATION_REDIRECT {
            return Err(YooKassaApiError::UnexpectedConfirmation(payment.confirmation.confirmation_type));
        }
        info!("💳️ Payment {} created for order #{order_id}", payment.id);
        Ok(payment)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn unreachable_provider() {
        let _ = env_logger::try_init();
        let config = YooKassaConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let api = YooKassaApi::new(config).unwrap();
        assert_eq!(api.url("/payments"), "http://127.0.0.1:9/payments");
        let err = api.create_payment(1, Money::from(100)).await.unwrap_err();
        assert!(matches!(err, YooKassaApiError::RequestError(_) | YooKassaApiError::Timeout), "{err}");
    }
}
