#![allow(dead_code)]
use std::time::Duration;

use order_engine::{
    db_types::Order,
    traits::{PaymentGateway, PaymentGatewayError, PaymentRedirect},
};

/// A payment gateway that answers locally. It can be told to fail, or to stall before answering.
#[derive(Debug, Clone, Default)]
pub struct TestGateway {
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl TestGateway {
    pub fn failing() -> Self {
        Self { fail: true, delay: None }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { fail: false, delay: Some(delay) }
    }
}

impl PaymentGateway for TestGateway {
    async fn create_payment(&self, order: &Order) -> Result<PaymentRedirect, PaymentGatewayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(PaymentGatewayError::Unreachable("connection refused".into()));
        }
        Ok(PaymentRedirect {
            payment_id: format!("pay-{}", order.id),
            confirmation_url: format!("https://pay.example.com/checkout?order={}", order.id),
            status: "pending".into(),
        })
    }
}
