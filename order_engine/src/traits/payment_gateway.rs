use thiserror::Error;

use crate::{db_types::Order, traits::data_objects::PaymentRedirect};

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("The payment provider could not be reached. {0}")]
    Unreachable(String),
    #[error("The payment provider did not answer in time")]
    Timeout,
    #[error("The payment provider rejected the request. Status {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("The payment provider sent an unexpected response. {0}")]
    InvalidResponse(String),
}

/// Initiates payments with an external provider.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Asks the provider to create a payment for the order's total. On success, the customer should be sent to
    /// `confirmation_url` in the returned redirect. Implementations must bound the time this call can take.
    async fn create_payment(&self, order: &Order) -> Result<PaymentRedirect, PaymentGatewayError>;
}
