//! Connects the order engine's [`PaymentGateway`] to the YooKassa client.
use log::*;
use order_engine::{
    db_types::Order,
    traits::{PaymentGateway, PaymentGatewayError, PaymentRedirect},
};
use yookassa_tools::{YooKassaApi, YooKassaApiError, YooKassaConfig};

#[derive(Clone, Debug)]
pub struct YooKassaGateway(YooKassaApi);

impl YooKassaGateway {
    pub fn new(config: YooKassaConfig) -> Result<Self, YooKassaApiError> {
        Ok(Self(YooKassaApi::new(config)?))
    }
}

impl From<YooKassaApi> for YooKassaGateway {
    fn from(api: YooKassaApi) -> Self {
        Self(api)
    }
}

impl PaymentGateway for YooKassaGateway {
    async fn create_payment(&self, order: &Order) -> Result<PaymentRedirect, PaymentGatewayError> {
        let payment = self.0.create_payment(order.id, order.total_amount).await.map_err(gateway_error)?;
        let confirmation_url = payment.confirmation.confirmation_url.ok_or_else(|| {
            warn!("💳️ Payment {} for order #{} came back without a confirmation URL", payment.id, order.id);
            PaymentGatewayError::InvalidResponse("the payment has no confirmation URL".into())
        })?;
        Ok(PaymentRedirect { payment_id: payment.id, confirmation_url, status: payment.status })
    }
}

fn gateway_error(e: YooKassaApiError) -> PaymentGatewayError {
    match e {
        YooKassaApiError::Timeout => PaymentGatewayError::Timeout,
        YooKassaApiError::Initialization(s) | YooKassaApiError::RequestError(s) => PaymentGatewayError::Unreachable(s),
        YooKassaApiError::QueryError { status, message } => PaymentGatewayError::Rejected { status, message },
        YooKassaApiError::JsonError(s) => PaymentGatewayError::InvalidResponse(s),
        YooKassaApiError::UnexpectedConfirmation(t) => {
            PaymentGatewayError::InvalidResponse(format!("unexpected confirmation type '{t}'"))
        },
    }
}
