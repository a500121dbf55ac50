use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Order, OrderItem},
    traits::PaymentRedirect,
};

/// Something that went wrong after the order was committed. The order stands regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutWarning {
    /// The cart could not be emptied. The customer may see stale items in their cart.
    CartNotCleared(String),
    /// No payment could be created. The order stays `pending` and the customer gets no payment link.
    PaymentInitiationFailed(String),
}

impl Display for CheckoutWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CartNotCleared(e) => write!(f, "the cart could not be cleared ({e})"),
            Self::PaymentInitiationFailed(e) => write!(f, "payment could not be initiated ({e})"),
        }
    }
}

/// The result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: Option<PaymentRedirect>,
    pub warnings: Vec<CheckoutWarning>,
}

impl CheckoutOutcome {
    /// The provider page the customer should be sent to, or an empty string if payment initiation failed.
    pub fn payment_url(&self) -> String {
        self.payment.as_ref().map(|p| p.confirmation_url.clone()).unwrap_or_default()
    }

    pub fn payment_failed(&self) -> bool {
        self.warnings.iter().any(|w| matches!(w, CheckoutWarning::PaymentInitiationFailed(_)))
    }

    /// A short human-readable summary for the client.
    pub fn message(&self) -> String {
        if self.payment_failed() {
            "order created, but payment could not be initiated. Please try paying again later".to_string()
        } else {
            "order created".to_string()
        }
    }
}
