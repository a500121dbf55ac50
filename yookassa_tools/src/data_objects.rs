use serde::{Deserialize, Serialize};
use shop_common::Money;

use crate::helpers::{order_description, yookassa_amount};

pub const CONFIRMATION_REDIRECT: &str = "redirect";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAmount {
    pub value: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    #[serde(rename = "type")]
    pub confirmation_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    pub order_id: String,
}

/// The body of a create-payment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount: PaymentAmount,
    pub confirmation: PaymentConfirmation,
    pub capture: bool,
    pub description: String,
    pub metadata: PaymentMetadata,
}

impl NewPayment {
    /// A redirect payment for the whole order, captured automatically. The order id travels in the metadata, and
    /// comes back in every notification for this payment.
    pub fn for_order(order_id: i64, amount: Money, currency: &str, return_url: &str) -> Self {
        Self {
            amount: PaymentAmount { value: yookassa_amount(amount), currency: currency.to_string() },
            confirmation: PaymentConfirmation {
                confirmation_type: CONFIRMATION_REDIRECT.to_string(),
                return_url: Some(return_url.to_string()),
                confirmation_url: None,
            },
            capture: true,
            description: order_description(order_id),
            metadata: PaymentMetadata { order_id: order_id.to_string() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: String,
    pub status: String,
    pub confirmation: PaymentConfirmation,
}
