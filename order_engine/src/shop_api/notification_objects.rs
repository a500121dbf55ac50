use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db_types::OrderId;

pub const NOTIFICATION_TYPE: &str = "notification";
pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment.succeeded";
pub const EVENT_PAYMENT_CANCELED: &str = "payment.canceled";

/// The envelope of an asynchronous payment notification.
///
/// Only the fields needed for reconciliation are modelled. Everything else the provider sends is ignored. Absent
/// fields take empty values, so a message of some other kind parses and can be acknowledged without carrying a
/// payment object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentNotification {
    #[serde(rename = "type", default)]
    pub notification_type: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub object: NotificationObject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationObject {
    /// The provider's payment id
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub metadata: NotificationMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationMetadata {
    /// The store's order id, as it was attached when the payment was created. Providers echo metadata back as strings,
    /// but a bare number is accepted too.
    #[serde(default)]
    pub order_id: Option<Value>,
}

impl PaymentNotification {
    pub fn is_notification(&self) -> bool {
        self.notification_type == NOTIFICATION_TYPE
    }

    /// The order id from the payment metadata. Missing, malformed and zero ids all yield `None`.
    pub fn order_id(&self) -> Option<OrderId> {
        let id = match self.object.metadata.order_id.as_ref()? {
            Value::String(s) => s.trim().parse::<OrderId>().ok()?,
            Value::Number(n) => n.as_i64()?,
            _ => return None,
        };
        (id > 0).then_some(id)
    }
}
