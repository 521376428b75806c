use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payment::{random_suffix, Payment, PaymentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "payment.succeeded")]
    PaymentSucceeded,
    #[serde(rename = "payment.failed")]
    PaymentFailed,
    #[serde(rename = "payment.requires_action")]
    PaymentRequiresAction,
}

impl EventType {
    /// Maps the optional `eventType` request field. Anything other than the
    /// two failure-ish types (including absence) falls back to
    /// `payment.succeeded`.
    pub fn from_request(raw: Option<&str>) -> Self {
        match raw {
            Some("payment.failed") => EventType::PaymentFailed,
            Some("payment.requires_action") => EventType::PaymentRequiresAction,
            _ => EventType::PaymentSucceeded,
        }
    }

    /// Status a synthesized subject payment carries for this event type.
    pub fn implied_status(self) -> PaymentStatus {
        match self {
            EventType::PaymentFailed => PaymentStatus::Failed,
            EventType::PaymentRequiresAction => PaymentStatus::RequiresAction,
            EventType::PaymentSucceeded => PaymentStatus::Succeeded,
        }
    }
}

/// The payment a webhook event describes. `Stored` references a record owned
/// by the payment store; `Ephemeral` is synthesized for the delivery only and
/// is never persisted, so nothing downstream can mutate it expecting the
/// store to notice.
#[derive(Debug, Clone)]
pub enum EventSubject {
    Stored(Payment),
    Ephemeral(Payment),
}

impl EventSubject {
    pub fn payment(&self) -> &Payment {
        match self {
            EventSubject::Stored(p) | EventSubject::Ephemeral(p) => p,
        }
    }

    pub fn into_payment(self) -> Payment {
        match self {
            EventSubject::Stored(p) | EventSubject::Ephemeral(p) => p,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub object: Payment,
}

/// Signed envelope delivered to a subscriber URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub created_at: DateTime<Utc>,
    pub data: EventData,
}

impl WebhookEvent {
    pub fn new(event_type: EventType, subject: EventSubject) -> Self {
        Self {
            id: event_id(),
            event_type,
            created_at: Utc::now(),
            data: EventData {
                object: subject.into_payment(),
            },
        }
    }
}

/// `evt_` + 24 lowercase alphanumerics.
pub fn event_id() -> String {
    format!("evt_{}", random_suffix(24))
}
