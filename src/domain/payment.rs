use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, Result};

/// Terminal or pending outcome of a mock payment, fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Succeeded,
    Failed,
    RequiresAction,
    Pending,
}

/// Client-requested override forcing a non-default outcome for testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Simulate {
    Timeout,
    RequiresAction,
    Duplicate,
}

/// A mock payment record. `id`, `amount` and `currency` never change after
/// creation; `status` is decided once by the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Payment {
    pub fn new(
        amount: i64,
        currency: String,
        status: PaymentStatus,
        metadata: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Self {
        Self {
            id: payment_id(),
            amount,
            currency,
            status,
            created_at: Utc::now(),
            metadata,
        }
    }

    /// Ephemeral payment used when a webhook is triggered without a stored
    /// subject. Mirrors the sandbox defaults shown in the docs.
    pub fn synthesized(status: PaymentStatus) -> Self {
        Self::new(1000, "INR".to_string(), status, None)
    }
}

/// Validated creation parameters for a payment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayment {
    pub amount: i64,
    pub currency: String,
    pub simulate: Option<Simulate>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl CreatePayment {
    /// Checks amount and currency before any ledger state is touched.
    /// Amounts are integer minor units (1000 = 10.00 in a 2-decimal
    /// currency); currencies are 3-letter uppercase ISO codes.
    pub fn validate(&self) -> Result<()> {
        if self.amount < 1 {
            return Err(PaymentError::Validation(
                "amount must be an integer >= 1 in minor units".to_string(),
            ));
        }
        if self.currency.len() != 3
            || !self.currency.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(PaymentError::Validation(
                "currency must be a 3-letter uppercase code".to_string(),
            ));
        }
        Ok(())
    }
}

/// `pay_` + 24 lowercase alphanumerics.
pub fn payment_id() -> String {
    format!("pay_{}", random_suffix(24))
}

pub(crate) fn random_suffix(len: usize) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: i64, currency: &str) -> CreatePayment {
        CreatePayment {
            amount,
            currency: currency.to_string(),
            simulate: None,
            metadata: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request(1000, "INR").validate().is_ok());
        assert!(request(1, "USD").validate().is_ok());
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        assert!(matches!(
            request(0, "INR").validate(),
            Err(PaymentError::Validation(_))
        ));
        assert!(matches!(
            request(-5, "INR").validate(),
            Err(PaymentError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_currency_rejected() {
        assert!(request(500, "inr").validate().is_err());
        assert!(request(500, "IN").validate().is_err());
        assert!(request(500, "RUPEES").validate().is_err());
        assert!(request(500, "IN1").validate().is_err());
    }

    #[test]
    fn test_payment_ids_are_prefixed_and_distinct() {
        let a = payment_id();
        let b = payment_id();
        assert!(a.starts_with("pay_"));
        assert_eq!(a.len(), 28);
        assert_ne!(a, b);
    }

    #[test]
    fn test_payment_serializes_with_null_metadata() {
        let p = Payment::new(1000, "INR".to_string(), PaymentStatus::Succeeded, None);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["status"], "succeeded");
        assert!(json["metadata"].is_null());
    }

    #[test]
    fn test_simulate_parses_snake_case() {
        let s: Simulate = serde_json::from_str("\"requires_action\"").unwrap();
        assert_eq!(s, Simulate::RequiresAction);
        assert!(serde_json::from_str::<Simulate>("\"explode\"").is_err());
    }
}
