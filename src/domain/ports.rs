use async_trait::async_trait;
use std::sync::Arc;

use super::payment::Payment;
use crate::error::Result;

/// Result of an idempotent bind: the winning payment plus whether the key had
/// already been bound by an earlier create.
#[derive(Debug, Clone)]
pub struct BindOutcome {
    pub payment: Payment,
    pub replayed: bool,
}

/// Closure producing the payment to bind if the key is unclaimed. Runs at
/// most once per key.
pub type PaymentFactory = Box<dyn FnOnce() -> Payment + Send>;

/// Storage seam for payment records and their idempotency bindings.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Binds `key` to the payment produced by `factory`.
    ///
    /// - `None` or empty key: the factory always runs and the payment is
    ///   stored without a key binding (non-idempotent path; the HTTP layer
    ///   rejects missing keys before reaching here).
    /// - Already-bound key: the original payment is returned unchanged with
    ///   `replayed = true` and the factory never runs.
    ///
    /// Check-then-insert for a key is atomic: concurrent binds with the same
    /// key invoke the factory once and agree on one payment.
    async fn bind(&self, key: Option<String>, factory: PaymentFactory) -> Result<BindOutcome>;

    async fn get(&self, id: &str) -> Result<Option<Payment>>;

    /// All stored payments in insertion order.
    async fn list(&self) -> Result<Vec<Payment>>;
}

pub type PaymentLedgerRef = Arc<dyn PaymentLedger>;
