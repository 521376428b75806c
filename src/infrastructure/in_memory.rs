use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::payment::Payment;
use crate::domain::ports::{BindOutcome, PaymentFactory, PaymentLedger};
use crate::error::Result;

/// A thread-safe in-memory payment ledger.
///
/// All state lives behind one `Arc<RwLock<..>>` so the check-then-insert for
/// an idempotency key is a single critical section. The factory passed to
/// `bind` is synchronous and allocation-cheap, so holding the write guard
/// across it keeps "one key, one payment, ever" without per-key locks.
#[derive(Default, Clone)]
pub struct InMemoryPaymentLedger {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    /// Insertion-ordered payment records.
    payments: Vec<Payment>,
    /// Payment id -> index into `payments`.
    by_id: HashMap<String, usize>,
    /// Idempotency key -> index of the first payment bound to it.
    by_key: HashMap<String, usize>,
}

impl InMemoryPaymentLedger {
    /// Creates a new, empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentLedger for InMemoryPaymentLedger {
    async fn bind(&self, key: Option<String>, factory: PaymentFactory) -> Result<BindOutcome> {
        let mut inner = self.inner.write().await;

        let key = key.filter(|k| !k.is_empty());
        if let Some(k) = key.as_deref()
            && let Some(&idx) = inner.by_key.get(k)
        {
            return Ok(BindOutcome {
                payment: inner.payments[idx].clone(),
                replayed: true,
            });
        }

        // First write for this key wins; the factory runs while the guard is
        // held so a racing bind cannot also create a payment.
        let payment = factory();
        let idx = inner.payments.len();
        inner.by_id.insert(payment.id.clone(), idx);
        if let Some(k) = key {
            inner.by_key.insert(k, idx);
        }
        inner.payments.push(payment.clone());

        Ok(BindOutcome {
            payment,
            replayed: false,
        })
    }

    async fn get(&self, id: &str) -> Result<Option<Payment>> {
        let inner = self.inner.read().await;
        Ok(inner.by_id.get(id).map(|&idx| inner.payments[idx].clone()))
    }

    async fn list(&self) -> Result<Vec<Payment>> {
        let inner = self.inner.read().await;
        Ok(inner.payments.clone())
    }
}
