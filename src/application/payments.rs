use crate::application::stats::StatsRecorder;
use crate::domain::payment::{CreatePayment, Payment, PaymentStatus};
use crate::domain::ports::{PaymentFactory, PaymentLedgerRef};
use crate::domain::state_machine;
use crate::error::{PaymentError, Result};

/// The single source of truth for payment records.
///
/// Composes the idempotency ledger with the status state machine: validation
/// runs before the ledger is touched, and the resolved status is computed
/// inside the bind factory so it happens at most once per key.
pub struct PaymentService {
    ledger: PaymentLedgerRef,
    stats: StatsRecorder,
}

/// Result of a create call, with the replay flag and the `timeout`
/// simulation's response-hold instruction for the HTTP layer.
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub payment: Payment,
    pub replayed: bool,
    pub hold_response: bool,
}

impl PaymentService {
    pub fn new(ledger: PaymentLedgerRef, stats: StatsRecorder) -> Self {
        Self { ledger, stats }
    }

    /// Creates a payment, or replays the one already bound to
    /// `idempotency_key`. Invalid input fails before any ledger state is
    /// consumed.
    pub async fn create(
        &self,
        idempotency_key: Option<String>,
        request: CreatePayment,
    ) -> Result<CreateOutcome> {
        request.validate()?;

        let CreatePayment {
            amount,
            currency,
            simulate,
            metadata,
        } = request;

        let factory: PaymentFactory = Box::new(move || {
            let resolution = state_machine::resolve(simulate, amount, &currency);
            Payment::new(amount, currency, resolution.status, metadata)
        });

        let has_key = idempotency_key.as_deref().is_some_and(|k| !k.is_empty());
        let outcome = self.ledger.bind(idempotency_key, factory).await?;
        if !outcome.replayed {
            self.stats.record_created(has_key).await;
        }

        // A replay answers immediately with the stored record; only a fresh
        // pending payment asks the boundary to withhold its response.
        let hold_response =
            !outcome.replayed && outcome.payment.status == PaymentStatus::Pending;

        Ok(CreateOutcome {
            payment: outcome.payment,
            replayed: outcome.replayed,
            hold_response,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Payment> {
        self.ledger
            .get(id)
            .await?
            .ok_or_else(|| PaymentError::NotFound("Payment not found".to_string()))
    }

    pub async fn list(&self) -> Result<Vec<Payment>> {
        self.ledger.list().await
    }
}
