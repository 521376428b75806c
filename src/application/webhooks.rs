use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::{info, warn};

use crate::application::stats::StatsRecorder;
use crate::domain::event::{EventSubject, EventType, WebhookEvent};
use crate::domain::payment::Payment;
use crate::domain::ports::PaymentLedgerRef;
use crate::error::{PaymentError, Result};
use crate::signing;

pub const SIGNATURE_HEADER: &str = "X-PL-Signature";

/// Why a delivery attempt did not land: either an HTTP status outside 2xx or
/// a transport-level failure.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

/// Outcome of a single best-effort delivery attempt.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub delivered: bool,
    pub event: WebhookEvent,
    pub error: Option<DeliveryFailure>,
}

/// Builds, signs and delivers webhook events.
///
/// Reads the payment store but never writes to it; the only state it touches
/// is the stats recorder. One POST per trigger: no retry, no backoff, no
/// queueing.
pub struct WebhookDispatcher {
    ledger: PaymentLedgerRef,
    stats: StatsRecorder,
    client: reqwest::Client,
    secret: String,
}

impl WebhookDispatcher {
    pub fn new(ledger: PaymentLedgerRef, stats: StatsRecorder, secret: String) -> Self {
        Self {
            ledger,
            stats,
            client: reqwest::Client::new(),
            secret,
        }
    }

    /// Delivers one signed event to `url`. The subject payment is the stored
    /// record when `payment_id` resolves, otherwise an ephemeral payment
    /// synthesized from the event type and never persisted.
    pub async fn trigger(
        &self,
        url: &str,
        event_type: EventType,
        payment_id: Option<&str>,
    ) -> Result<Delivery> {
        let subject = self.resolve_subject(event_type, payment_id).await?;
        let event = WebhookEvent::new(event_type, subject);

        // Serialize once; the signature covers these exact bytes.
        let body = serde_json::to_string(&event)
            .map_err(|e| PaymentError::Delivery(format!("failed to serialize event: {e}")))?;
        let timestamp = Utc::now().timestamp();
        let signature = signing::sign(&body, timestamp, &self.secret);
        let header = signing::signature_header(timestamp, &signature);

        let error = match self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, header)
            .body(body)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => None,
            Ok(response) => {
                let status = response.status();
                Some(DeliveryFailure {
                    status: Some(status.as_u16()),
                    message: status
                        .canonical_reason()
                        .unwrap_or("non-success status")
                        .to_string(),
                })
            }
            Err(e) => Some(DeliveryFailure {
                status: None,
                message: e.to_string(),
            }),
        };

        let delivered = error.is_none();
        self.stats.record_delivery(delivered).await;
        match &error {
            None => info!(event_id = %event.id, url, "webhook delivered"),
            Some(failure) => {
                warn!(event_id = %event.id, url, error = %failure.message, "webhook delivery failed")
            }
        }

        Ok(Delivery {
            delivered,
            event,
            error,
        })
    }

    async fn resolve_subject(
        &self,
        event_type: EventType,
        payment_id: Option<&str>,
    ) -> Result<EventSubject> {
        if let Some(id) = payment_id
            && let Some(payment) = self.ledger.get(id).await?
        {
            return Ok(EventSubject::Stored(payment));
        }
        Ok(EventSubject::Ephemeral(Payment::synthesized(
            event_type.implied_status(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{CreatePayment, PaymentStatus};
    use crate::domain::ports::{PaymentFactory, PaymentLedger};
    use crate::infrastructure::in_memory::InMemoryPaymentLedger;
    use std::sync::Arc;

    fn dispatcher() -> (WebhookDispatcher, Arc<InMemoryPaymentLedger>, StatsRecorder) {
        let ledger = Arc::new(InMemoryPaymentLedger::new());
        let stats = StatsRecorder::new();
        let dispatcher = WebhookDispatcher::new(
            ledger.clone(),
            stats.clone(),
            "whsec_test_123".to_string(),
        );
        (dispatcher, ledger, stats)
    }

    #[tokio::test]
    async fn test_subject_synthesized_when_no_payment_id() {
        let (dispatcher, _, _) = dispatcher();
        let subject = dispatcher
            .resolve_subject(EventType::PaymentFailed, None)
            .await
            .unwrap();
        match subject {
            EventSubject::Ephemeral(p) => {
                assert_eq!(p.status, PaymentStatus::Failed);
                assert_eq!(p.amount, 1000);
                assert_eq!(p.currency, "INR");
            }
            EventSubject::Stored(_) => panic!("expected an ephemeral subject"),
        }
    }

    #[tokio::test]
    async fn test_subject_synthesized_when_payment_id_unknown() {
        let (dispatcher, _, _) = dispatcher();
        let subject = dispatcher
            .resolve_subject(EventType::PaymentRequiresAction, Some("pay_missing"))
            .await
            .unwrap();
        assert!(matches!(subject, EventSubject::Ephemeral(_)));
        assert_eq!(subject.payment().status, PaymentStatus::RequiresAction);
    }

    #[tokio::test]
    async fn test_subject_uses_stored_payment_verbatim() {
        let (dispatcher, ledger, _) = dispatcher();
        let req = CreatePayment {
            amount: 2500,
            currency: "USD".to_string(),
            simulate: None,
            metadata: None,
        };
        let factory: PaymentFactory = Box::new(move || {
            Payment::new(req.amount, req.currency, PaymentStatus::Succeeded, None)
        });
        let stored = ledger
            .bind(Some("idem_subject".to_string()), factory)
            .await
            .unwrap()
            .payment;

        // Event type says failed, but the stored record wins verbatim.
        let subject = dispatcher
            .resolve_subject(EventType::PaymentFailed, Some(&stored.id))
            .await
            .unwrap();
        match subject {
            EventSubject::Stored(p) => assert_eq!(p, stored),
            EventSubject::Ephemeral(_) => panic!("expected the stored subject"),
        }

        // Synthesized subjects never land in the store.
        assert_eq!(ledger.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported_not_raised() {
        let (dispatcher, _, stats) = dispatcher();
        // Nothing listens here; the connection is refused.
        let delivery = dispatcher
            .trigger("http://127.0.0.1:9/hook", EventType::PaymentSucceeded, None)
            .await
            .unwrap();
        assert!(!delivery.delivered);
        let failure = delivery.error.expect("failure reason must be packaged");
        assert!(failure.status.is_none());
        assert!(!failure.message.is_empty());

        let recorded = stats.webhook_stats().await;
        assert_eq!(
            recorded.last_status,
            Some(crate::application::stats::DeliveryStatus::Failed)
        );
        assert!(recorded.last_delivery_at.is_some());
    }
}
