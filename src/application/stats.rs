use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Ok,
    Failed,
}

/// Outcome of the most recent webhook delivery attempt. Empty until the
/// first dispatch; overwritten on every attempt; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookStats {
    #[serde(rename = "lastDeliveryAt")]
    pub last_delivery_at: Option<DateTime<Utc>>,
    #[serde(rename = "lastStatus")]
    pub last_status: Option<DeliveryStatus>,
}

#[derive(Default)]
struct Counters {
    created_total: u64,
    created_with_key: u64,
    webhook: WebhookStats,
}

/// Aggregate counters consumed by the integration dashboard. Last-value
/// semantics only, no history and no alerting.
#[derive(Clone, Default)]
pub struct StatsRecorder {
    inner: Arc<RwLock<Counters>>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a newly created (non-replayed) payment, tracking whether the
    /// caller supplied a non-empty idempotency key.
    pub async fn record_created(&self, has_key: bool) {
        let mut inner = self.inner.write().await;
        inner.created_total += 1;
        if has_key {
            inner.created_with_key += 1;
        }
    }

    /// Records a delivery attempt, successful or not.
    pub async fn record_delivery(&self, ok: bool) {
        let mut inner = self.inner.write().await;
        inner.webhook.last_delivery_at = Some(Utc::now());
        inner.webhook.last_status = Some(if ok {
            DeliveryStatus::Ok
        } else {
            DeliveryStatus::Failed
        });
    }

    /// Fraction of created payments that carried an idempotency key, in
    /// `0.0..=1.0`. Zero when nothing has been created yet.
    pub async fn coverage(&self) -> f64 {
        let inner = self.inner.read().await;
        if inner.created_total == 0 {
            0.0
        } else {
            inner.created_with_key as f64 / inner.created_total as f64
        }
    }

    pub async fn webhook_stats(&self) -> WebhookStats {
        self.inner.read().await.webhook.clone()
    }
}
