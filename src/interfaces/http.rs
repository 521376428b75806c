//! HTTP surface of the mock backend.
//!
//! Routes:
//! - `POST /payments` — idempotent create (requires `Idempotency-Key`)
//! - `GET /payments/:id` — fetch one payment
//! - `GET /payments` — list + dashboard stats
//! - `POST /webhooks/trigger` — one best-effort signed delivery

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::application::payments::PaymentService;
use crate::application::stats::{StatsRecorder, WebhookStats};
use crate::application::webhooks::WebhookDispatcher;
use crate::domain::event::EventType;
use crate::domain::payment::{CreatePayment, Payment};
use crate::error::PaymentError;

/// Shared handler state, constructed once at startup and passed by handle.
#[derive(Clone)]
pub struct AppState {
    pub payments: Arc<PaymentService>,
    pub webhooks: Arc<WebhookDispatcher>,
    pub stats: StatsRecorder,
    /// How long the `timeout` simulation withholds its response.
    pub timeout_hold: Duration,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/payments", post(create_payment).get(list_payments))
        .route("/payments/:id", get(get_payment))
        .route("/webhooks/trigger", post(trigger_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "paylab mock backend listening");
    axum::serve(listener, router(state)).await
}

/// Structured `{code, message}` error body.
struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "validation_error",
            message: message.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        let status = match &err {
            PaymentError::Validation(_) => StatusCode::BAD_REQUEST,
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::Delivery(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "code": self.code, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

async fn create_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreatePayment>, JsonRejection>,
) -> Result<Response, ApiError> {
    let key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .trim();
    if key.is_empty() {
        return Err(ApiError::validation("Idempotency-Key header is required"));
    }

    let Json(request) =
        payload.map_err(|e| ApiError::validation(format!("invalid request body: {e}")))?;

    let outcome = state
        .payments
        .create(Some(key.to_string()), request)
        .await?;

    if outcome.hold_response {
        // The simulated gateway stall: withhold the response, then admit the
        // payment is still pending instead of pretending it succeeded.
        tokio::time::sleep(state.timeout_hold).await;
        return Ok((StatusCode::ACCEPTED, Json(outcome.payment)).into_response());
    }

    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome.payment)).into_response())
}

async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Payment>, ApiError> {
    Ok(Json(state.payments.get(&id).await?))
}

#[derive(Serialize)]
struct CoverageStats {
    #[serde(rename = "idempotencyCoverage")]
    idempotency_coverage: f64,
}

#[derive(Serialize)]
struct ListResponse {
    data: Vec<Payment>,
    stats: CoverageStats,
    #[serde(rename = "webhookStats")]
    webhook_stats: WebhookStats,
}

async fn list_payments(
    State(state): State<AppState>,
) -> Result<Json<ListResponse>, ApiError> {
    let data = state.payments.list().await?;
    Ok(Json(ListResponse {
        data,
        stats: CoverageStats {
            idempotency_coverage: state.stats.coverage().await,
        },
        webhook_stats: state.stats.webhook_stats().await,
    }))
}

#[derive(Deserialize)]
struct TriggerRequest {
    url: Option<String>,
    #[serde(rename = "eventType")]
    event_type: Option<String>,
    #[serde(rename = "paymentId")]
    payment_id: Option<String>,
}

async fn trigger_webhook(
    State(state): State<AppState>,
    payload: Result<Json<TriggerRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::validation(format!("invalid request body: {e}")))?;

    let url = request.url.as_deref().unwrap_or("").trim();
    let parsed = reqwest::Url::parse(url)
        .map_err(|_| ApiError::validation("Provide a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::validation("Provide an http(s) URL"));
    }

    let event_type = EventType::from_request(request.event_type.as_deref());
    let delivery = state
        .webhooks
        .trigger(url, event_type, request.payment_id.as_deref())
        .await?;

    if delivery.delivered {
        Ok(Json(json!({ "delivered": true, "event": delivery.event })).into_response())
    } else {
        Ok((
            StatusCode::BAD_GATEWAY,
            Json(json!({ "delivered": false, "error": delivery.error })),
        )
            .into_response())
    }
}
