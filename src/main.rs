use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use paylab::application::payments::PaymentService;
use paylab::application::stats::StatsRecorder;
use paylab::application::webhooks::WebhookDispatcher;
use paylab::domain::ports::PaymentLedgerRef;
use paylab::infrastructure::in_memory::InMemoryPaymentLedger;
use paylab::interfaces::http::{init_tracing, serve, AppState};

const DEFAULT_SECRET: &str = "whsec_test_123";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Listen address. Falls back to HOST/PORT env vars, then 0.0.0.0:8080.
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Shared secret used to sign outbound webhooks. Falls back to the
    /// WEBHOOK_SECRET env var, then a well-known sandbox default.
    #[arg(long)]
    secret: Option<String>,

    /// Milliseconds the `timeout` simulation withholds its response.
    #[arg(long, default_value_t = 2000)]
    timeout_hold_ms: u64,
}

fn addr_from_env() -> Option<SocketAddr> {
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").ok()?;
    format!("{host}:{port}").parse().ok()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let addr = cli
        .addr
        .or_else(addr_from_env)
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
    let secret = cli
        .secret
        .or_else(|| std::env::var("WEBHOOK_SECRET").ok())
        .unwrap_or_else(|| DEFAULT_SECRET.to_string());

    let ledger: PaymentLedgerRef = Arc::new(InMemoryPaymentLedger::new());
    let stats = StatsRecorder::new();
    let payments = Arc::new(PaymentService::new(ledger.clone(), stats.clone()));
    let webhooks = Arc::new(WebhookDispatcher::new(ledger, stats.clone(), secret));

    let state = AppState {
        payments,
        webhooks,
        stats,
        timeout_hold: Duration::from_millis(cli.timeout_hold_ms),
    };

    serve(addr, state).await.into_diagnostic()?;
    Ok(())
}
