//! paylab — a mock payment backend for rehearsing a payment API and its
//! webhook delivery without a real gateway.
//!
//! The transactional core is small on purpose: an idempotency-guarded
//! in-memory payment store, a deterministic status state machine with
//! simulated failure modes, and an HMAC-signed webhook dispatcher with
//! delivery bookkeeping. Everything resets on restart.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod signing;
