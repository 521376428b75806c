//! Application layer orchestrating the domain: the payment service (create /
//! get / list behind the idempotency ledger), the webhook dispatcher, and the
//! dashboard stats recorder.

pub mod payments;
pub mod stats;
pub mod webhooks;
