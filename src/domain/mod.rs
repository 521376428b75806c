//! Core domain types and rules: payment records, the webhook event envelope,
//! the status state machine, and the storage ports.

pub mod event;
pub mod payment;
pub mod ports;
pub mod state_machine;
