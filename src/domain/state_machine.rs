//! Deterministic resolution of a payment's status from its creation
//! parameters. Pure: identical inputs always produce identical output, which
//! keeps outcomes snapshot-testable.

use super::payment::{PaymentStatus, Simulate};

/// Outcome of resolving a create request. `hold_response` instructs the HTTP
/// layer to withhold the response (the `timeout` rehearsal) and answer 202
/// rather than pretending the payment succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub status: PaymentStatus,
    pub hold_response: bool,
}

/// Resolves the status for a validated create request. Validation failures
/// (amount < 1, malformed currency) are rejected before this point and never
/// reach the machine.
///
/// `Simulate::Duplicate` deliberately falls through to the success path: the
/// directive labels a replay-rehearsal scenario for the client, it does not
/// override idempotency-key matching (see DESIGN.md).
pub fn resolve(simulate: Option<Simulate>, _amount: i64, _currency: &str) -> Resolution {
    match simulate {
        Some(Simulate::Timeout) => Resolution {
            status: PaymentStatus::Pending,
            hold_response: true,
        },
        Some(Simulate::RequiresAction) => Resolution {
            status: PaymentStatus::RequiresAction,
            hold_response: false,
        },
        Some(Simulate::Duplicate) | None => Resolution {
            status: PaymentStatus::Succeeded,
            hold_response: false,
        },
    }
}
