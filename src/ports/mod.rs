//! Injected capability interfaces.
//!
//! The engine core never talks to a concrete transport: membership and role
//! answers, capability attestation, and asset/cash movement all arrive
//! through the traits in this module. `memory` provides in-memory reference
//! adapters used by the CLI, demos, benchmarks, and tests.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::core::asset::Capability;

pub mod memory;

/// Answers subscription-discount queries and prices a single asset unit.
pub trait MembershipOracle {
    /// Whether the account holds a subscription exempting it from fees.
    fn has_subscription(&self, account: Address) -> bool;

    /// The per-asset fee charged to non-subscribers.
    fn unit_fee(&self) -> U256;
}

/// A protocol role an account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May sweep accumulated fees to the treasury.
    Moderator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Moderator => write!(f, "moderator"),
        }
    }
}

/// Answers role-membership queries.
pub trait RoleOracle {
    fn has_role(&self, role: Role, account: Address) -> bool;
}

/// Probes a token contract for its attested transfer capabilities.
pub trait CapabilityProbe {
    fn supports_capability(&self, token: Address, capability: Capability) -> bool;
}

/// Failure reported by an underlying transfer protocol.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransferFailure(pub String);

impl TransferFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Moves asset units between accounts.
///
/// The engine dispatches on the record's mode: `transfer_unique` for
/// single-unit records (`value == 0`), `transfer_quantity` otherwise.
/// Implementations must either complete the transfer or report failure;
/// a silent partial transfer is a protocol violation.
pub trait AssetTransferPort {
    fn transfer_unique(
        &mut self,
        from: Address,
        to: Address,
        token: Address,
        token_id: u32,
    ) -> Result<(), TransferFailure>;

    fn transfer_quantity(
        &mut self,
        from: Address,
        to: Address,
        token: Address,
        token_id: u32,
        amount: u128,
    ) -> Result<(), TransferFailure>;
}

/// Sends native currency out of custody.
pub trait CashTransferPort {
    fn send(&mut self, to: Address, amount: U256) -> Result<(), TransferFailure>;
}

/// Fixed acceptance codes the transfer protocols require of a receiving
/// party. The engine returns these from its receiver hooks to acknowledge
/// inbound transfers into custody.
pub mod acknowledgement {
    /// Acceptance code for an inbound single-unit transfer.
    pub const UNIQUE_RECEIVED: [u8; 4] = [0x15, 0x0b, 0x7a, 0x02];
    /// Acceptance code for an inbound quantity-bearing transfer.
    pub const QUANTITY_RECEIVED: [u8; 4] = [0xf2, 0x3a, 0x6e, 0x61];
    /// Acceptance code for an inbound quantity-bearing batch transfer.
    pub const QUANTITY_BATCH_RECEIVED: [u8; 4] = [0xbc, 0x19, 0x7c, 0x81];
}
