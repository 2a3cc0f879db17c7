//! Lifecycle events.
//!
//! Settled and cancelled swaps leave no stored state behind; the events
//! returned by engine operations are the only record that they happened.
//! Asset and cash payloads are carried in packed-word form so an event is
//! self-contained and replayable through the codec.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::registry::SwapKind;

/// A swap entered custody.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapInitiated {
    pub id: Uuid,
    pub kind: SwapKind,
    pub initiator: Address,
    /// Packed words of the escrowed assets, in escrow order.
    pub offered: Vec<U256>,
    /// Packed words of the assets the finalizer must supply.
    pub requested: Vec<U256>,
    /// Fee the initiator paid into custody.
    pub fee_paid: U256,
    /// Native amount the finalizer must attach on top of their fee.
    pub cash_to_be_added: U256,
    pub at: DateTime<Utc>,
}

/// A swap settled: both legs and any cash delta moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapFinalized {
    pub id: Uuid,
    pub kind: SwapKind,
    pub initiator: Address,
    pub finalizer: Address,
    /// Packed words of the assets released from custody to the finalizer.
    pub offered: Vec<U256>,
    /// Packed words of the assets the finalizer delivered to the initiator.
    pub requested: Vec<U256>,
    /// Fee the finalizer paid on settlement.
    pub finalization_fee: U256,
    /// Cash delta forwarded to the initiator.
    pub cash_forwarded: U256,
    pub at: DateTime<Utc>,
}

/// An initiator withdrew their own unfinalized swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCancelled {
    pub id: Uuid,
    pub kind: SwapKind,
    pub initiator: Address,
    /// Initiation fee returned to the initiator.
    pub fee_refunded: U256,
    /// Packed words of the assets returned from custody.
    pub returned: Vec<U256>,
    pub at: DateTime<Utc>,
}

/// Accumulated fees were swept to the treasury.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesCollected {
    pub id: Uuid,
    pub collector: Address,
    pub amount: U256,
    pub at: DateTime<Utc>,
}

/// Any event the engine can emit, for callers that journal uniformly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EscrowEvent {
    SwapInitiated(SwapInitiated),
    SwapFinalized(SwapFinalized),
    SwapCancelled(SwapCancelled),
    FeesCollected(FeesCollected),
}
