use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::core::asset::AssetRecord;
use crate::core::cash::CashRecord;
use crate::core::error::EscrowError;

/// The two swap shapes a registry slot can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapKind {
    Single,
    Multi,
}

impl fmt::Display for SwapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapKind::Single => write!(f, "single"),
            SwapKind::Multi => write!(f, "multi"),
        }
    }
}

/// An active one-for-one swap: one escrowed asset against one requested
/// asset, plus the cash leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleSwap {
    pub cash: CashRecord,
    /// What the initiator deposited into custody.
    pub offered: AssetRecord,
    /// What must be supplied to finalize.
    pub requested: AssetRecord,
    pub created_at: DateTime<Utc>,
}

/// An active bundle swap: ordered offered and requested asset sets, plus
/// the cash leg.
///
/// The two sets are independent sequences, each transferred in full to its
/// destination at settlement. There is no index-wise pairing between
/// `offered[i]` and `requested[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSwap {
    pub cash: CashRecord,
    /// Escrowed assets, in escrow order.
    pub offered: Vec<AssetRecord>,
    /// Assets the finalizer must supply, in settlement order.
    pub requested: Vec<AssetRecord>,
    pub created_at: DateTime<Utc>,
}

impl MultiSwap {
    /// Number of assets involved across both sets.
    pub fn combined_len(&self) -> usize {
        self.offered.len() + self.requested.len()
    }
}

/// Per-account storage of active swaps.
///
/// An account may hold at most one active single swap and, independently,
/// at most one active multi swap. Absence is `Option`-based; there is no
/// zeroed-record sentinel to collide with legitimate values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwapRegistry {
    singles: HashMap<Address, SingleSwap>,
    multis: HashMap<Address, MultiSwap>,
}

impl SwapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_active_single(&self, account: Address) -> bool {
        self.singles.contains_key(&account)
    }

    pub fn has_active_multi(&self, account: Address) -> bool {
        self.multis.contains_key(&account)
    }

    pub fn get_single(&self, account: Address) -> Option<&SingleSwap> {
        self.singles.get(&account)
    }

    pub fn get_multi(&self, account: Address) -> Option<&MultiSwap> {
        self.multis.get(&account)
    }

    /// Store a single swap for `account`. Fails if one is already active.
    pub fn put_single(&mut self, account: Address, swap: SingleSwap) -> Result<(), EscrowError> {
        if self.singles.contains_key(&account) {
            return Err(EscrowError::SingleSwapExists { account });
        }
        self.singles.insert(account, swap);
        Ok(())
    }

    /// Store a multi swap for `account`. Fails if one is already active.
    pub fn put_multi(&mut self, account: Address, swap: MultiSwap) -> Result<(), EscrowError> {
        if self.multis.contains_key(&account) {
            return Err(EscrowError::MultiSwapExists { account });
        }
        self.multis.insert(account, swap);
        Ok(())
    }

    /// Read and clear the single swap for `account`.
    pub fn take_single(&mut self, account: Address) -> Result<SingleSwap, EscrowError> {
        self.singles
            .remove(&account)
            .ok_or(EscrowError::SwapNonExistent { account })
    }

    /// Read and clear the multi swap for `account`.
    pub fn take_multi(&mut self, account: Address) -> Result<MultiSwap, EscrowError> {
        self.multis
            .remove(&account)
            .ok_or(EscrowError::SwapNonExistent { account })
    }

    /// Restore a previously taken single swap. Used only to unwind a failed
    /// settlement effect.
    pub(crate) fn restore_single(&mut self, account: Address, swap: SingleSwap) {
        self.singles.insert(account, swap);
    }

    /// Restore a previously taken multi swap. Used only to unwind a failed
    /// settlement effect.
    pub(crate) fn restore_multi(&mut self, account: Address, swap: MultiSwap) {
        self.multis.insert(account, swap);
    }

    pub fn active_single_count(&self) -> usize {
        self.singles.len()
    }

    pub fn active_multi_count(&self) -> usize {
        self.multis.len()
    }
}
