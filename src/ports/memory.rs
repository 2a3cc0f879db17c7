//! In-memory reference adapters for the engine's ports.
//!
//! These model just enough of the external world to exercise the full swap
//! lifecycle: per-token unique ownership, per-holder quantity balances,
//! native cash balances, a flat subscription list, a moderator list, and a
//! capability registry. Failure injection hooks let tests drive the
//! engine's unwind paths.

use alloy_primitives::{Address, U256};
use std::collections::{HashMap, HashSet};

use crate::core::asset::Capability;
use crate::ports::{
    AssetTransferPort, CapabilityProbe, CashTransferPort, MembershipOracle, Role, RoleOracle,
    TransferFailure,
};

/// In-memory asset ownership and cash balances.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    /// (token, token_id) -> current owner of the unique unit.
    owners: HashMap<(Address, u32), Address>,
    /// (token, token_id, holder) -> quantity balance.
    balances: HashMap<(Address, u32, Address), u128>,
    /// holder -> native cash balance.
    cash: HashMap<Address, U256>,
    /// Tokens whose transfers are forced to fail.
    failing_tokens: HashSet<Address>,
    /// Destinations that reject native cash.
    cash_rejecting: HashSet<Address>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a unique unit with an initial owner.
    pub fn mint_unique(&mut self, token: Address, token_id: u32, owner: Address) {
        self.owners.insert((token, token_id), owner);
    }

    /// Seed a quantity balance for a holder.
    pub fn mint_quantity(&mut self, token: Address, token_id: u32, owner: Address, amount: u128) {
        *self.balances.entry((token, token_id, owner)).or_insert(0) += amount;
    }

    /// Force every transfer on `token` to fail.
    pub fn fail_transfers_on(&mut self, token: Address) {
        self.failing_tokens.insert(token);
    }

    /// Make `account` reject inbound native cash.
    pub fn reject_cash_for(&mut self, account: Address) {
        self.cash_rejecting.insert(account);
    }

    pub fn owner_of(&self, token: Address, token_id: u32) -> Option<Address> {
        self.owners.get(&(token, token_id)).copied()
    }

    pub fn balance_of(&self, token: Address, token_id: u32, holder: Address) -> u128 {
        self.balances
            .get(&(token, token_id, holder))
            .copied()
            .unwrap_or(0)
    }

    pub fn cash_balance(&self, holder: Address) -> U256 {
        self.cash.get(&holder).copied().unwrap_or(U256::ZERO)
    }
}

impl AssetTransferPort for InMemoryLedger {
    fn transfer_unique(
        &mut self,
        from: Address,
        to: Address,
        token: Address,
        token_id: u32,
    ) -> Result<(), TransferFailure> {
        if self.failing_tokens.contains(&token) {
            return Err(TransferFailure::new("token transfer forced to fail"));
        }
        match self.owners.get(&(token, token_id)) {
            Some(owner) if *owner == from => {
                self.owners.insert((token, token_id), to);
                Ok(())
            }
            Some(_) => Err(TransferFailure::new(format!(
                "{from} does not own {token}#{token_id}"
            ))),
            None => Err(TransferFailure::new(format!(
                "{token}#{token_id} does not exist"
            ))),
        }
    }

    fn transfer_quantity(
        &mut self,
        from: Address,
        to: Address,
        token: Address,
        token_id: u32,
        amount: u128,
    ) -> Result<(), TransferFailure> {
        if self.failing_tokens.contains(&token) {
            return Err(TransferFailure::new("token transfer forced to fail"));
        }
        let available = self.balance_of(token, token_id, from);
        if available < amount {
            return Err(TransferFailure::new(format!(
                "{from} holds {available} of {token}#{token_id}, needs {amount}"
            )));
        }
        *self.balances.entry((token, token_id, from)).or_insert(0) -= amount;
        *self.balances.entry((token, token_id, to)).or_insert(0) += amount;
        Ok(())
    }
}

impl CashTransferPort for InMemoryLedger {
    fn send(&mut self, to: Address, amount: U256) -> Result<(), TransferFailure> {
        if self.cash_rejecting.contains(&to) {
            return Err(TransferFailure::new(format!("{to} rejects native cash")));
        }
        let balance = self.cash.entry(to).or_insert(U256::ZERO);
        *balance = balance.saturating_add(amount);
        Ok(())
    }
}

/// Flat subscription list with a fixed unit fee.
#[derive(Debug, Clone)]
pub struct StaticMembership {
    unit_fee: U256,
    subscribers: HashSet<Address>,
}

impl StaticMembership {
    pub fn new(unit_fee: U256) -> Self {
        Self {
            unit_fee,
            subscribers: HashSet::new(),
        }
    }

    pub fn subscribe(&mut self, account: Address) {
        self.subscribers.insert(account);
    }
}

impl MembershipOracle for StaticMembership {
    fn has_subscription(&self, account: Address) -> bool {
        self.subscribers.contains(&account)
    }

    fn unit_fee(&self) -> U256 {
        self.unit_fee
    }
}

/// Flat role list.
#[derive(Debug, Clone, Default)]
pub struct StaticRoles {
    moderators: HashSet<Address>,
}

impl StaticRoles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_moderator(&mut self, account: Address) {
        self.moderators.insert(account);
    }
}

impl RoleOracle for StaticRoles {
    fn has_role(&self, role: Role, account: Address) -> bool {
        match role {
            Role::Moderator => self.moderators.contains(&account),
        }
    }
}

/// Capability registry keyed by token contract.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    unique_tokens: HashSet<Address>,
    quantity_tokens: HashSet<Address>,
    allow_all: bool,
}

impl StaticProbe {
    /// A probe with no attestations registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A probe that attests every token supports both protocols.
    pub fn permissive() -> Self {
        Self {
            allow_all: true,
            ..Self::default()
        }
    }

    pub fn register_unique(&mut self, token: Address) {
        self.unique_tokens.insert(token);
    }

    pub fn register_quantity(&mut self, token: Address) {
        self.quantity_tokens.insert(token);
    }
}

impl CapabilityProbe for StaticProbe {
    fn supports_capability(&self, token: Address, capability: Capability) -> bool {
        if self.allow_all {
            return true;
        }
        match capability {
            Capability::UniqueTransfer => self.unique_tokens.contains(&token),
            Capability::QuantityTransfer => self.quantity_tokens.contains(&token),
        }
    }
}
