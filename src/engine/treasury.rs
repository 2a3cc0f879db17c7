//! Treasury settlement: sweeping accumulated protocol fees.
//!
//! Fees accrue into a single counter as swaps finalize and leave the system
//! only through [`EscrowEngine::collect`], gated on the moderator role.

use alloy_primitives::{Address, U256};
use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::core::error::EscrowError;
use crate::core::event::FeesCollected;
use crate::engine::lifecycle::EscrowEngine;
use crate::ports::{
    AssetTransferPort, CapabilityProbe, CashTransferPort, MembershipOracle, Role, RoleOracle,
};

impl<P, M, R, A, C> EscrowEngine<P, M, R, A, C>
where
    P: CapabilityProbe,
    M: MembershipOracle,
    R: RoleOracle,
    A: AssetTransferPort,
    C: CashTransferPort,
{
    /// Sweep the accumulated fees to the treasury destination.
    ///
    /// The counter is zeroed before the outbound send, matching the
    /// clear-before-transfer ordering of the lifecycle operations; a failed
    /// send restores it.
    pub fn collect(&mut self, caller: Address) -> Result<FeesCollected, EscrowError> {
        if !self.roles.has_role(Role::Moderator, caller) {
            return Err(EscrowError::OnlyModerator { account: caller });
        }

        let amount = self.accumulated_fee;
        self.accumulated_fee = U256::ZERO;

        if self.cash.send(self.treasury, amount).is_err() {
            self.accumulated_fee = amount;
            return Err(EscrowError::CashTransferFailed {
                to: self.treasury,
                amount,
            });
        }

        info!("{caller} collected {amount} in fees to the treasury");
        Ok(FeesCollected {
            id: Uuid::new_v4(),
            collector: caller,
            amount,
            at: Utc::now(),
        })
    }
}
