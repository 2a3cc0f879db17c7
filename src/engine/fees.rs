use alloy_primitives::{Address, U256};

use crate::core::error::EscrowError;
use crate::ports::MembershipOracle;

/// Fee computation and validation against the membership oracle.
///
/// Non-subscribers pay `unit_fee * unit_count`, where the unit count is the
/// number of assets involved in the operation (2 for a single swap, the
/// combined set size for a multi swap). Subscribers pay nothing, and the
/// policy treats a nonzero payment from a subscriber as a caller error
/// rather than accepting the overpayment.
pub struct FeePolicy;

impl FeePolicy {
    /// The exact fee `account` must supply for an operation over
    /// `unit_count` assets.
    pub fn required_fee<M: MembershipOracle>(
        oracle: &M,
        account: Address,
        unit_count: usize,
    ) -> U256 {
        if oracle.has_subscription(account) {
            U256::ZERO
        } else {
            oracle.unit_fee().saturating_mul(U256::from(unit_count))
        }
    }

    /// Validate that `supplied` exactly matches the requirement, returning
    /// the accepted fee.
    pub fn validate_fee<M: MembershipOracle>(
        oracle: &M,
        account: Address,
        unit_count: usize,
        supplied: U256,
    ) -> Result<U256, EscrowError> {
        let required = Self::required_fee(oracle, account, unit_count);
        if supplied != required {
            return Err(EscrowError::FeeValidationFailed { required, supplied });
        }
        Ok(supplied)
    }
}
