use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The cash leg of a swap: the fee the initiator paid into custody and the
/// native-currency amount the finalizer must attach on top of their fee.
///
/// Both fields are 128-bit by construction, which is exactly the packed
/// width; externally supplied `U256` amounts are range-checked before being
/// narrowed into a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashRecord {
    /// Fee paid at initiation, held in custody until finalize or cancel.
    pub initiation_fee: u128,
    /// Side payment the finalizer owes the initiator to balance the trade.
    pub cash_to_be_added: u128,
}

impl CashRecord {
    pub fn new(initiation_fee: u128, cash_to_be_added: u128) -> Self {
        Self {
            initiation_fee,
            cash_to_be_added,
        }
    }
}

impl fmt::Display for CashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fee={} cash_to_be_added={}",
            self.initiation_fee, self.cash_to_be_added
        )
    }
}

/// Whether an externally supplied native amount fits the 128-bit cash field.
pub fn fits_cash_width(amount: U256) -> bool {
    amount <= U256::from(u128::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cash_width_boundary() {
        assert!(fits_cash_width(U256::from(u128::MAX)));
        assert!(!fits_cash_width(U256::from(u128::MAX) + U256::from(1)));
        assert!(fits_cash_width(U256::ZERO));
    }

    #[test]
    fn test_default_is_empty() {
        let c = CashRecord::default();
        assert_eq!(c.initiation_fee, 0);
        assert_eq!(c.cash_to_be_added, 0);
    }
}
