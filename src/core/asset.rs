use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum token id that fits the packed 24-bit field.
pub const TOKEN_ID_MAX: u32 = (1 << 24) - 1;

/// Maximum asset value that fits the packed 72-bit field.
pub const VALUE_MAX: u128 = (1 << 72) - 1;

/// A fixed-width asset record: which token contract, which token id, and
/// how many units.
///
/// `value == 0` denotes a unique (single-unit) transfer of exactly one unit
/// of `token_id`; `value > 0` denotes a quantity-bearing transfer of `value`
/// units. A zero `token` address is the reserved "absent" sentinel and is
/// rejected wherever a record is validated.
///
/// # Examples
///
/// ```
/// use alloy_primitives::Address;
/// use escrow_engine::core::asset::AssetRecord;
///
/// let collectible = AssetRecord::unique(Address::repeat_byte(0x11), 7);
/// let shards = AssetRecord::quantity(Address::repeat_byte(0x22), 3, 500);
/// assert!(collectible.is_unique());
/// assert!(!shards.is_unique());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRecord {
    /// The token contract the units live under.
    pub token: Address,
    /// Token id within the contract. Must fit 24 bits.
    pub token_id: u32,
    /// Unit count. Zero means a unique single-unit transfer. Must fit 72 bits.
    pub value: u128,
}

impl AssetRecord {
    /// A unique, single-unit asset (`value == 0`).
    pub fn unique(token: Address, token_id: u32) -> Self {
        Self {
            token,
            token_id,
            value: 0,
        }
    }

    /// A quantity-bearing asset carrying `value` units of `token_id`.
    pub fn quantity(token: Address, token_id: u32, value: u128) -> Self {
        Self {
            token,
            token_id,
            value,
        }
    }

    /// Whether this record transfers via the single-unit protocol.
    pub fn is_unique(&self) -> bool {
        self.value == 0
    }

    /// The transfer capability this record requires of its token contract.
    pub fn capability(&self) -> Capability {
        if self.is_unique() {
            Capability::UniqueTransfer
        } else {
            Capability::QuantityTransfer
        }
    }

    /// Whether the record is well-formed: non-sentinel token address and
    /// both numeric fields within their packed widths.
    pub fn is_well_formed(&self) -> bool {
        self.token != Address::ZERO && self.token_id <= TOKEN_ID_MAX && self.value <= VALUE_MAX
    }
}

impl fmt::Display for AssetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unique() {
            write!(f, "{}#{}", self.token, self.token_id)
        } else {
            write!(f, "{}#{}x{}", self.token, self.token_id, self.value)
        }
    }
}

/// A transfer capability a token contract can attest to.
///
/// Each capability has a fixed 4-byte identifier used when probing the
/// contract's declared interface support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Single-unit transfer protocol (unique assets).
    UniqueTransfer,
    /// Quantity-bearing transfer protocol (semi-fungible assets).
    QuantityTransfer,
}

impl Capability {
    /// The protocol-defined 4-byte identifier for this capability.
    pub const fn id(self) -> [u8; 4] {
        match self {
            Capability::UniqueTransfer => [0x80, 0xac, 0x58, 0xcd],
            Capability::QuantityTransfer => [0xd9, 0xb6, 0x7a, 0x26],
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::UniqueTransfer => write!(f, "unique-transfer"),
            Capability::QuantityTransfer => write!(f, "quantity-transfer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_record_shape() {
        let r = AssetRecord::unique(Address::repeat_byte(0x01), 42);
        assert!(r.is_unique());
        assert_eq!(r.capability(), Capability::UniqueTransfer);
        assert!(r.is_well_formed());
    }

    #[test]
    fn test_quantity_record_shape() {
        let r = AssetRecord::quantity(Address::repeat_byte(0x01), 42, 1000);
        assert!(!r.is_unique());
        assert_eq!(r.capability(), Capability::QuantityTransfer);
        assert!(r.is_well_formed());
    }

    #[test]
    fn test_sentinel_token_rejected() {
        let r = AssetRecord::unique(Address::ZERO, 1);
        assert!(!r.is_well_formed());
    }

    #[test]
    fn test_field_width_limits() {
        let token = Address::repeat_byte(0x01);
        assert!(AssetRecord::unique(token, TOKEN_ID_MAX).is_well_formed());
        assert!(!AssetRecord::unique(token, TOKEN_ID_MAX + 1).is_well_formed());
        assert!(AssetRecord::quantity(token, 1, VALUE_MAX).is_well_formed());
        assert!(!AssetRecord::quantity(token, 1, VALUE_MAX + 1).is_well_formed());
    }

    #[test]
    fn test_capability_ids_distinct() {
        assert_ne!(
            Capability::UniqueTransfer.id(),
            Capability::QuantityTransfer.id()
        );
    }
}
