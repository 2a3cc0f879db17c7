//! Packs asset and cash records into single 256-bit words and back.
//!
//! Word layouts:
//!
//! - asset: token contract in bits 255..96, token id in bits 95..72,
//!   value in bits 71..0
//! - cash: initiation fee in the high 128 bits, cash-to-be-added in the
//!   low 128 bits
//!
//! Decoding is total: out-of-range bits are masked off, never rejected.
//! Encoding is where validation lives — record shape plus the token's
//! capability attestation.

use alloy_primitives::{Address, U256};

use crate::core::asset::{AssetRecord, TOKEN_ID_MAX, VALUE_MAX};
use crate::core::cash::CashRecord;
use crate::core::error::EscrowError;
use crate::ports::CapabilityProbe;

const TOKEN_SHIFT: usize = 96;
const TOKEN_ID_SHIFT: usize = 72;
const CASH_SHIFT: usize = 128;

fn value_mask() -> U256 {
    (U256::from(1u8) << TOKEN_ID_SHIFT) - U256::from(1u8)
}

/// Pack an asset record into its 256-bit word. Pure and total; numeric
/// fields are masked to their packed widths.
pub fn pack_asset(record: &AssetRecord) -> U256 {
    let token = U256::from_be_slice(record.token.as_slice());
    (token << TOKEN_SHIFT)
        | (U256::from(record.token_id & TOKEN_ID_MAX) << TOKEN_ID_SHIFT)
        | U256::from(record.value & VALUE_MAX)
}

/// Decode a 256-bit word into an asset record. Total inverse of
/// [`pack_asset`] for any input word.
pub fn decode_asset(word: U256) -> AssetRecord {
    let bytes = word.to_be_bytes::<32>();
    AssetRecord {
        token: Address::from_slice(&bytes[..20]),
        token_id: ((word >> TOKEN_ID_SHIFT) & U256::from(TOKEN_ID_MAX)).to::<u32>(),
        value: (word & value_mask()).to::<u128>(),
    }
}

/// Validate and pack an asset record.
///
/// Fails with [`EscrowError::InvalidAssetsProvided`] on a sentinel token or
/// out-of-width fields, and with
/// [`EscrowError::FailedToValidateInterfaceSupport`] when the token contract
/// does not attest to the transfer capability the record's mode requires.
pub fn encode_asset<P: CapabilityProbe>(
    probe: &P,
    record: &AssetRecord,
) -> Result<U256, EscrowError> {
    if !record.is_well_formed() {
        return Err(EscrowError::InvalidAssetsProvided);
    }
    let capability = record.capability();
    if !probe.supports_capability(record.token, capability) {
        return Err(EscrowError::FailedToValidateInterfaceSupport {
            token: record.token,
            capability,
        });
    }
    Ok(pack_asset(record))
}

/// Validate and pack a sequence of asset records in order.
pub fn encode_asset_set<P: CapabilityProbe>(
    probe: &P,
    records: &[AssetRecord],
) -> Result<Vec<U256>, EscrowError> {
    records.iter().map(|r| encode_asset(probe, r)).collect()
}

/// Batch helper: validate and pack two parallel asset-record lists from
/// structured input, preserving each list's order.
pub fn encode_asset_lists<P: CapabilityProbe>(
    probe: &P,
    offered: &[AssetRecord],
    requested: &[AssetRecord],
) -> Result<(Vec<U256>, Vec<U256>), EscrowError> {
    Ok((
        encode_asset_set(probe, offered)?,
        encode_asset_set(probe, requested)?,
    ))
}

/// Pack a cash record into its 256-bit word. Total by construction: both
/// fields are 128-bit at the type level.
pub fn encode_cash(record: &CashRecord) -> U256 {
    (U256::from(record.initiation_fee) << CASH_SHIFT) | U256::from(record.cash_to_be_added)
}

/// Decode a 256-bit word into a cash record. Total inverse of
/// [`encode_cash`].
pub fn decode_cash(word: U256) -> CashRecord {
    CashRecord {
        initiation_fee: (word >> CASH_SHIFT).to::<u128>(),
        cash_to_be_added: (word & U256::from(u128::MAX)).to::<u128>(),
    }
}
