use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Failure taxonomy of the escrow engine.
///
/// Every variant is a distinct, non-retryable domain failure. An operation
/// that returns one of these has made no lasting change to custody state:
/// validation failures abort before any mutation, and effect failures are
/// unwound before the error surfaces.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EscrowError {
    /// A native-currency send was rejected by the destination or the
    /// underlying transport.
    #[error("cash transfer of {amount} to {to} failed")]
    CashTransferFailed { to: Address, amount: U256 },

    /// An attached payment or declared cash amount exceeds the 128-bit
    /// cash field width.
    #[error("cash amount {supplied} exceeds the 128-bit field width")]
    CashToBeAddedOrValueTooHigh { supplied: U256 },

    /// No active swap of the requested kind exists for the account.
    #[error("no active swap exists for {account}")]
    SwapNonExistent { account: Address },

    /// The account already has an active single swap.
    #[error("{account} already has an active single swap")]
    SingleSwapExists { account: Address },

    /// The account already has an active multi swap.
    #[error("{account} already has an active multi swap")]
    MultiSwapExists { account: Address },

    /// The supplied fee does not exactly match the required fee.
    #[error("fee validation failed: required {required}, supplied {supplied}")]
    FeeValidationFailed { required: U256, supplied: U256 },

    /// A provided asset record is malformed, or a multi-swap bundle does
    /// not meet the minimum combined size.
    #[error("invalid assets provided")]
    InvalidAssetsProvided,

    /// The token contract does not attest to the transfer capability the
    /// record's mode requires.
    #[error("token {token} failed the {capability} capability probe")]
    FailedToValidateInterfaceSupport {
        token: Address,
        capability: crate::core::asset::Capability,
    },

    /// The caller lacks the moderator role required for fee collection.
    #[error("{account} does not hold the moderator role")]
    OnlyModerator { account: Address },

    /// The underlying asset transfer protocol reported a failure.
    #[error("asset transfer on token {token} failed: {reason}")]
    AssetTransferFailed { token: Address, reason: String },
}
