//! # escrow-engine
//!
//! Trust-minimized escrow engine for atomic swaps of unique and
//! semi-fungible assets, optionally with a native-currency side payment.
//!
//! An initiator deposits one or more assets plus a protocol fee into custody
//! and declares what they want in return; a finalizer later supplies the
//! requested assets (and any cash delta) to complete the trade atomically,
//! or the initiator withdraws their own deposit first.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: asset and cash records, the packed-word
//!   codec, lifecycle events, the error taxonomy
//! - **ports** — Injected capability interfaces: membership and role
//!   oracles, the capability probe, asset and cash transfer protocols,
//!   plus in-memory reference adapters
//! - **engine** — Fee policy, per-account swap registry, the swap lifecycle
//!   state machine, treasury settlement

pub mod core;
pub mod engine;
pub mod ports;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::asset::{AssetRecord, Capability};
    pub use crate::core::cash::CashRecord;
    pub use crate::core::codec::{decode_asset, decode_cash, encode_asset, encode_cash};
    pub use crate::core::error::EscrowError;
    pub use crate::engine::lifecycle::EscrowEngine;
    pub use crate::engine::registry::{MultiSwap, SingleSwap, SwapKind, SwapRegistry};
    pub use crate::ports::memory::{InMemoryLedger, StaticMembership, StaticProbe, StaticRoles};
    pub use crate::ports::{
        AssetTransferPort, CapabilityProbe, CashTransferPort, MembershipOracle, Role, RoleOracle,
    };
}
