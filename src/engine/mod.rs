//! The swap lifecycle engine and its supporting policies.
//!
//! - **fees** — required-fee computation against the membership oracle
//! - **registry** — per-account storage of at most one active swap per kind
//! - **lifecycle** — the initiate / finalize / cancel state machine
//! - **treasury** — accumulated-fee sweep, gated on the moderator role

pub mod fees;
pub mod lifecycle;
pub mod registry;
pub mod treasury;
