//! Foundational value types and pure logic.
//!
//! Everything in this module is side-effect free: record types, the
//! packed-word codec, the lifecycle event types, and the error taxonomy.

pub mod asset;
pub mod cash;
pub mod codec;
pub mod error;
pub mod event;
