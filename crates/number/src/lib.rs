//! Helpers for on-chain token amounts: 256-bit integers that must never pass
//! through floating point.

pub mod conversions;
pub mod serialization;
pub mod units;

pub use alloy_primitives::U256;
