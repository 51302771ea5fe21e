//! Contains the Fusion+ cross-chain swap model shared between the order forms,
//! resolvers and inspection tooling: orders, their Dutch auction schedules,
//! the order state reported by the settlement contract, escrow timelocks and
//! token metadata.

pub mod account;
pub mod auction;
pub mod escrow;
pub mod order;
pub mod order_state;
pub mod token;
