//! Independent checks on a single resource handle. Each returns its outcome
//! and never decides anything about the others; `Guard` chooses which run
//! and in what order.

pub mod callee;
pub mod derived_address;
pub mod owner;
pub mod signer;
