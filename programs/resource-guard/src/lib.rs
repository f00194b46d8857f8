use anchor_lang::prelude::*;

declare_id!("HJYVF4HEdv4YtHmzLTP6kuV5f2UB1Z1CMAes4FpYg7Z1");

pub mod config;
pub mod derivation;
pub mod error;
pub mod guard;
pub mod identity;
pub mod instructions;
pub mod math;
pub mod rules;
pub mod state;

pub use config::*;
pub use derivation::*;
pub use error::{recovery_of, ErrorCode, Recovery};
pub use guard::*;
pub use identity::*;
pub use instructions::*;
pub use state::*;
