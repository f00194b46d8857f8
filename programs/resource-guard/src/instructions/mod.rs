pub mod deposit;
pub mod initialize_user;
pub mod initialize_vault;
pub mod points;
pub mod transfer;
pub mod withdraw;

pub use deposit::*;
pub use initialize_user::*;
pub use initialize_vault::*;
pub use points::*;
pub use transfer::*;
pub use withdraw::*;

use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::identity::ResourceHandle;

/// The record names `authority` as the party allowed to mutate it.
pub(crate) fn has_one(recorded: &Pubkey, authority: &ResourceHandle) -> Result<()> {
    require_keys_eq!(*recorded, *authority.address(), ErrorCode::AuthorityMismatch);
    Ok(())
}
