use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::identity::ResourceHandle;
use crate::state::{GuardedAccount, Verified};

pub fn check(handle: &ResourceHandle, expected_owner: &Pubkey) -> Result<()> {
    require_keys_eq!(*handle.owner(), *expected_owner, ErrorCode::WrongOwner);
    Ok(())
}

/// Owner check, then discriminator, then payload.
///
/// This is the only way to get a typed view of a handle's data. Nothing is
/// deserialized from a handle whose owner has not matched, even if the bytes
/// would parse into the expected shape. Executable handles are programs, not
/// application state, and never open.
pub fn open<T: GuardedAccount>(
    handle: &ResourceHandle,
    expected_owner: &Pubkey,
) -> Result<Verified<T>> {
    check(handle, expected_owner)?;
    require!(!handle.is_executable(), ErrorCode::WrongOwner);

    let record = T::open(handle.data())?;
    Ok(Verified::new(*handle.address(), record))
}
