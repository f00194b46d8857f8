use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::identity::ResourceHandle;

/// Knowing an address proves nothing. Only a signature over the current
/// request does, and the host sets `is_signer` only after verifying one.
pub fn check(handle: &ResourceHandle) -> Result<()> {
    require!(handle.is_signer(), ErrorCode::MissingSignature);
    Ok(())
}
