use anchor_lang::prelude::*;

use crate::derivation::DerivedAddressSpec;
use crate::error::ErrorCode;
use crate::identity::ResourceHandle;

pub fn check(handle: &ResourceHandle, spec: &DerivedAddressSpec) -> Result<()> {
    let expected = spec.derive()?;
    require_keys_eq!(*handle.address(), expected, ErrorCode::SeedMismatch);
    Ok(())
}
