use anchor_lang::prelude::*;

use crate::config::AllowList;
use crate::error::ErrorCode;
use crate::identity::ResourceHandle;

/// A delegated call target is a program identity, not owned data, so it is
/// trusted by allow-list membership rather than an owner comparison.
pub fn check(handle: &ResourceHandle, allow_list: &AllowList) -> Result<()> {
    require!(
        allow_list.contains(handle.address())
            && handle.is_executable()
            && !handle.is_writable(),
        ErrorCode::UnauthorizedCallee
    );
    Ok(())
}
