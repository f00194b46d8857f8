use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::error::ErrorCode;

pub const TOKEN_TRANSFER: &str = "token_transfer";
pub const SYSTEM_TRANSFER: &str = "system_transfer";

/// Programs trusted as the target of one delegated call site.
#[derive(Debug, Clone, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct AllowList {
    programs: Vec<Pubkey>,
}

impl AllowList {
    pub fn new(programs: impl IntoIterator<Item = Pubkey>) -> Self {
        let mut programs: Vec<Pubkey> = programs.into_iter().collect();
        programs.sort();
        programs.dedup();
        Self { programs }
    }

    pub fn contains(&self, program: &Pubkey) -> bool {
        self.programs.binary_search(program).is_ok()
    }

    pub fn programs(&self) -> &[Pubkey] {
        &self.programs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct CallSite {
    pub name: String,
    pub allowed: AllowList,
}

/// Static trust configuration, fixed before the guard is built.
///
/// `program_id` is the owner every guarded record must carry. Each call site
/// that hands control to another program names the programs it trusts.
#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct GuardConfig {
    pub program_id: Pubkey,
    call_sites: Vec<CallSite>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new(crate::ID)
            .with_call_site(TOKEN_TRANSFER, [anchor_spl::token::ID])
            .with_call_site(SYSTEM_TRANSFER, [system_program::ID])
    }
}

impl GuardConfig {
    /// A configuration with no call sites: every delegated call is refused.
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            call_sites: Vec::new(),
        }
    }

    /// Adds `name`, replacing any earlier entry for it.
    pub fn with_call_site(
        mut self,
        name: &str,
        programs: impl IntoIterator<Item = Pubkey>,
    ) -> Self {
        self.call_sites.retain(|site| site.name != name);
        self.call_sites.push(CallSite {
            name: name.to_string(),
            allowed: AllowList::new(programs),
        });
        self
    }

    /// Reads a borsh-encoded configuration, e.g. from a config account the
    /// host loaded at start-up.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let config = Self::try_from_slice(bytes).map_err(|_| ErrorCode::InvalidAccountData)?;
        // Re-normalize in case the encoder did not sort.
        let call_sites = config
            .call_sites
            .into_iter()
            .map(|site| CallSite {
                name: site.name,
                allowed: AllowList::new(site.allowed.programs),
            })
            .collect();
        Ok(Self {
            program_id: config.program_id,
            call_sites,
        })
    }

    pub fn allow_list(&self, call_site: &str) -> Result<&AllowList> {
        self.call_sites
            .iter()
            .find(|site| site.name == call_site)
            .map(|site| &site.allowed)
            .ok_or_else(|| error!(ErrorCode::UnknownCallSite))
    }

    pub fn call_sites(&self) -> &[CallSite] {
        &self.call_sites
    }
}
