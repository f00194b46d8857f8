use anchor_lang::prelude::*;

use super::has_one;
use crate::guard::{AccessRequest, Guard, Policy, Rule};
use crate::identity::ResourceHandle;
use crate::math::checked_sub;
use crate::state::Vault;

pub struct Withdraw<'a> {
    pub vault: &'a mut ResourceHandle,
    pub authority: &'a ResourceHandle,
}

pub const WITHDRAW: Policy = Policy::new(
    "withdraw",
    &[Rule::Signer, Rule::Owner, Rule::DerivedAddress],
);

/// Debits the vault. Returns the new balance.
///
/// The authority comparison only means something because the signer rule ran
/// first: without it anyone could pass the authority's public key. The
/// derived-address rule stops a program-owned lookalike vault that names the
/// caller as its authority.
pub fn withdraw(guard: &Guard, accounts: Withdraw<'_>, amount: u64) -> Result<u64> {
    let request = AccessRequest::new()
        .authority(accounts.authority)
        .resource(accounts.vault);
    let mut vault = guard.enforce::<Vault>(&WITHDRAW, &request)?.into_record()?;
    has_one(&vault.authority, accounts.authority)?;

    vault.balance = checked_sub(vault.balance, amount)?;
    vault.persist(accounts.vault)?;

    msg!("Withdrew {} from vault, balance {}", amount, vault.balance);
    Ok(vault.balance)
}
