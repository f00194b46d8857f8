use anchor_lang::prelude::*;

use crate::guard::{AccessRequest, Guard, Policy, Rule};
use crate::identity::ResourceHandle;
use crate::math::checked_add;
use crate::state::Vault;

pub struct Deposit<'a> {
    pub vault: &'a mut ResourceHandle,
    /// Anyone may fund a vault, but they must sign for it.
    pub depositor: &'a ResourceHandle,
}

pub const DEPOSIT: Policy = Policy::new(
    "deposit",
    &[Rule::Signer, Rule::Owner, Rule::DerivedAddress],
);

/// Returns the new balance.
pub fn deposit(guard: &Guard, accounts: Deposit<'_>, amount: u64) -> Result<u64> {
    let request = AccessRequest::new()
        .authority(accounts.depositor)
        .resource(accounts.vault);
    let mut vault = guard.enforce::<Vault>(&DEPOSIT, &request)?.into_record()?;

    vault.balance = checked_add(vault.balance, amount)?;
    vault.persist(accounts.vault)?;

    msg!("Deposited {} into vault, balance {}", amount, vault.balance);
    Ok(vault.balance)
}
