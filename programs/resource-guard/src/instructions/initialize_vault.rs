use anchor_lang::prelude::*;

use crate::derivation::{vault_seeds, DerivedAddressSpec};
use crate::guard::{AccessRequest, Guard, Policy, Rule};
use crate::identity::ResourceHandle;
use crate::state::{Uninitialized, Vault};

pub struct InitializeVault<'a> {
    /// Empty, program-owned account at `["vault", authority]`.
    pub vault: &'a mut ResourceHandle,
    pub authority: &'a ResourceHandle,
}

pub const INITIALIZE_VAULT: Policy = Policy::new(
    "initialize_vault",
    &[Rule::Signer, Rule::Owner, Rule::DerivedAddress],
);

/// Creates the vault for the signing authority.
///
/// The canonical bump is searched here, once, and stored in the record.
/// Every later access re-derives with the stored bump. An account that
/// already carries a discriminator is refused, so an existing vault can never
/// be re-keyed to another authority.
pub fn initialize_vault(guard: &Guard, accounts: InitializeVault<'_>) -> Result<Vault> {
    let spec = DerivedAddressSpec::canonical(
        vault_seeds(accounts.authority.address()),
        *guard.program_id(),
    )?;
    let bump = spec.bump;

    let request = AccessRequest::new()
        .authority(accounts.authority)
        .resource(accounts.vault)
        .derivation(spec);
    let empty = guard
        .enforce::<Uninitialized>(&INITIALIZE_VAULT, &request)?
        .into_record()?;

    let vault = empty.initialize(Vault {
        authority: *accounts.authority.address(),
        balance: 0,
        bump,
    });
    vault.persist(accounts.vault)?;

    msg!("Vault initialized for authority: {}", vault.authority);
    msg!("Canonical bump stored: {}", vault.bump);
    Ok(vault.into_inner())
}
