use anchor_lang::prelude::*;

use crate::guard::{AccessRequest, Guard, Policy, Rule};
use crate::identity::ResourceHandle;
use crate::state::{Uninitialized, UserAccount};

pub struct InitializeUser<'a> {
    pub user: &'a mut ResourceHandle,
    pub authority: &'a ResourceHandle,
}

pub const INITIALIZE_USER: Policy =
    Policy::new("initialize_user", &[Rule::Signer, Rule::Owner]);

pub fn initialize_user(guard: &Guard, accounts: InitializeUser<'_>) -> Result<UserAccount> {
    let request = AccessRequest::new()
        .authority(accounts.authority)
        .resource(accounts.user);
    let empty = guard
        .enforce::<Uninitialized>(&INITIALIZE_USER, &request)?
        .into_record()?;

    let user = empty.initialize(UserAccount {
        authority: *accounts.authority.address(),
        points: 0,
        tokens: 0,
    });
    user.persist(accounts.user)?;

    msg!("User account initialized");
    Ok(user.into_inner())
}
