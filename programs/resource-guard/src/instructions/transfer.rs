use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};

use super::has_one;
use crate::config::{SYSTEM_TRANSFER, TOKEN_TRANSFER};
use crate::derivation::vault_seeds;
use crate::guard::{AccessRequest, Guard, Policy, Rule};
use crate::identity::ResourceHandle;
use crate::math::checked_sub;
use crate::state::{Unopened, Vault};

const SPL_TOKEN_TRANSFER: u8 = 3;
const SYSTEM_TRANSFER_INDEX: u32 = 2;

/// A validated call for the host to dispatch.
///
/// `instruction.program_id` has passed the callee-program rule for the
/// call site that produced it. `signer_seeds` is empty unless a derived
/// address has to sign, in which case it holds that address's seeds followed
/// by its bump.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub instruction: Instruction,
    pub signer_seeds: Vec<Vec<u8>>,
}

pub struct DelegateTransfer<'a> {
    pub vault: &'a mut ResourceHandle,
    pub authority: &'a ResourceHandle,
    /// Token account the vault has authority over.
    pub source: &'a ResourceHandle,
    pub destination: &'a ResourceHandle,
    pub token_program: &'a ResourceHandle,
}

pub const DELEGATE_TRANSFER: Policy = Policy::new(
    "delegate_transfer",
    &[
        Rule::Signer,
        Rule::Owner,
        Rule::DerivedAddress,
        Rule::CalleeProgram,
    ],
)
.with_call_site(TOKEN_TRANSFER);

/// Debits the vault and builds the token transfer it authorizes.
///
/// The token program handle comes from the caller. It is only used as the
/// call target after the callee-program rule has matched it against the
/// `token_transfer` allow-list; a lookalike program that would "transfer"
/// by doing anything it likes never gets an instruction built for it.
pub fn delegate_transfer(
    guard: &Guard,
    accounts: DelegateTransfer<'_>,
    amount: u64,
) -> Result<Invocation> {
    let request = AccessRequest::new()
        .authority(accounts.authority)
        .resource(accounts.vault)
        .callee(accounts.token_program);
    let mut vault = guard
        .enforce::<Vault>(&DELEGATE_TRANSFER, &request)?
        .into_record()?;
    has_one(&vault.authority, accounts.authority)?;

    vault.balance = checked_sub(vault.balance, amount)?;

    let mut data = Vec::with_capacity(9);
    data.push(SPL_TOKEN_TRANSFER);
    data.extend_from_slice(&amount.to_le_bytes());

    let instruction = Instruction {
        program_id: *accounts.token_program.address(),
        accounts: vec![
            AccountMeta::new(*accounts.source.address(), false),
            AccountMeta::new(*accounts.destination.address(), false),
            AccountMeta::new_readonly(*vault.address(), true),
        ],
        data,
    };

    let mut signer_seeds = vault_seeds(&vault.authority);
    signer_seeds.push(vec![vault.bump]);

    vault.persist(accounts.vault)?;

    msg!(
        "Delegated transfer of {} to program {}, vault balance {}",
        amount,
        instruction.program_id,
        vault.balance
    );
    Ok(Invocation {
        instruction,
        signer_seeds,
    })
}

pub struct TransferLamports<'a> {
    pub from: &'a ResourceHandle,
    pub to: &'a ResourceHandle,
    pub system_program: &'a ResourceHandle,
}

pub const TRANSFER_LAMPORTS: Policy =
    Policy::new("transfer_lamports", &[Rule::Signer, Rule::CalleeProgram])
        .with_call_site(SYSTEM_TRANSFER);

pub fn transfer_lamports(
    guard: &Guard,
    accounts: TransferLamports<'_>,
    lamports: u64,
) -> Result<Invocation> {
    let request = AccessRequest::new()
        .authority(accounts.from)
        .callee(accounts.system_program);
    guard.enforce::<Unopened>(&TRANSFER_LAMPORTS, &request)?;

    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    msg!("Transferring {} lamports via System program", lamports);
    Ok(Invocation {
        instruction: Instruction {
            program_id: *accounts.system_program.address(),
            accounts: vec![
                AccountMeta::new(*accounts.from.address(), true),
                AccountMeta::new(*accounts.to.address(), false),
            ],
            data,
        },
        signer_seeds: Vec::new(),
    })
}

pub struct InvokeAllowed<'a> {
    pub authority: &'a ResourceHandle,
    pub target_program: &'a ResourceHandle,
}

pub const INVOKE_ALLOWED_RULES: &[Rule] = &[Rule::Signer, Rule::CalleeProgram];

/// Validates a signed call into whatever program `call_site` trusts and
/// passes `accounts`/`data` through untouched.
pub fn invoke_allowed(
    guard: &Guard,
    call_site: &'static str,
    accounts: InvokeAllowed<'_>,
    metas: Vec<AccountMeta>,
    data: Vec<u8>,
) -> Result<Invocation> {
    let policy = Policy::new("invoke_allowed", INVOKE_ALLOWED_RULES).with_call_site(call_site);
    let request = AccessRequest::new()
        .authority(accounts.authority)
        .callee(accounts.target_program);
    guard.enforce::<Unopened>(&policy, &request)?;

    msg!(
        "Program {} validated against {} allow-list",
        accounts.target_program.address(),
        call_site
    );
    Ok(Invocation {
        instruction: Instruction {
            program_id: *accounts.target_program.address(),
            accounts: metas,
            data,
        },
        signer_seeds: Vec::new(),
    })
}
