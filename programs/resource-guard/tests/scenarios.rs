use anchor_lang::error::Error;
use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::AccountMeta;
use resource_guard::rules;
use resource_guard::{
    account_bytes, add_points, calculate_average, calculate_tokens, claim_reward,
    delegate_transfer, deposit, initialize_user, initialize_vault, invoke_allowed, remove_points,
    transfer_lamports, withdraw, AllowList, ClaimReward, DelegateTransfer, Deposit,
    DerivedAddressSpec, ErrorCode, Guard, GuardConfig, GuardedAccount, InitializeUser,
    InitializeVault, InvokeAllowed, ResourceHandle, TransferLamports, UpdateUser, UserAccount,
    Vault, Withdraw, ID, TOKEN_TRANSFER,
};

fn key(byte: u8) -> Pubkey {
    Pubkey::new_from_array([byte; 32])
}

fn code(error: ErrorCode) -> Error {
    error.into()
}

fn loader() -> Pubkey {
    key(250)
}

/// A signer, plus an empty program-owned account at its vault address.
fn fresh_vault(authority_byte: u8) -> (ResourceHandle, ResourceHandle) {
    let authority = ResourceHandle::new(key(authority_byte), key(0)).signer();
    let spec = DerivedAddressSpec::canonical(resource_guard::vault_seeds(authority.address()), ID)
        .unwrap();
    let vault = ResourceHandle::new(spec.derive().unwrap(), ID)
        .writable()
        .with_data(vec![0; Vault::LEN]);
    (authority, vault)
}

fn funded_vault(guard: &Guard, authority_byte: u8, balance: u64) -> (ResourceHandle, ResourceHandle) {
    let (authority, mut vault) = fresh_vault(authority_byte);
    initialize_vault(
        guard,
        InitializeVault {
            vault: &mut vault,
            authority: &authority,
        },
    )
    .unwrap();
    deposit(
        guard,
        Deposit {
            vault: &mut vault,
            depositor: &authority,
        },
        balance,
    )
    .unwrap();
    (authority, vault)
}

fn balance_of(vault: &ResourceHandle) -> u64 {
    Vault::open(vault.data()).unwrap().balance
}

/// An authority for which every bump in `bumps` yields a valid vault address.
fn authority_with_bumps(bumps: &[u8]) -> Pubkey {
    (0..=u8::MAX)
        .map(key)
        .find(|authority| {
            bumps
                .iter()
                .all(|bump| DerivedAddressSpec::vault(authority, ID, *bump).derive().is_ok())
        })
        .expect("an authority deriving with every bump")
}

#[test]
fn unsigned_authority_cannot_withdraw() {
    let guard = Guard::default();
    let (authority, mut vault) = funded_vault(&guard, 1, 100);
    let program_a = key(10);
    let unsigned = ResourceHandle::new(*authority.address(), program_a);
    let before = vault.data().to_vec();

    let result = withdraw(
        &guard,
        Withdraw {
            vault: &mut vault,
            authority: &unsigned,
        },
        50,
    );

    assert_eq!(result.unwrap_err(), code(ErrorCode::MissingSignature));
    assert_eq!(vault.data(), &before[..]);
}

#[test]
fn overdraw_underflows_and_leaves_balance_untouched() {
    let guard = Guard::default();
    let (authority, mut vault) = funded_vault(&guard, 2, 100);

    let result = withdraw(
        &guard,
        Withdraw {
            vault: &mut vault,
            authority: &authority,
        },
        200,
    );

    assert_eq!(result.unwrap_err(), code(ErrorCode::Underflow));
    assert_eq!(balance_of(&vault), 100);
}

#[test]
fn stored_bump_must_reproduce_the_address() {
    let user = authority_with_bumps(&[7, 8]);
    let spec = DerivedAddressSpec::vault(&user, ID, 7);
    let stored_address = spec.derive().unwrap();
    let handle = ResourceHandle::new(stored_address, ID);

    assert!(rules::derived_address::check(&handle, &spec).is_ok());

    let rebumped = DerivedAddressSpec { bump: 8, ..spec };
    assert_eq!(
        rules::derived_address::check(&handle, &rebumped).unwrap_err(),
        code(ErrorCode::SeedMismatch)
    );
}

#[test]
fn tampered_bump_is_rejected_by_the_guard() {
    // Same check, but with the bump read back from the record itself.
    let guard = Guard::default();
    let user = authority_with_bumps(&[7, 8]);
    let authority = ResourceHandle::new(user, key(0)).signer();
    let address = DerivedAddressSpec::vault(&user, ID, 7).derive().unwrap();
    let record = |bump| {
        account_bytes(&Vault {
            authority: user,
            balance: 5,
            bump,
        })
        .unwrap()
    };

    let mut vault = ResourceHandle::new(address, ID).writable().with_data(record(7));
    let balance = deposit(
        &guard,
        Deposit {
            vault: &mut vault,
            depositor: &authority,
        },
        1,
    )
    .unwrap();
    assert_eq!(balance, 6);

    let mut tampered = ResourceHandle::new(address, ID).writable().with_data(record(8));
    let result = deposit(
        &guard,
        Deposit {
            vault: &mut tampered,
            depositor: &authority,
        },
        1,
    );
    assert_eq!(result.unwrap_err(), code(ErrorCode::SeedMismatch));
    assert_eq!(balance_of(&tampered), 5);
}

#[test]
fn listed_callee_must_be_read_only() {
    let y = key(20);
    let allow_list = AllowList::new([y]);
    let callee = ResourceHandle::program(y, loader());

    assert!(rules::callee::check(&callee, &allow_list).is_ok());

    let writable = callee.clone().writable();
    assert_eq!(
        rules::callee::check(&writable, &allow_list).unwrap_err(),
        code(ErrorCode::UnauthorizedCallee)
    );
}

#[test]
fn deposit_overflow_never_wraps_to_zero() {
    let guard = Guard::default();
    let (authority, mut vault) = funded_vault(&guard, 3, u64::MAX);
    assert_eq!(balance_of(&vault), u64::MAX);

    let result = deposit(
        &guard,
        Deposit {
            vault: &mut vault,
            depositor: &authority,
        },
        1,
    );

    assert_eq!(result.unwrap_err(), code(ErrorCode::Overflow));
    assert_eq!(balance_of(&vault), u64::MAX);
}

#[test]
fn vault_lifecycle() {
    let guard = Guard::default();
    let (authority, mut vault) = fresh_vault(4);

    let created = initialize_vault(
        &guard,
        InitializeVault {
            vault: &mut vault,
            authority: &authority,
        },
    )
    .unwrap();
    assert_eq!(created.authority, *authority.address());
    assert_eq!(created.balance, 0);

    let depositor = ResourceHandle::new(key(99), key(0)).signer();
    let balance = deposit(
        &guard,
        Deposit {
            vault: &mut vault,
            depositor: &depositor,
        },
        300,
    )
    .unwrap();
    assert_eq!(balance, 300);

    let balance = withdraw(
        &guard,
        Withdraw {
            vault: &mut vault,
            authority: &authority,
        },
        120,
    )
    .unwrap();
    assert_eq!(balance, 180);

    let stored = Vault::open(vault.data()).unwrap();
    assert_eq!(stored.bump, created.bump);
    assert_eq!(stored.balance, 180);
}

#[test]
fn vault_cannot_be_reinitialized() {
    let guard = Guard::default();
    let (authority, mut vault) = funded_vault(&guard, 5, 77);

    let result = initialize_vault(
        &guard,
        InitializeVault {
            vault: &mut vault,
            authority: &authority,
        },
    );

    assert_eq!(result.unwrap_err(), code(ErrorCode::AlreadyInitialized));
    assert_eq!(balance_of(&vault), 77);
}

#[test]
fn vault_must_sit_at_the_signers_address() {
    let guard = Guard::default();
    let (_, victim_vault) = fresh_vault(6);
    let attacker = ResourceHandle::new(key(7), key(0)).signer();
    let mut vault = victim_vault;

    let result = initialize_vault(
        &guard,
        InitializeVault {
            vault: &mut vault,
            authority: &attacker,
        },
    );

    assert_eq!(result.unwrap_err(), code(ErrorCode::SeedMismatch));
    assert!(vault.data().iter().all(|byte| *byte == 0));
}

#[test]
fn signed_stranger_cannot_withdraw() {
    let guard = Guard::default();
    let (_, mut vault) = funded_vault(&guard, 8, 500);
    let stranger = ResourceHandle::new(key(9), key(0)).signer();

    let result = withdraw(
        &guard,
        Withdraw {
            vault: &mut vault,
            authority: &stranger,
        },
        500,
    );

    assert_eq!(result.unwrap_err(), code(ErrorCode::AuthorityMismatch));
    assert_eq!(balance_of(&vault), 500);
}

#[test]
fn lookalike_vault_from_another_program_is_rejected() {
    let guard = Guard::default();
    let (authority, vault) = funded_vault(&guard, 11, 1_000);
    let attacker_program = key(66);
    let mut counterfeit = ResourceHandle::new(*vault.address(), attacker_program)
        .writable()
        .with_data(vault.data().to_vec());

    let result = withdraw(
        &guard,
        Withdraw {
            vault: &mut counterfeit,
            authority: &authority,
        },
        1_000,
    );

    assert_eq!(result.unwrap_err(), code(ErrorCode::WrongOwner));
}

#[test]
fn program_owned_vault_off_its_derived_address_is_rejected() {
    // The attacker got a program-owned account naming themselves as the
    // authority, but it does not sit at ["vault", attacker].
    let guard = Guard::default();
    let attacker = ResourceHandle::new(key(12), key(0)).signer();
    let real = DerivedAddressSpec::canonical(resource_guard::vault_seeds(attacker.address()), ID)
        .unwrap();
    let forged_data = account_bytes(&Vault {
        authority: *attacker.address(),
        balance: 1_000_000,
        bump: real.bump,
    })
    .unwrap();
    let mut forged = ResourceHandle::new(key(13), ID)
        .writable()
        .with_data(forged_data);

    let result = withdraw(
        &guard,
        Withdraw {
            vault: &mut forged,
            authority: &attacker,
        },
        1_000_000,
    );

    assert_eq!(result.unwrap_err(), code(ErrorCode::SeedMismatch));
}

#[test]
fn user_record_cannot_pose_as_a_vault() {
    let guard = Guard::default();
    let (authority, vault) = fresh_vault(14);
    let cosplay = account_bytes(&UserAccount {
        authority: *authority.address(),
        points: u64::MAX,
        tokens: 0,
    })
    .unwrap();
    let mut vault = vault.with_data(cosplay);

    let result = withdraw(
        &guard,
        Withdraw {
            vault: &mut vault,
            authority: &authority,
        },
        1,
    );

    assert_eq!(result.unwrap_err(), code(ErrorCode::DiscriminatorMismatch));
}

#[test]
fn delegate_transfer_builds_a_token_instruction() {
    let guard = Guard::default();
    let (authority, mut vault) = funded_vault(&guard, 15, 400);
    let source = ResourceHandle::new(key(30), anchor_spl::token::ID).writable();
    let destination = ResourceHandle::new(key(31), anchor_spl::token::ID).writable();
    let token_program = ResourceHandle::program(anchor_spl::token::ID, loader());

    let invocation = delegate_transfer(
        &guard,
        DelegateTransfer {
            vault: &mut vault,
            authority: &authority,
            source: &source,
            destination: &destination,
            token_program: &token_program,
        },
        150,
    )
    .unwrap();

    let instruction = &invocation.instruction;
    assert_eq!(instruction.program_id, anchor_spl::token::ID);
    assert_eq!(instruction.data[0], 3);
    assert_eq!(instruction.data[1..9], 150u64.to_le_bytes());
    assert_eq!(instruction.accounts[2].pubkey, *vault.address());
    assert!(instruction.accounts[2].is_signer);

    let stored = Vault::open(vault.data()).unwrap();
    assert_eq!(stored.balance, 250);
    assert_eq!(invocation.signer_seeds.len(), 3);
    assert_eq!(invocation.signer_seeds[0], b"vault".to_vec());
    assert_eq!(invocation.signer_seeds[2], vec![stored.bump]);
}

#[test]
fn delegate_transfer_refuses_a_malicious_program() {
    let guard = Guard::default();
    let (authority, mut vault) = funded_vault(&guard, 16, 400);
    let source = ResourceHandle::new(key(30), anchor_spl::token::ID).writable();
    let destination = ResourceHandle::new(key(31), key(66)).writable();
    let malicious = ResourceHandle::program(key(66), loader());

    let result = delegate_transfer(
        &guard,
        DelegateTransfer {
            vault: &mut vault,
            authority: &authority,
            source: &source,
            destination: &destination,
            token_program: &malicious,
        },
        400,
    );

    assert_eq!(result.unwrap_err(), code(ErrorCode::UnauthorizedCallee));
    assert_eq!(balance_of(&vault), 400);
}

#[test]
fn allow_list_is_injected_not_global() {
    // A guard built with its own configuration trusts exactly that.
    let custom_token = key(77);
    let guard = Guard::new(GuardConfig::new(ID).with_call_site(TOKEN_TRANSFER, [custom_token]));
    let (authority, mut vault) = funded_vault(&guard, 17, 10);
    let source = ResourceHandle::new(key(30), custom_token).writable();
    let destination = ResourceHandle::new(key(31), custom_token).writable();

    let spl = ResourceHandle::program(anchor_spl::token::ID, loader());
    let refused = delegate_transfer(
        &guard,
        DelegateTransfer {
            vault: &mut vault,
            authority: &authority,
            source: &source,
            destination: &destination,
            token_program: &spl,
        },
        5,
    );
    assert_eq!(refused.unwrap_err(), code(ErrorCode::UnauthorizedCallee));

    let custom = ResourceHandle::program(custom_token, loader());
    let invocation = delegate_transfer(
        &guard,
        DelegateTransfer {
            vault: &mut vault,
            authority: &authority,
            source: &source,
            destination: &destination,
            token_program: &custom,
        },
        5,
    )
    .unwrap();
    assert_eq!(invocation.instruction.program_id, custom_token);
}

#[test]
fn lamport_transfer_requires_the_system_program() {
    let guard = Guard::default();
    let from = ResourceHandle::new(key(40), key(0)).signer().writable();
    let to = ResourceHandle::new(key(41), key(0)).writable();
    let system = ResourceHandle::program(anchor_lang::system_program::ID, loader());

    let invocation = transfer_lamports(
        &guard,
        TransferLamports {
            from: &from,
            to: &to,
            system_program: &system,
        },
        1_000,
    )
    .unwrap();
    assert_eq!(invocation.instruction.data[..4], 2u32.to_le_bytes());
    assert_eq!(invocation.instruction.data[4..], 1_000u64.to_le_bytes());

    let impostor = ResourceHandle::program(key(42), loader());
    let result = transfer_lamports(
        &guard,
        TransferLamports {
            from: &from,
            to: &to,
            system_program: &impostor,
        },
        1_000,
    );
    assert_eq!(result.unwrap_err(), code(ErrorCode::UnauthorizedCallee));
}

fn fresh_user(guard: &Guard, authority_byte: u8) -> (ResourceHandle, ResourceHandle) {
    let authority = ResourceHandle::new(key(authority_byte), key(0)).signer();
    let mut user = ResourceHandle::new(key(authority_byte.wrapping_add(100)), ID)
        .writable()
        .with_data(vec![0; UserAccount::LEN]);
    initialize_user(
        guard,
        InitializeUser {
            user: &mut user,
            authority: &authority,
        },
    )
    .unwrap();
    (authority, user)
}

fn update<'a>(user: &'a mut ResourceHandle, authority: &'a ResourceHandle) -> UpdateUser<'a> {
    UpdateUser { user, authority }
}

#[test]
fn points_flow() {
    let guard = Guard::default();
    let (authority, mut user) = fresh_user(&guard, 50);

    assert_eq!(add_points(&guard, update(&mut user, &authority), 1_000).unwrap(), 1_000);
    assert_eq!(remove_points(&guard, update(&mut user, &authority), 400).unwrap(), 600);
    assert_eq!(calculate_tokens(&guard, update(&mut user, &authority), 3).unwrap(), 1_800);
    assert_eq!(calculate_average(&guard, update(&mut user, &authority), 7).unwrap(), 85);

    let reward = claim_reward(
        &guard,
        ClaimReward {
            user: &user,
            authority: &authority,
        },
    )
    .unwrap();
    assert_eq!(reward, 6);
}

#[test]
fn points_arithmetic_failures_are_reported_and_not_applied() {
    let guard = Guard::default();
    let (authority, mut user) = fresh_user(&guard, 51);
    add_points(&guard, update(&mut user, &authority), 100).unwrap();

    assert_eq!(
        remove_points(&guard, update(&mut user, &authority), 200).unwrap_err(),
        code(ErrorCode::Underflow)
    );
    assert_eq!(
        add_points(&guard, update(&mut user, &authority), u64::MAX).unwrap_err(),
        code(ErrorCode::Overflow)
    );
    assert_eq!(
        calculate_tokens(&guard, update(&mut user, &authority), u64::MAX).unwrap_err(),
        code(ErrorCode::Overflow)
    );
    assert_eq!(
        calculate_average(&guard, update(&mut user, &authority), 0).unwrap_err(),
        code(ErrorCode::DivideByZero)
    );

    let stored = UserAccount::open(user.data()).unwrap();
    assert_eq!(stored.points, 100);
    assert_eq!(stored.tokens, 0);
}

#[test]
fn points_record_belongs_to_its_authority() {
    let guard = Guard::default();
    let (_, mut user) = fresh_user(&guard, 52);
    let other = ResourceHandle::new(key(53), key(0)).signer();

    let result = add_points(
        &guard,
        UpdateUser {
            user: &mut user,
            authority: &other,
        },
        10,
    );
    assert_eq!(result.unwrap_err(), code(ErrorCode::AuthorityMismatch));
}

#[test]
fn points_record_from_another_program_is_not_read() {
    let guard = Guard::default();
    let authority = ResourceHandle::new(key(54), key(0)).signer();
    let fake = ResourceHandle::new(key(55), key(66)).with_data(
        account_bytes(&UserAccount {
            authority: *authority.address(),
            points: u64::MAX,
            tokens: 0,
        })
        .unwrap(),
    );

    let result = claim_reward(
        &guard,
        ClaimReward {
            user: &fake,
            authority: &authority,
        },
    );
    assert_eq!(result.unwrap_err(), code(ErrorCode::WrongOwner));
}

#[test]
fn rejected_operation_does_not_stop_the_next_one() {
    let guard = Guard::default();
    let (authority, mut vault) = funded_vault(&guard, 18, 10);

    assert!(withdraw(
        &guard,
        Withdraw {
            vault: &mut vault,
            authority: &authority,
        },
        11,
    )
    .is_err());

    let balance = withdraw(
        &guard,
        Withdraw {
            vault: &mut vault,
            authority: &authority,
        },
        10,
    )
    .unwrap();
    assert_eq!(balance, 0);
}

#[test]
fn invoke_allowed_passes_metas_and_data_through() {
    let oracle = key(80);
    let guard = Guard::new(GuardConfig::default().with_call_site("oracle", [oracle]));
    let authority = ResourceHandle::new(key(81), key(0)).signer();
    let target = ResourceHandle::program(oracle, loader());
    let metas = vec![AccountMeta::new_readonly(key(82), false)];

    let invocation = invoke_allowed(
        &guard,
        "oracle",
        InvokeAllowed {
            authority: &authority,
            target_program: &target,
        },
        metas.clone(),
        vec![9, 9],
    )
    .unwrap();
    assert_eq!(invocation.instruction.program_id, oracle);
    assert_eq!(invocation.instruction.accounts, metas);
    assert_eq!(invocation.instruction.data, vec![9, 9]);
    assert!(invocation.signer_seeds.is_empty());

    // A trusted program at a call site that never listed it.
    let result = invoke_allowed(
        &guard,
        TOKEN_TRANSFER,
        InvokeAllowed {
            authority: &authority,
            target_program: &target,
        },
        metas.clone(),
        Vec::new(),
    );
    assert_eq!(result.unwrap_err(), code(ErrorCode::UnauthorizedCallee));

    let result = invoke_allowed(
        &guard,
        "unconfigured",
        InvokeAllowed {
            authority: &authority,
            target_program: &target,
        },
        metas,
        Vec::new(),
    );
    assert_eq!(result.unwrap_err(), code(ErrorCode::UnknownCallSite));
}

#[test]
fn user_record_cannot_be_reinitialized() {
    let guard = Guard::default();
    let (authority, mut user) = fresh_user(&guard, 56);
    add_points(&guard, update(&mut user, &authority), 40).unwrap();
    let attacker = ResourceHandle::new(key(57), key(0)).signer();

    let result = initialize_user(
        &guard,
        InitializeUser {
            user: &mut user,
            authority: &attacker,
        },
    );

    assert_eq!(result.unwrap_err(), code(ErrorCode::AlreadyInitialized));
    let stored = UserAccount::open(user.data()).unwrap();
    assert_eq!(stored.authority, *authority.address());
    assert_eq!(stored.points, 40);
}
