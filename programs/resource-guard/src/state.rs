use std::ops::{Deref, DerefMut};

use anchor_lang::prelude::*;

use crate::derivation::DerivedAddressSpec;
use crate::error::ErrorCode;
use crate::identity::ResourceHandle;

/// Ledger entry holding one authority's balance.
///
/// Lives at `["vault", authority]` under the program id. The bump found at
/// creation is stored and checked again on every access.
#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct Vault {
    pub authority: Pubkey,
    pub balance: u64,
    pub bump: u8,
}

impl Vault {
    pub const LEN: usize = 8 + 32 + 8 + 1; // discriminator + pubkey + u64 + u8
}

/// Points record for one authority.
#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct UserAccount {
    pub authority: Pubkey,
    pub points: u64,
    pub tokens: u64,
}

impl UserAccount {
    pub const LEN: usize = 8 + 32 + 8 + 8;
}

/// A record type the owner rule can open.
pub trait GuardedAccount: Sized {
    /// Interprets data whose owner has already been checked.
    fn open(data: &[u8]) -> Result<Self>;

    /// Where this record must live, if its address is derived.
    fn derivation(&self, _program_id: &Pubkey) -> Option<DerivedAddressSpec> {
        None
    }
}

/// Discriminator first, payload second. Data tagged as another type is
/// refused before a single field is read.
fn open_record<T: AccountDeserialize + Discriminator>(data: &[u8]) -> Result<T> {
    require!(
        data.starts_with(T::DISCRIMINATOR),
        ErrorCode::DiscriminatorMismatch
    );
    T::try_deserialize_unchecked(&mut &data[..]).map_err(|_| error!(ErrorCode::InvalidAccountData))
}

impl GuardedAccount for Vault {
    fn open(data: &[u8]) -> Result<Self> {
        open_record(data)
    }

    fn derivation(&self, program_id: &Pubkey) -> Option<DerivedAddressSpec> {
        Some(DerivedAddressSpec::vault(
            &self.authority,
            *program_id,
            self.bump,
        ))
    }
}

impl GuardedAccount for UserAccount {
    fn open(data: &[u8]) -> Result<Self> {
        open_record(data)
    }
}

/// Owner checked, data left uninterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unopened;

impl GuardedAccount for Unopened {
    fn open(_data: &[u8]) -> Result<Self> {
        Ok(Unopened)
    }
}

/// Owner checked and no record written yet: the discriminator slot is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uninitialized;

impl GuardedAccount for Uninitialized {
    fn open(data: &[u8]) -> Result<Self> {
        require!(
            data.iter().take(8).all(|byte| *byte == 0),
            ErrorCode::AlreadyInitialized
        );
        Ok(Uninitialized)
    }
}

/// Typed view of a handle's data.
///
/// Only the owner rule constructs one, and it stays bound to the address it
/// was opened from.
#[derive(Debug)]
pub struct Verified<T> {
    address: Pubkey,
    record: T,
}

impl<T> Verified<T> {
    pub(crate) fn new(address: Pubkey, record: T) -> Self {
        Self { address, record }
    }

    pub fn address(&self) -> &Pubkey {
        &self.address
    }

    pub fn into_inner(self) -> T {
        self.record
    }
}

impl Verified<Uninitialized> {
    /// Binds a freshly built record to the empty, owner-checked resource.
    pub fn initialize<R>(self, record: R) -> Verified<R> {
        Verified::new(self.address, record)
    }
}

impl<T: AccountSerialize> Verified<T> {
    /// Writes the record back to the handle it was opened from.
    ///
    /// The record is fully serialized before the handle is touched, so a
    /// failure leaves the handle's data as it was.
    pub fn persist(&self, handle: &mut ResourceHandle) -> Result<()> {
        require_keys_eq!(*handle.address(), self.address, ErrorCode::HandleMismatch);

        let mut bytes = Vec::new();
        self.record.try_serialize(&mut bytes)?;

        let data = handle.data_mut()?;
        if data.len() < bytes.len() {
            data.resize(bytes.len(), 0);
        }
        data[..bytes.len()].copy_from_slice(&bytes);
        Ok(())
    }
}

impl<T> Deref for Verified<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}

impl<T> DerefMut for Verified<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.record
    }
}

/// Serializes `record` with its discriminator, the layout the owner rule
/// expects to open.
pub fn account_bytes<T: AccountSerialize>(record: &T) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    record.try_serialize(&mut bytes)?;
    Ok(bytes)
}
