use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use anchor_lang::prelude::*;

use crate::error::ErrorCode;

/// An externally supplied, account-like resource.
///
/// Everything in here comes from the caller and is untrusted. `data` in
/// particular means nothing until the owner rule has passed for this handle;
/// the only typed view of it is the `Verified<T>` the owner rule returns.
///
/// Two handles are equal when they name the same address. Flags and payload
/// do not take part in comparison.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    address: Pubkey,
    owner: Pubkey,
    is_signer: bool,
    is_writable: bool,
    is_executable: bool,
    data: Vec<u8>,
}

impl ResourceHandle {
    /// A read-only, unsigned, non-executable handle with no data.
    pub fn new(address: Pubkey, owner: Pubkey) -> Self {
        Self {
            address,
            owner,
            is_signer: false,
            is_writable: false,
            is_executable: false,
            data: Vec::new(),
        }
    }

    /// An executable, read-only handle naming a callable program.
    pub fn program(address: Pubkey, loader: Pubkey) -> Self {
        Self::new(address, loader).executable()
    }

    pub fn signer(mut self) -> Self {
        self.is_signer = true;
        self
    }

    pub fn writable(mut self) -> Self {
        self.is_writable = true;
        self
    }

    pub fn executable(mut self) -> Self {
        self.is_executable = true;
        self
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn address(&self) -> &Pubkey {
        &self.address
    }

    pub fn owner(&self) -> &Pubkey {
        &self.owner
    }

    pub fn is_signer(&self) -> bool {
        self.is_signer
    }

    pub fn is_writable(&self) -> bool {
        self.is_writable
    }

    pub fn is_executable(&self) -> bool {
        self.is_executable
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable payload access for persisting verified records. Executable
    /// handles never carry mutable application state.
    pub(crate) fn data_mut(&mut self) -> Result<&mut Vec<u8>> {
        require!(
            self.is_writable && !self.is_executable,
            ErrorCode::AccountNotWritable
        );
        Ok(&mut self.data)
    }
}

impl PartialEq for ResourceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for ResourceHandle {}

impl PartialOrd for ResourceHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResourceHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address.cmp(&other.address)
    }
}

impl Hash for ResourceHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}
