use anchor_lang::prelude::*;

use crate::error::ErrorCode;

pub const VAULT_SEED: &[u8] = b"vault";

/// Deterministic derivation rule for one resource address.
///
/// The bump is the one recorded when the resource was created. Validation
/// re-derives with exactly that bump and never searches for another one, so
/// a non-canonical alternate address for the same seeds is never accepted.
#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct DerivedAddressSpec {
    pub seeds: Vec<Vec<u8>>,
    pub owner_program: Pubkey,
    pub bump: u8,
}

impl DerivedAddressSpec {
    pub fn new(seeds: Vec<Vec<u8>>, owner_program: Pubkey, bump: u8) -> Self {
        Self {
            seeds,
            owner_program,
            bump,
        }
    }

    /// Searches the canonical bump for `seeds`. Only for creating a new
    /// resource; the bump found here must be stored with it.
    ///
    /// Seeds the runtime would refuse (more than 16, or one over 32 bytes)
    /// have no canonical bump and are a `SeedMismatch`.
    pub fn canonical(seeds: Vec<Vec<u8>>, owner_program: Pubkey) -> Result<Self> {
        let seed_refs: Vec<&[u8]> = seeds.iter().map(Vec::as_slice).collect();
        let (_, bump) = Pubkey::try_find_program_address(&seed_refs, &owner_program)
            .ok_or(ErrorCode::SeedMismatch)?;
        Ok(Self::new(seeds, owner_program, bump))
    }

    /// Seeds `["vault", authority]`.
    pub fn vault(authority: &Pubkey, owner_program: Pubkey, bump: u8) -> Self {
        Self::new(vault_seeds(authority), owner_program, bump)
    }

    /// Recomputes the address from the seeds in their stored order followed
    /// by the bump. A derivation the runtime would refuse (too many seeds, a
    /// seed over 32 bytes, a point on the curve) names no valid resource.
    pub fn derive(&self) -> Result<Pubkey> {
        let bump = [self.bump];
        let mut seed_refs: Vec<&[u8]> = self.seeds.iter().map(Vec::as_slice).collect();
        seed_refs.push(&bump);

        Pubkey::create_program_address(&seed_refs, &self.owner_program)
            .map_err(|_| error!(ErrorCode::SeedMismatch))
    }
}

pub fn vault_seeds(authority: &Pubkey) -> Vec<Vec<u8>> {
    vec![VAULT_SEED.to_vec(), authority.as_ref().to_vec()]
}
