use anchor_lang::prelude::*;

use super::has_one;
use crate::guard::{AccessRequest, Guard, Policy, Rule};
use crate::identity::ResourceHandle;
use crate::math::{checked_add, checked_div, checked_mul, checked_sub, mul_div};
use crate::state::{UserAccount, Verified};

/// 1% of points, in basis points.
pub const REWARD_RATE_BPS: u64 = 100;
const BPS_DENOMINATOR: u64 = 10_000;

pub struct UpdateUser<'a> {
    pub user: &'a mut ResourceHandle,
    pub authority: &'a ResourceHandle,
}

pub struct ClaimReward<'a> {
    pub user: &'a ResourceHandle,
    pub authority: &'a ResourceHandle,
}

const SIGNED_OWNED: &[Rule] = &[Rule::Signer, Rule::Owner];

pub const ADD_POINTS: Policy = Policy::new("add_points", SIGNED_OWNED);
pub const REMOVE_POINTS: Policy = Policy::new("remove_points", SIGNED_OWNED);
pub const CALCULATE_TOKENS: Policy = Policy::new("calculate_tokens", SIGNED_OWNED);
pub const CALCULATE_AVERAGE: Policy = Policy::new("calculate_average", SIGNED_OWNED);
pub const CLAIM_REWARD: Policy = Policy::new("claim_reward", SIGNED_OWNED);

fn open_user(
    guard: &Guard,
    policy: &Policy,
    user: &ResourceHandle,
    authority: &ResourceHandle,
) -> Result<Verified<UserAccount>> {
    let request = AccessRequest::new().authority(authority).resource(user);
    let user = guard.enforce::<UserAccount>(policy, &request)?.into_record()?;
    has_one(&user.authority, authority)?;
    Ok(user)
}

pub fn add_points(guard: &Guard, accounts: UpdateUser<'_>, points: u64) -> Result<u64> {
    let mut user = open_user(guard, &ADD_POINTS, accounts.user, accounts.authority)?;
    user.points = checked_add(user.points, points)?;
    user.persist(accounts.user)?;

    msg!("Added {} points, total {}", points, user.points);
    Ok(user.points)
}

pub fn remove_points(guard: &Guard, accounts: UpdateUser<'_>, points: u64) -> Result<u64> {
    let mut user = open_user(guard, &REMOVE_POINTS, accounts.user, accounts.authority)?;
    user.points = checked_sub(user.points, points)?;
    user.persist(accounts.user)?;

    msg!("Removed {} points, total {}", points, user.points);
    Ok(user.points)
}

/// `tokens = points * multiplier`.
///
/// Safe while `points * multiplier <= u64::MAX`; above that the record is left
/// as it was and `Overflow` is returned.
pub fn calculate_tokens(guard: &Guard, accounts: UpdateUser<'_>, multiplier: u64) -> Result<u64> {
    let mut user = open_user(guard, &CALCULATE_TOKENS, accounts.user, accounts.authority)?;
    user.tokens = checked_mul(user.points, multiplier)?;
    user.persist(accounts.user)?;

    msg!("Calculated tokens: {}", user.tokens);
    Ok(user.tokens)
}

/// `tokens = points / divisor`.
pub fn calculate_average(guard: &Guard, accounts: UpdateUser<'_>, divisor: u64) -> Result<u64> {
    let mut user = open_user(guard, &CALCULATE_AVERAGE, accounts.user, accounts.authority)?;
    user.tokens = checked_div(user.points, divisor)?;
    user.persist(accounts.user)?;

    msg!("Average calculated: {}", user.tokens);
    Ok(user.tokens)
}

/// Reward owed for the recorded points. Reads only.
///
/// `points * REWARD_RATE_BPS` is formed in 128 bits, so every u64 point
/// total is safe and the result never exceeds `points`.
pub fn claim_reward(guard: &Guard, accounts: ClaimReward<'_>) -> Result<u64> {
    let user = open_user(guard, &CLAIM_REWARD, accounts.user, accounts.authority)?;
    let reward = mul_div(user.points, REWARD_RATE_BPS, BPS_DENOMINATOR)?;

    msg!("Claiming {} tokens from verified account", reward);
    Ok(reward)
}
