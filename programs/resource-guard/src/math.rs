use anchor_lang::prelude::*;

use crate::error::ErrorCode;

// Every balance, supply and reward computation goes through these. Nothing
// in this crate uses the bare operators on a u64 that reaches an account.

pub fn checked_add(a: u64, b: u64) -> Result<u64> {
    Ok(a.checked_add(b).ok_or(ErrorCode::Overflow)?)
}

pub fn checked_sub(a: u64, b: u64) -> Result<u64> {
    Ok(a.checked_sub(b).ok_or(ErrorCode::Underflow)?)
}

pub fn checked_mul(a: u64, b: u64) -> Result<u64> {
    Ok(a.checked_mul(b).ok_or(ErrorCode::Overflow)?)
}

pub fn checked_div(a: u64, b: u64) -> Result<u64> {
    Ok(a.checked_div(b).ok_or(ErrorCode::DivideByZero)?)
}

/// `a * b / c` without intermediate overflow.
///
/// The product of two u64 values always fits in a u128, so any pair of
/// inputs is safe for the multiplication. The division is checked first
/// against a zero divisor, and the quotient is only accepted if it narrows
/// back into a u64.
pub fn mul_div(a: u64, b: u64, c: u64) -> Result<u64> {
    require!(c != 0, ErrorCode::DivideByZero);
    let product = u128::from(a) * u128::from(b);
    let quotient = product / u128::from(c);
    Ok(u64::try_from(quotient).map_err(|_| ErrorCode::Overflow)?)
}
