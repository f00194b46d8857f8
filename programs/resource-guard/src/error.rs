use anchor_lang::error::Error;
use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Missing required signature")]
    MissingSignature,
    #[msg("Account is not owned by the expected program")]
    WrongOwner,
    #[msg("Account address does not match its seed derivation")]
    SeedMismatch,
    #[msg("Callee is not an allow-listed, executable, read-only program")]
    UnauthorizedCallee,
    #[msg("Arithmetic overflow")]
    Overflow,
    #[msg("Arithmetic underflow")]
    Underflow,
    #[msg("Division by zero")]
    DivideByZero,
    #[msg("Account discriminator does not match the expected type")]
    DiscriminatorMismatch,
    #[msg("Account data could not be deserialized")]
    InvalidAccountData,
    #[msg("Unauthorized: Authority mismatch")]
    AuthorityMismatch,
    #[msg("Account is already initialized")]
    AlreadyInitialized,
    #[msg("Account is not writable")]
    AccountNotWritable,
    #[msg("Verified record written to a different account")]
    HandleMismatch,
    #[msg("Policy requires an account the request did not supply")]
    MissingGuardInput,
    #[msg("No allow-list configured for this call site")]
    UnknownCallSite,
}

/// What the host can sensibly do after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Fatal to the operation. Only a genuinely different request can succeed.
    Abort,
    /// Operands violated an arithmetic precondition; retrying with corrected
    /// input is legitimate.
    RetryWithNewInput,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 15] = [
        ErrorCode::MissingSignature,
        ErrorCode::WrongOwner,
        ErrorCode::SeedMismatch,
        ErrorCode::UnauthorizedCallee,
        ErrorCode::Overflow,
        ErrorCode::Underflow,
        ErrorCode::DivideByZero,
        ErrorCode::DiscriminatorMismatch,
        ErrorCode::InvalidAccountData,
        ErrorCode::AuthorityMismatch,
        ErrorCode::AlreadyInitialized,
        ErrorCode::AccountNotWritable,
        ErrorCode::HandleMismatch,
        ErrorCode::MissingGuardInput,
        ErrorCode::UnknownCallSite,
    ];

    pub fn recovery(&self) -> Recovery {
        match self {
            ErrorCode::Overflow | ErrorCode::Underflow | ErrorCode::DivideByZero => {
                Recovery::RetryWithNewInput
            }
            _ => Recovery::Abort,
        }
    }

    /// Maps an anchor error number back to the variant that produced it.
    pub fn from_number(number: u32) -> Option<ErrorCode> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| u32::from(*code) == number)
    }
}

/// Classifies an error propagated out of this crate. Errors raised by
/// anything else (the host's own program errors) yield `None`.
pub fn recovery_of(error: &Error) -> Option<Recovery> {
    match error {
        Error::AnchorError(anchor_error) => {
            ErrorCode::from_number(anchor_error.error_code_number).map(|code| code.recovery())
        }
        Error::ProgramError(_) => None,
    }
}
