//! Custom errors for the NutPower engine.

use {
    num_derive::{FromPrimitive, ToPrimitive},
    num_traits::{FromPrimitive, ToPrimitive},
    thiserror::Error,
};

/// Every error is a rejected operation: the engine's ledgers are left exactly
/// as they were before the call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum NutPowerError {
    #[error("Invalid period: must be 0 (W1), 1 (W2), 2 (W4) or 3 (W8)")]
    InvalidTier = 0,

    #[error("Invalid period")]
    InvalidPeriod,

    #[error("Invalid upgrade amount")]
    InvalidUpgradeAmount,

    #[error("Insufficient free NP")]
    InsufficientFreePower,

    #[error("Insufficient locked NUT in period")]
    InsufficientLockedPrincipal,

    #[error("Token transfer failed")]
    TransferFailed,

    #[error("Ownable: caller is not the owner")]
    NotAuthorized,

    #[error("Address is not whitelisted")]
    NotWhitelisted,

    #[error("No NUT available to claim")]
    NothingToClaim,

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Power-down amount is below one NUT unit for this period")]
    ZeroRedeemAmount,

    #[error("Token ledger does not match the configured NUT token")]
    TokenMismatch,

    #[error("Insufficient token balance")]
    InsufficientBalance,

    #[error("Insufficient token allowance")]
    InsufficientAllowance,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Instruction data is invalid")]
    InvalidInstructionData,

    #[error("NutPower state data is invalid or corrupted")]
    InvalidStateData,

    #[error("NutPower configuration is invalid")]
    InvalidConfig,
}

impl NutPowerError {
    /// Stable numeric code, suitable for a custom program error.
    pub fn code(self) -> u32 {
        self.to_u32().unwrap_or(u32::MAX)
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_u32(code)
    }
}
