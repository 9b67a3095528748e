use {
    crate::{
        constants::{Period, SECONDS_PER_WEEK},
        error::NutPowerError,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
};

/// Deployment configuration for a NutPower engine.
///
/// `nut` and `owner` are mutable after deployment through the admin
/// operations; `seconds_per_week` is fixed for the lifetime of the engine
/// because pending redeem requests carry durations derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct NutPowerConfig {
    /// Address of the NUT token the engine takes custody of.
    pub nut: Pubkey,

    /// Administrator allowed to change the token and the allow-list.
    pub owner: Pubkey,

    /// Length of one lock week in seconds.
    /// Test deployments may shorten this; production uses 604 800.
    pub seconds_per_week: i64,
}

impl NutPowerConfig {
    pub fn new(nut: Pubkey, owner: Pubkey) -> Self {
        Self {
            nut,
            owner,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), NutPowerError> {
        if self.seconds_per_week <= 0 {
            return Err(NutPowerError::InvalidConfig);
        }
        if self.owner == Pubkey::default() {
            return Err(NutPowerError::InvalidConfig);
        }
        // The longest period must still fit a redeem request's u32 duration.
        let longest = self.period_duration(Period::W8)?;
        u32::try_from(longest).map_err(|_| NutPowerError::InvalidConfig)?;
        Ok(())
    }

    /// Vesting duration of a redeem request created in `period`.
    ///
    /// ```text
    /// duration = lock_weeks * seconds_per_week
    /// ```
    pub fn period_duration(&self, period: Period) -> Result<i64, NutPowerError> {
        i64::from(period.lock_weeks())
            .checked_mul(self.seconds_per_week)
            .ok_or(NutPowerError::ArithmeticOverflow)
    }
}

impl Default for NutPowerConfig {
    fn default() -> Self {
        Self {
            nut: Pubkey::default(),
            owner: Pubkey::default(),
            seconds_per_week: SECONDS_PER_WEEK,
        }
    }
}
