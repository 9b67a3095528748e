//! Persisted state for the NutPower engine.

use {
    crate::{config::NutPowerConfig, error::NutPowerError, ledger::UserLedger},
    borsh::{BorshDeserialize, BorshSerialize},
    solana_pubkey::Pubkey,
    std::collections::{BTreeMap, BTreeSet},
};

/// Discriminator byte written at the start of every serialised state blob
/// to distinguish it from uninitialized or foreign data.
pub const NUT_POWER_STATE_DISCRIMINATOR: u8 = 1;

/// Complete engine state.
///
/// Serialised with Borsh; the first byte of the blob is the discriminator.
/// Maps are ordered so the encoding of a given state is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct NutPowerState {
    pub config: NutPowerConfig,

    /// Callers allowed to use the direct-lock entry point.
    pub whitelist: BTreeSet<Pubkey>,

    /// Per-user ledgers.  Users with nothing left are pruned.
    pub users: BTreeMap<Pubkey, UserLedger>,

    /// Principal in custody: locked plus pending redemption.
    pub total_locked_nut: u128,

    /// Sum of every user's free NP.
    pub total_issued_np: u128,
}

/// Aggregates recomputed from the per-user ledgers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub locked_nut: u128,
    pub issued_np: u128,
}

impl NutPowerState {
    pub fn new(config: NutPowerConfig) -> Self {
        Self {
            config,
            whitelist: BTreeSet::new(),
            users: BTreeMap::new(),
            total_locked_nut: 0,
            total_issued_np: 0,
        }
    }

    /// Deserialise from raw data (expects leading discriminator byte).
    ///
    /// The payload must fill the rest of `data` exactly.
    pub fn deserialize(data: &[u8]) -> Result<Self, std::io::Error> {
        if data.is_empty() || data[0] != NUT_POWER_STATE_DISCRIMINATOR {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "missing or invalid nut-power discriminator",
            ));
        }
        borsh::from_slice(&data[1..])
    }

    /// Serialise into a fresh buffer (prepends discriminator byte).
    pub fn to_bytes(&self) -> Result<Vec<u8>, std::io::Error> {
        let mut data = vec![NUT_POWER_STATE_DISCRIMINATOR];
        BorshSerialize::serialize(self, &mut data)?;
        Ok(data)
    }

    /// Serialise into an existing buffer (prepends discriminator byte).
    pub fn serialize_into(&self, data: &mut [u8]) -> Result<(), std::io::Error> {
        let bytes = self.to_bytes()?;
        if data.len() < bytes.len() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "state data buffer too small",
            ));
        }
        data[..bytes.len()].copy_from_slice(&bytes);
        Ok(())
    }

    /// Sum the per-user ledgers.
    pub fn recompute_totals(&self) -> Result<Totals, NutPowerError> {
        self.users
            .values()
            .try_fold(Totals::default(), |totals, ledger| {
                Ok(Totals {
                    locked_nut: totals
                        .locked_nut
                        .checked_add(ledger.total_nut()?)
                        .ok_or(NutPowerError::ArithmeticOverflow)?,
                    issued_np: totals
                        .issued_np
                        .checked_add(ledger.free_np())
                        .ok_or(NutPowerError::ArithmeticOverflow)?,
                })
            })
    }

    /// Check that both aggregates equal the sum of their per-user components
    /// and that every redeem request is consistent.
    pub fn verify(&self) -> Result<(), NutPowerError> {
        let totals = self.recompute_totals()?;
        if totals.locked_nut != self.total_locked_nut || totals.issued_np != self.total_issued_np {
            return Err(NutPowerError::InvalidStateData);
        }
        if !self.users.values().all(UserLedger::is_consistent) {
            return Err(NutPowerError::InvalidStateData);
        }
        Ok(())
    }
}
