//! Instruction definitions for the NutPower engine.
//!
//! All instructions are serialised / deserialised via `bincode`.  The caller
//! (signer) and the clock are supplied alongside the instruction data, never
//! inside it.

use {
    crate::error::NutPowerError,
    serde::{Deserialize, Serialize},
    solana_bincode::limited_deserialize,
    solana_packet::PACKET_DATA_SIZE,
    solana_pubkey::Pubkey,
};

/// Instructions supported by the NutPower engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NutPowerInstruction {
    /// Lock `amount` NUT from the caller in `period` and mint NP.
    ///
    /// # Data
    ///
    /// * `amount`: NUT to lock.
    /// * `period`: Period index (0..=3).
    PowerUp { amount: u128, period: u8 },

    /// Burn `amount` NP and queue the matching principal of `period` for
    /// linear redemption.
    PowerDown { amount: u128, period: u8 },

    /// Move `amount` locked NUT from period `src` to the longer period `dest`.
    Upgrade { amount: u128, src: u8, dest: u8 },

    /// Pay out everything vested across the caller's redeem requests.
    Redeem,

    /// Owner only: point the engine at a different NUT token.
    AdminSetNut { nut: Pubkey },

    /// Owner only: add or remove an address from the direct-lock allow-list.
    AdminSetWhitelist { account: Pubkey, allowed: bool },

    /// Owner only: hand administration to a new key.
    AdminTransferOwnership { new_owner: Pubkey },

    /// Allow-listed callers only: lock `amount` NUT paid by the caller on
    /// behalf of `recipient` in `period`.
    Lock {
        recipient: Pubkey,
        amount: u128,
        period: u8,
    },
}

impl NutPowerInstruction {
    pub fn to_bytes(&self) -> Result<Vec<u8>, NutPowerError> {
        bincode::serialize(self).map_err(|_| NutPowerError::InvalidInstructionData)
    }

    /// Decode instruction data, bounded by the packet size.
    pub fn from_bytes(data: &[u8]) -> Result<Self, NutPowerError> {
        limited_deserialize(data, PACKET_DATA_SIZE as u64)
            .map_err(|_| NutPowerError::InvalidInstructionData)
    }
}
