//! Authorization checks for privileged NutPower operations.
//!
//! Restricted operations take the caller explicitly and check a capability
//! at the very start, before any ledger is touched:
//!
//! - owner-only configuration goes through an [`AdminAuthority`];
//! - the direct-lock entry point goes through the allow-list.

use {crate::error::NutPowerError, log::*, solana_pubkey::Pubkey, std::collections::BTreeSet};

/// Answers "is this caller the administrator?".
pub trait AdminAuthority {
    fn is_administrator(&self, caller: &Pubkey) -> bool;
}

/// A single owner key.
impl AdminAuthority for Pubkey {
    fn is_administrator(&self, caller: &Pubkey) -> bool {
        self == caller
    }
}

pub fn require_admin<A: AdminAuthority + ?Sized>(
    authority: &A,
    caller: &Pubkey,
) -> Result<(), NutPowerError> {
    if !authority.is_administrator(caller) {
        warn!("admin call rejected: {caller} is not the owner");
        return Err(NutPowerError::NotAuthorized);
    }
    Ok(())
}

pub fn require_whitelisted(
    whitelist: &BTreeSet<Pubkey>,
    caller: &Pubkey,
) -> Result<(), NutPowerError> {
    if !whitelist.contains(caller) {
        warn!("lock rejected: {caller} is not whitelisted");
        return Err(NutPowerError::NotWhitelisted);
    }
    Ok(())
}
