//! Per-user balance ledger.
//!
//! Tracks a user's free NP, the principal attributed to each period, and the
//! user's redeem queues.  Every mutator is checked: on error the ledger is
//! unchanged.

use {
    crate::{
        constants::{Period, PERIOD_COUNT},
        error::NutPowerError,
        redeem::{RedeemQueue, RedeemRequest},
    },
    borsh::{BorshDeserialize, BorshSerialize},
    solana_clock::UnixTimestamp,
};

/// NP minted for `nut_amount` of principal at `multiplier`.
pub fn power_for(nut_amount: u128, multiplier: u64) -> Result<u128, NutPowerError> {
    nut_amount
        .checked_mul(u128::from(multiplier))
        .ok_or(NutPowerError::ArithmeticOverflow)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct UserLedger {
    /// Spendable NP.
    free_np: u128,

    /// Principal per period that has not been powered down.
    locked_nut: [u128; PERIOD_COUNT],

    /// Pending redemptions per period.
    redeem_queues: [RedeemQueue; PERIOD_COUNT],
}

impl UserLedger {
    pub fn free_np(&self) -> u128 {
        self.free_np
    }

    pub fn locked_nut(&self, period: Period) -> u128 {
        self.locked_nut[period.slot()]
    }

    pub fn redeem_queue(&self, period: Period) -> &RedeemQueue {
        &self.redeem_queues[period.slot()]
    }

    pub fn credit_power(&mut self, amount: u128) -> Result<(), NutPowerError> {
        self.free_np = self
            .free_np
            .checked_add(amount)
            .ok_or(NutPowerError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn debit_power(&mut self, amount: u128) -> Result<(), NutPowerError> {
        self.free_np = self
            .free_np
            .checked_sub(amount)
            .ok_or(NutPowerError::InsufficientFreePower)?;
        Ok(())
    }

    pub fn lock_principal(&mut self, period: Period, amount: u128) -> Result<(), NutPowerError> {
        let slot = &mut self.locked_nut[period.slot()];
        *slot = slot
            .checked_add(amount)
            .ok_or(NutPowerError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn release_principal(&mut self, period: Period, amount: u128) -> Result<(), NutPowerError> {
        let slot = &mut self.locked_nut[period.slot()];
        *slot = slot
            .checked_sub(amount)
            .ok_or(NutPowerError::InsufficientLockedPrincipal)?;
        Ok(())
    }

    pub fn enqueue_redeem(&mut self, period: Period, request: RedeemRequest) {
        self.redeem_queues[period.slot()].push(request);
    }

    /// Principal still in custody across all redeem queues.
    pub fn pending_nut(&self) -> Result<u128, NutPowerError> {
        self.redeem_queues.iter().try_fold(0u128, |acc, queue| {
            acc.checked_add(queue.outstanding()?)
                .ok_or(NutPowerError::ArithmeticOverflow)
        })
    }

    /// Principal held for this user: locked plus pending redemption.
    pub fn total_nut(&self) -> Result<u128, NutPowerError> {
        self.locked_nut
            .iter()
            .try_fold(self.pending_nut()?, |acc, locked| {
                acc.checked_add(*locked)
                    .ok_or(NutPowerError::ArithmeticOverflow)
            })
    }

    pub fn claimable_at(&self, now: UnixTimestamp) -> Result<u128, NutPowerError> {
        self.redeem_queues.iter().try_fold(0u128, |acc, queue| {
            acc.checked_add(queue.claimable_at(now)?)
                .ok_or(NutPowerError::ArithmeticOverflow)
        })
    }

    /// Settle every queue as of `now`, returning the principal released.
    pub fn settle_redeems(&mut self, now: UnixTimestamp) -> Result<u128, NutPowerError> {
        self.redeem_queues.iter_mut().try_fold(0u128, |acc, queue| {
            acc.checked_add(queue.settle(now)?)
                .ok_or(NutPowerError::ArithmeticOverflow)
        })
    }

    pub fn is_consistent(&self) -> bool {
        self.redeem_queues.iter().all(RedeemQueue::is_consistent)
    }

    /// Nothing locked, pending, or spendable.
    pub fn is_empty(&self) -> bool {
        self.free_np == 0
            && self.locked_nut.iter().all(|locked| *locked == 0)
            && self.redeem_queues.iter().all(RedeemQueue::is_empty)
    }
}
