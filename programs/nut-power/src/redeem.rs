//! Redeem requests and their per-period queues.
//!
//! A redeem request is created by power-down and releases its principal
//! linearly from `start_time` over `duration` seconds:
//!
//! ```text
//! vested = nut_amount * min(now - start_time, duration) / duration
//! ```
//!
//! Every request vests on its own clock; a queue is just the ordered set of
//! one user's requests in one period.

use {
    crate::error::NutPowerError,
    borsh::{BorshDeserialize, BorshSerialize},
    solana_clock::UnixTimestamp,
};

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RedeemRequest {
    /// Principal released by the power-down that created this request.
    pub nut_amount: u128,

    /// Principal already paid out.  Never exceeds `nut_amount`.
    pub claimed: u128,

    /// Unix timestamp of the power-down.
    pub start_time: UnixTimestamp,

    /// Vesting duration in seconds.
    pub duration: u32,
}

impl RedeemRequest {
    pub fn new(nut_amount: u128, start_time: UnixTimestamp, duration: u32) -> Self {
        Self {
            nut_amount,
            claimed: 0,
            start_time,
            duration,
        }
    }

    /// Timestamp at which the request is fully vested.
    pub fn end_time(&self) -> UnixTimestamp {
        self.start_time.saturating_add(i64::from(self.duration))
    }

    /// Principal vested as of `now`, claimed or not.
    ///
    /// Exact for any `nut_amount`: the product is split on the quotient and
    /// remainder of `nut_amount / duration`, and with `elapsed < duration`
    /// neither part can exceed `nut_amount` or `duration^2`.
    pub fn vested_at(&self, now: UnixTimestamp) -> Result<u128, NutPowerError> {
        // A clock earlier than the request start counts as no time elapsed.
        let elapsed = now.saturating_sub(self.start_time).max(0);
        let elapsed = u128::try_from(elapsed).map_err(|_| NutPowerError::ArithmeticOverflow)?;
        let duration = u128::from(self.duration);
        if elapsed >= duration {
            return Ok(self.nut_amount);
        }

        let whole = (self.nut_amount / duration)
            .checked_mul(elapsed)
            .ok_or(NutPowerError::ArithmeticOverflow)?;
        let partial = (self.nut_amount % duration)
            .checked_mul(elapsed)
            .ok_or(NutPowerError::ArithmeticOverflow)?
            / duration;
        whole
            .checked_add(partial)
            .ok_or(NutPowerError::ArithmeticOverflow)
    }

    /// Vested but not yet claimed principal as of `now`.
    pub fn claimable_at(&self, now: UnixTimestamp) -> Result<u128, NutPowerError> {
        self.vested_at(now)?
            .checked_sub(self.claimed)
            .ok_or(NutPowerError::InvalidStateData)
    }

    /// Principal still held in custody for this request.
    pub fn outstanding(&self) -> u128 {
        self.nut_amount.saturating_sub(self.claimed)
    }

    pub fn is_settled(&self) -> bool {
        self.claimed >= self.nut_amount
    }
}

/// Pending redeem requests of one user in one period, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RedeemQueue {
    requests: Vec<RedeemRequest>,
}

impl RedeemQueue {
    pub fn push(&mut self, request: RedeemRequest) {
        self.requests.push(request);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn requests(&self) -> &[RedeemRequest] {
        &self.requests
    }

    /// Sum of `nut_amount - claimed` over all requests.
    pub fn outstanding(&self) -> Result<u128, NutPowerError> {
        self.requests.iter().try_fold(0u128, |acc, request| {
            acc.checked_add(request.outstanding())
                .ok_or(NutPowerError::ArithmeticOverflow)
        })
    }

    pub fn claimable_at(&self, now: UnixTimestamp) -> Result<u128, NutPowerError> {
        self.requests.iter().try_fold(0u128, |acc, request| {
            acc.checked_add(request.claimable_at(now)?)
                .ok_or(NutPowerError::ArithmeticOverflow)
        })
    }

    /// Mark everything vested as of `now` as claimed, drop fully settled
    /// requests, and return the principal released.
    pub fn settle(&mut self, now: UnixTimestamp) -> Result<u128, NutPowerError> {
        let mut released = 0u128;
        for request in self.requests.iter_mut() {
            let vested = request.vested_at(now)?;
            let amount = vested
                .checked_sub(request.claimed)
                .ok_or(NutPowerError::InvalidStateData)?;
            released = released
                .checked_add(amount)
                .ok_or(NutPowerError::ArithmeticOverflow)?;
            request.claimed = vested;
        }
        self.requests.retain(|request| !request.is_settled());
        Ok(released)
    }

    /// `claimed <= nut_amount` for every request.
    pub fn is_consistent(&self) -> bool {
        self.requests
            .iter()
            .all(|request| request.claimed <= request.nut_amount)
    }
}
