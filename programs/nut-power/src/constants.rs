//! Lock period definitions and constants.
//!
//! Defines the closed set of lock periods together with their lock length
//! (in weeks) and NP multiplier.  Multipliers strictly increase with the
//! period index, which is what makes "upgrade" a well-defined direction.

use {
    crate::error::NutPowerError,
    num_derive::FromPrimitive,
    num_traits::FromPrimitive,
};

/// Seconds per week, used for redemption vesting durations.
pub const SECONDS_PER_WEEK: i64 = 604_800;

/// Number of configured lock periods.
pub const PERIOD_COUNT: usize = 4;

// ---------------------------------------------------------------------------
// Period indices (wire values)
// ---------------------------------------------------------------------------

pub const PERIOD_W1: u8 = 0;
pub const PERIOD_W2: u8 = 1;
pub const PERIOD_W4: u8 = 2;
pub const PERIOD_W8: u8 = 3;

// ---------------------------------------------------------------------------
// Lock lengths (in weeks)
// ---------------------------------------------------------------------------

pub const LOCK_WEEKS_W1: u32 = 1;
pub const LOCK_WEEKS_W2: u32 = 2;
pub const LOCK_WEEKS_W4: u32 = 4;
pub const LOCK_WEEKS_W8: u32 = 8;

// ---------------------------------------------------------------------------
// NP multipliers (NP minted per unit of locked NUT)
// ---------------------------------------------------------------------------

pub const MULTIPLIER_W1: u64 = 1;
pub const MULTIPLIER_W2: u64 = 2;
pub const MULTIPLIER_W4: u64 = 4;
pub const MULTIPLIER_W8: u64 = 8;

/// A configured lock period.
///
/// The discriminant is the wire index used by instructions and read calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive)]
#[repr(u8)]
pub enum Period {
    W1 = PERIOD_W1,
    W2 = PERIOD_W2,
    W4 = PERIOD_W4,
    W8 = PERIOD_W8,
}

impl Period {
    /// All periods, shortest first.
    pub const ALL: [Period; PERIOD_COUNT] = [Period::W1, Period::W2, Period::W4, Period::W8];

    /// Decode a wire index, failing with `InvalidTier` outside the table.
    pub fn try_from_index(index: u8) -> Result<Self, NutPowerError> {
        Self::from_u8(index).ok_or(NutPowerError::InvalidTier)
    }

    /// Wire index of this period.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Position of this period in per-period ledger arrays.
    pub(crate) fn slot(self) -> usize {
        self as usize
    }

    pub fn lock_weeks(self) -> u32 {
        match self {
            Period::W1 => LOCK_WEEKS_W1,
            Period::W2 => LOCK_WEEKS_W2,
            Period::W4 => LOCK_WEEKS_W4,
            Period::W8 => LOCK_WEEKS_W8,
        }
    }

    pub fn multiplier(self) -> u64 {
        match self {
            Period::W1 => MULTIPLIER_W1,
            Period::W2 => MULTIPLIER_W2,
            Period::W4 => MULTIPLIER_W4,
            Period::W8 => MULTIPLIER_W8,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns the NP multiplier for the given period index.
pub fn multiplier_for_period(period: u8) -> Option<u64> {
    Period::from_u8(period).map(Period::multiplier)
}

/// Returns the lock length in weeks for the given period index.
pub fn lock_weeks_for_period(period: u8) -> Option<u32> {
    Period::from_u8(period).map(Period::lock_weeks)
}

/// Returns `true` if `period` is a configured period index.
pub fn is_valid_period(period: u8) -> bool {
    matches!(period, PERIOD_W1 | PERIOD_W2 | PERIOD_W4 | PERIOD_W8)
}
