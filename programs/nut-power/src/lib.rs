//! NutPower
//!
//! Tiered, time-locked NUT escrow with amplified voting power ("NP").
//! Users lock NUT for a chosen period and are credited NP scaled by the
//! period's multiplier.  Powering down burns NP and queues a redeem request
//! for the corresponding principal, which vests linearly over the period's
//! duration.  Locked principal can be upgraded to a longer period without
//! leaving custody.
//!
//! ## Periods
//!
//! | Index | Period  | Lock    | NP per NUT |
//! |:-----:|---------|:-------:|:----------:|
//! | 0     | W1      | 1 week  | 1×         |
//! | 1     | W2      | 2 weeks | 2×         |
//! | 2     | W4      | 4 weeks | 4×         |
//! | 3     | W8      | 8 weeks | 8×         |
//!
//! ## Ledgers
//!
//! - **Free power** per user: spendable NP, minted on power-up and upgrade,
//!   burned on power-down.
//! - **Locked principal** per user and period: NUT attributed to a period and
//!   not yet committed to a redemption.
//! - **Redeem queue** per user and period: pending redemptions, each vesting
//!   on its own clock.
//!
//! `total_locked_nut` counts principal until it is actually paid out, so a
//! power-down reclassifies principal without changing it.

#![allow(clippy::arithmetic_side_effects)]

pub mod admin;
pub mod config;
pub mod constants;
pub mod error;
pub mod instruction;
pub mod ledger;
pub mod processor;
pub mod redeem;
pub mod state;
pub mod token;


pub use {
    config::NutPowerConfig,
    constants::Period,
    error::NutPowerError,
    processor::{NutPower, PowerBalance},
    token::{InMemoryTokenLedger, TokenLedger},
};
