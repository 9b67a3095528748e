//! NutPower End-to-End Test Suite
//!
//! Drives a NutPower engine through complete user journeys (power-up,
//! upgrade, power-down, vesting, redemption, administration) over an
//! in-memory NUT ledger and a simulated clock.  Every write goes through the
//! bincode instruction path.
//!
//! Each test file can be run independently:
//!
//! ```bash
//! cargo test -p nut-power-e2e-tests --test nut_power_lifecycle -- --nocapture
//! cargo test -p nut-power-e2e-tests --test admin_lifecycle -- --nocapture
//! ```

pub mod helpers;
