//! Property-based tests for redemption vesting.
//!
//! Properties tested:
//! 1. Claimable principal never decreases as time passes, and is constant
//!    once fully vested.
//! 2. Repeated reads between writes agree.
//! 3. Redeeming in arbitrary slices pays out exactly the queued principal.

#[cfg(test)]
mod tests {
    use {
        nut_power::{InMemoryTokenLedger, NutPower, NutPowerConfig, Period, TokenLedger},
        proptest::prelude::*,
        solana_clock::Clock,
        solana_pubkey::Pubkey,
    };

    const START: i64 = 1_700_000_000;
    /// Largest principal whose power fits in a u128 at every multiplier.
    const MAX_PRINCIPAL: u128 = u128::MAX / 8;

    fn clock_at(unix_timestamp: i64) -> Clock {
        Clock {
            unix_timestamp,
            ..Clock::default()
        }
    }

    /// Engine where `user` has powered down `burn` NP of `period` at START.
    fn powered_down(locked: u128, period: u8, burn: u128) -> (NutPower, InMemoryTokenLedger, Pubkey, u128) {
        let mint = Pubkey::new_from_array([0xaa; 32]);
        let user = Pubkey::new_from_array([1; 32]);
        let mut token = InMemoryTokenLedger::new(mint, Pubkey::new_from_array([0xcc; 32]));
        token.mint_to(&user, locked).unwrap();
        token.approve(&user, locked);

        let mut engine =
            NutPower::new(NutPowerConfig::new(mint, Pubkey::new_from_array([0xee; 32]))).unwrap();
        engine.power_up(&mut token, &user, locked, period).unwrap();
        let queued = engine
            .power_down(&user, burn, period, &clock_at(START))
            .unwrap();
        (engine, token, user, queued)
    }

    fn duration_of(period: u8) -> i64 {
        i64::from(Period::try_from_index(period).unwrap().lock_weeks()) * 604_800
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 1–2. Monotonic, stable claimable
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn claimable_is_monotonic_in_time(
            locked in 1..=MAX_PRINCIPAL,
            period in 0..=3u8,
            offsets in prop::collection::vec(0..=10_000_000i64, 2..20),
        ) {
            let multiplier = u128::from(Period::try_from_index(period).unwrap().multiplier());
            let (engine, _token, user, queued) = powered_down(locked, period, locked * multiplier);
            prop_assert_eq!(queued, locked);

            let mut offsets = offsets;
            offsets.sort_unstable();
            let mut previous = 0u128;
            for offset in offsets {
                let clock = clock_at(START + offset);
                let claimable = engine.claimable_nut(&user, &clock).unwrap();

                // ── INVARIANT: reads are stable ──
                prop_assert_eq!(engine.claimable_nut(&user, &clock), Ok(claimable));

                // ── INVARIANT: non-decreasing, capped at the queued amount ──
                prop_assert!(claimable >= previous);
                prop_assert!(claimable <= queued);
                if offset >= duration_of(period) {
                    prop_assert_eq!(claimable, queued);
                }
                previous = claimable;
            }
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 3. Sliced redemption pays out exactly the queued principal
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn sliced_redeems_sum_to_queued(
            locked in prop_oneof![1..=1_000_000_000u128, MAX_PRINCIPAL / 2..=MAX_PRINCIPAL],
            period in 0..=3u8,
            steps in prop::collection::vec(1..=200_000i64, 1..40),
        ) {
            let multiplier = u128::from(Period::try_from_index(period).unwrap().multiplier());
            let (mut engine, mut token, user, queued) =
                powered_down(locked, period, locked * multiplier);
            let wallet_before = token.balance_of(&user);

            let mut now = START;
            let mut paid = 0u128;
            for step in steps {
                now += step;
                if let Ok(amount) = engine.redeem(&mut token, &user, &clock_at(now)) {
                    paid += amount;
                }
                prop_assert!(engine.check_invariants().is_ok());
            }
            // Drain whatever is left after full vesting.
            if let Ok(amount) = engine.redeem(&mut token, &user, &clock_at(START + duration_of(period))) {
                paid += amount;
            }

            prop_assert_eq!(paid, queued);
            prop_assert_eq!(token.balance_of(&user), wallet_before + queued);
            prop_assert_eq!(engine.redeem_request_count_of_period(&user, period), Ok(0));
            prop_assert_eq!(engine.total_locked_nut(), 0);
        }
    }
}
