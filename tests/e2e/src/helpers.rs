//! Shared test utilities for NutPower end-to-end tests.
//!
//! Provides a simulated deployment that bundles:
//! - A NutPower engine owned by a dedicated admin key
//! - An in-memory NUT ledger with funded, approved user wallets
//! - A wall clock that tests advance explicitly
//! - Instruction submission through the bincode wire format

use {
    log::*,
    nut_power::{
        instruction::NutPowerInstruction, InMemoryTokenLedger, NutPower, NutPowerConfig,
        NutPowerError, TokenLedger,
    },
    solana_clock::Clock,
    solana_pubkey::Pubkey,
};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Seconds per lock week.
pub const WEEK: i64 = 604_800;

/// Genesis wall-clock time of every simulated deployment.
pub const GENESIS_TIME: i64 = 1_700_000_000;

/// One whole NUT (18 decimals).
pub const NUT: u128 = 1_000_000_000_000_000_000;

/// Wallet balance (and allowance) each simulated user starts with.
pub const INITIAL_WALLET: u128 = 10_000 * NUT;

// ─────────────────────────────────────────────────────────────────────────────
// Simulated deployment
// ─────────────────────────────────────────────────────────────────────────────

pub struct SimDeployment {
    pub engine: NutPower,
    pub token: InMemoryTokenLedger,
    pub owner: Pubkey,
    pub users: Vec<Pubkey>,
    pub now: i64,
}

impl SimDeployment {
    /// Deploy with `n_users` funded wallets.
    pub fn new(n_users: usize) -> Self {
        let mint = Pubkey::new_from_array([0xaa; 32]);
        let custody = Pubkey::new_from_array([0xcc; 32]);
        let owner = Pubkey::new_from_array([0xee; 32]);

        let engine = NutPower::new(NutPowerConfig::new(mint, owner))
            .expect("default config is valid");
        let mut token = InMemoryTokenLedger::new(mint, custody);
        let users = make_pubkeys(n_users);
        for user in users.iter().chain(std::iter::once(&owner)) {
            token.mint_to(user, INITIAL_WALLET).expect("mint");
            token.approve(user, INITIAL_WALLET);
        }

        info!("deployed NutPower with {n_users} users");
        Self {
            engine,
            token,
            owner,
            users,
            now: GENESIS_TIME,
        }
    }

    pub fn clock(&self) -> Clock {
        Clock {
            unix_timestamp: self.now,
            ..Clock::default()
        }
    }

    pub fn advance_seconds(&mut self, seconds: i64) {
        self.now += seconds;
    }

    pub fn advance_weeks(&mut self, weeks: i64) {
        self.advance_seconds(weeks * WEEK);
    }

    /// Submit an instruction signed by `caller`.
    pub fn submit(
        &mut self,
        caller: &Pubkey,
        instruction: NutPowerInstruction,
    ) -> Result<(), NutPowerError> {
        let data = instruction.to_bytes()?;
        let clock = self.clock();
        let result = self
            .engine
            .process_instruction(&mut self.token, caller, &clock, &data);
        if let Err(err) = &result {
            debug!("{instruction:?} by {caller} rejected: {err}");
        }
        result
    }

    pub fn power_up(&mut self, caller: &Pubkey, amount: u128, period: u8) -> Result<(), NutPowerError> {
        self.submit(caller, NutPowerInstruction::PowerUp { amount, period })
    }

    pub fn power_down(&mut self, caller: &Pubkey, amount: u128, period: u8) -> Result<(), NutPowerError> {
        self.submit(caller, NutPowerInstruction::PowerDown { amount, period })
    }

    pub fn upgrade(&mut self, caller: &Pubkey, amount: u128, src: u8, dest: u8) -> Result<(), NutPowerError> {
        self.submit(caller, NutPowerInstruction::Upgrade { amount, src, dest })
    }

    /// Redeem and report how much NUT reached the caller's wallet.
    pub fn redeem(&mut self, caller: &Pubkey) -> Result<u128, NutPowerError> {
        let before = self.token.balance_of(caller);
        self.submit(caller, NutPowerInstruction::Redeem)?;
        Ok(self.token.balance_of(caller) - before)
    }

    pub fn claimable(&self, user: &Pubkey) -> u128 {
        self.engine
            .claimable_nut(user, &self.clock())
            .expect("claimable")
    }

    pub fn free_power(&self, user: &Pubkey) -> u128 {
        self.engine.balance_of(user).free
    }

    pub fn wallet(&self, user: &Pubkey) -> u128 {
        self.token.balance_of(user)
    }

    /// Assert the global ledger invariants and custody conservation.
    pub fn assert_consistent(&self) {
        let totals = self.engine.check_invariants().expect("aggregates drifted");
        assert_eq!(totals.locked_nut, self.engine.total_locked_nut());
        assert_eq!(totals.issued_np, self.engine.total_issued_np());
        assert_eq!(
            self.token.balance_of(&self.token.custody()),
            self.engine.total_locked_nut(),
            "custody must hold exactly the locked NUT"
        );
    }

    pub fn print_summary(&self) {
        println!("\n── Deployment summary @ t={} ──", self.now);
        println!("  total locked NUT: {}", self.engine.total_locked_nut());
        println!("  total issued NP:  {}", self.engine.total_issued_np());
        for user in &self.users {
            println!(
                "  {user}: free={} claimable={} wallet={}",
                self.free_power(user),
                self.claimable(user),
                self.wallet(user)
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Deterministic, distinct user keys.
pub fn make_pubkeys(n: usize) -> Vec<Pubkey> {
    (0..n)
        .map(|i| {
            let mut bytes = [0u8; 32];
            bytes[..8].copy_from_slice(&(i as u64 + 1).to_le_bytes());
            Pubkey::new_from_array(bytes)
        })
        .collect()
}

pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
