//! The external NUT token ledger.
//!
//! The engine never owns token balances.  It asks the ledger to pull
//! principal into custody on power-up and to push vested principal back out
//! on redeem, and treats a rejected call as `TransferFailed`.

use {
    crate::error::NutPowerError,
    solana_pubkey::Pubkey,
    std::collections::HashMap,
};

/// Token operations consumed by the engine.
///
/// `transfer_from` moves `amount` from `from` into the engine's custody;
/// `transfer` moves `amount` out of custody to `to`.
pub trait TokenLedger {
    /// Address of the token this ledger moves.
    fn mint(&self) -> Pubkey;

    fn transfer_from(&mut self, from: &Pubkey, amount: u128) -> Result<(), NutPowerError>;

    fn transfer(&mut self, to: &Pubkey, amount: u128) -> Result<(), NutPowerError>;

    fn balance_of(&self, owner: &Pubkey) -> u128;
}

/// A fungible-token ledger held in memory.
///
/// Models an ERC-20 style token with allowances granted to a single custody
/// account (the engine).  Used by simulations and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenLedger {
    mint: Pubkey,
    custody: Pubkey,
    balances: HashMap<Pubkey, u128>,
    /// Allowance each owner has granted to `custody`.
    allowances: HashMap<Pubkey, u128>,
    /// When set, every transfer is rejected.
    frozen: bool,
}

impl InMemoryTokenLedger {
    pub fn new(mint: Pubkey, custody: Pubkey) -> Self {
        Self {
            mint,
            custody,
            ..Self::default()
        }
    }

    pub fn custody(&self) -> Pubkey {
        self.custody
    }

    pub fn mint_to(&mut self, owner: &Pubkey, amount: u128) -> Result<(), NutPowerError> {
        let balance = self.balances.entry(*owner).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(NutPowerError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Set the allowance `owner` grants to the custody account.
    pub fn approve(&mut self, owner: &Pubkey, amount: u128) {
        self.allowances.insert(*owner, amount);
    }

    pub fn allowance(&self, owner: &Pubkey) -> u128 {
        self.allowances.get(owner).copied().unwrap_or(0)
    }

    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    /// Sum of all balances, custody included.
    pub fn total_supply(&self) -> Result<u128, NutPowerError> {
        self.balances.values().try_fold(0u128, |acc, balance| {
            acc.checked_add(*balance)
                .ok_or(NutPowerError::ArithmeticOverflow)
        })
    }

    fn move_balance(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), NutPowerError> {
        if self.frozen {
            return Err(NutPowerError::TransferFailed);
        }
        let new_from = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(NutPowerError::InsufficientBalance)?;
        if from == to {
            return Ok(());
        }
        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(NutPowerError::ArithmeticOverflow)?;
        self.balances.insert(*from, new_from);
        self.balances.insert(*to, new_to);
        Ok(())
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn mint(&self) -> Pubkey {
        self.mint
    }

    fn transfer_from(&mut self, from: &Pubkey, amount: u128) -> Result<(), NutPowerError> {
        let allowance = self.allowance(from);
        let remaining = allowance
            .checked_sub(amount)
            .ok_or(NutPowerError::InsufficientAllowance)?;
        let custody = self.custody;
        self.move_balance(from, &custody, amount)?;
        self.allowances.insert(*from, remaining);
        Ok(())
    }

    fn transfer(&mut self, to: &Pubkey, amount: u128) -> Result<(), NutPowerError> {
        let custody = self.custody;
        self.move_balance(&custody, to, amount)
    }

    fn balance_of(&self, owner: &Pubkey) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }
}
