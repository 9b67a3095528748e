//! The NutPower accounting engine.
//!
//! Every write operation stages its full effect on copies of the touched
//! ledgers and aggregates, performs the external token call (if any), and
//! only then commits.  A rejected operation therefore leaves the engine
//! exactly as it was.

use {
    crate::{
        admin::{require_admin, require_whitelisted},
        config::NutPowerConfig,
        constants::Period,
        error::NutPowerError,
        instruction::NutPowerInstruction,
        ledger::{power_for, UserLedger},
        redeem::RedeemRequest,
        state::{NutPowerState, Totals},
        token::TokenLedger,
    },
    log::*,
    solana_clock::Clock,
    solana_pubkey::Pubkey,
};

/// Power balance reported by [`NutPower::balance_of`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerBalance {
    pub free: u128,
}

/// Effect of an operation on one user, not yet applied.
struct StagedUpdate {
    user: Pubkey,
    ledger: UserLedger,
    total_locked_nut: u128,
    total_issued_np: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NutPower {
    state: NutPowerState,
}

impl NutPower {
    pub fn new(config: NutPowerConfig) -> Result<Self, NutPowerError> {
        config.validate()?;
        info!(
            "NutPower: initialised for token {} with owner {}",
            config.nut, config.owner
        );
        Ok(Self {
            state: NutPowerState::new(config),
        })
    }

    /// Resume from a previously persisted state.
    pub fn from_state(state: NutPowerState) -> Result<Self, NutPowerError> {
        state.config.validate()?;
        state.verify()?;
        Ok(Self { state })
    }

    pub fn restore(data: &[u8]) -> Result<Self, NutPowerError> {
        let state = NutPowerState::deserialize(data).map_err(|err| {
            warn!("NutPower: failed to decode state: {err}");
            NutPowerError::InvalidStateData
        })?;
        Self::from_state(state)
    }

    pub fn snapshot(&self) -> Result<Vec<u8>, NutPowerError> {
        self.state
            .to_bytes()
            .map_err(|_| NutPowerError::InvalidStateData)
    }

    pub fn state(&self) -> &NutPowerState {
        &self.state
    }

    pub fn into_state(self) -> NutPowerState {
        self.state
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &NutPowerConfig {
        &self.state.config
    }

    pub fn nut(&self) -> Pubkey {
        self.state.config.nut
    }

    pub fn owner(&self) -> Pubkey {
        self.state.config.owner
    }

    pub fn is_whitelisted(&self, account: &Pubkey) -> bool {
        self.state.whitelist.contains(account)
    }

    pub fn balance_of(&self, user: &Pubkey) -> PowerBalance {
        PowerBalance {
            free: self.user_ledger(user).map_or(0, UserLedger::free_np),
        }
    }

    pub fn total_locked_nut(&self) -> u128 {
        self.state.total_locked_nut
    }

    pub fn total_issued_np(&self) -> u128 {
        self.state.total_issued_np
    }

    /// Principal of `period` still pending redemption for `user`.
    pub fn locked_nut_of_period(&self, user: &Pubkey, period: u8) -> Result<u128, NutPowerError> {
        let period = Period::try_from_index(period)?;
        match self.user_ledger(user) {
            Some(ledger) => ledger.redeem_queue(period).outstanding(),
            None => Ok(0),
        }
    }

    pub fn redeem_request_count_of_period(
        &self,
        user: &Pubkey,
        period: u8,
    ) -> Result<u32, NutPowerError> {
        let period = Period::try_from_index(period)?;
        let count = self
            .user_ledger(user)
            .map_or(0, |ledger| ledger.redeem_queue(period).len());
        u32::try_from(count).map_err(|_| NutPowerError::ArithmeticOverflow)
    }

    /// Principal of `period` that is locked and not yet powered down.
    pub fn locked_principal_of_period(
        &self,
        user: &Pubkey,
        period: u8,
    ) -> Result<u128, NutPowerError> {
        let period = Period::try_from_index(period)?;
        Ok(self
            .user_ledger(user)
            .map_or(0, |ledger| ledger.locked_nut(period)))
    }

    pub fn redeem_requests_of_period(
        &self,
        user: &Pubkey,
        period: u8,
    ) -> Result<&[RedeemRequest], NutPowerError> {
        let period = Period::try_from_index(period)?;
        Ok(self
            .user_ledger(user)
            .map_or(&[][..], |ledger| ledger.redeem_queue(period).requests()))
    }

    /// Vested but unclaimed principal across all of `user`'s redeem requests.
    pub fn claimable_nut(&self, user: &Pubkey, clock: &Clock) -> Result<u128, NutPowerError> {
        match self.user_ledger(user) {
            Some(ledger) => ledger.claimable_at(clock.unix_timestamp),
            None => Ok(0),
        }
    }

    /// Recompute both aggregates from the per-user ledgers and compare.
    pub fn check_invariants(&self) -> Result<Totals, NutPowerError> {
        self.state.verify()?;
        self.state.recompute_totals()
    }

    // -----------------------------------------------------------------------
    // Write surface
    // -----------------------------------------------------------------------

    /// Lock `amount` NUT from `caller` in `period`, minting
    /// `amount * multiplier` NP.
    pub fn power_up<T: TokenLedger + ?Sized>(
        &mut self,
        token: &mut T,
        caller: &Pubkey,
        amount: u128,
        period: u8,
    ) -> Result<u128, NutPowerError> {
        let period = Period::try_from_index(period)?;
        self.deposit(token, caller, caller, amount, period)
    }

    /// Burn `amount` NP and queue `amount / multiplier` NUT of `period` for
    /// linear redemption.  Returns the principal queued.
    ///
    /// Power that does not map to a whole unit of principal is burned with
    /// the rest.
    pub fn power_down(
        &mut self,
        caller: &Pubkey,
        amount: u128,
        period: u8,
        clock: &Clock,
    ) -> Result<u128, NutPowerError> {
        let period = Period::try_from_index(period)?;
        if amount == 0 {
            return Err(NutPowerError::ZeroAmount);
        }

        let mut ledger = self.user_ledger(caller).cloned().unwrap_or_default();
        if amount > ledger.free_np() {
            debug!(
                "PowerDown: {caller} requested {amount} NP with {} free",
                ledger.free_np()
            );
            return Err(NutPowerError::InsufficientFreePower);
        }

        let nut_amount = amount
            .checked_div(u128::from(period.multiplier()))
            .ok_or(NutPowerError::ArithmeticOverflow)?;
        if nut_amount == 0 {
            return Err(NutPowerError::ZeroRedeemAmount);
        }

        let duration = self.state.config.period_duration(period)?;
        let duration = u32::try_from(duration).map_err(|_| NutPowerError::InvalidConfig)?;

        ledger.debit_power(amount)?;
        ledger.release_principal(period, nut_amount)?;
        ledger.enqueue_redeem(
            period,
            RedeemRequest::new(nut_amount, clock.unix_timestamp, duration),
        );

        let total_issued_np = self
            .state
            .total_issued_np
            .checked_sub(amount)
            .ok_or(NutPowerError::InvalidStateData)?;

        self.commit(StagedUpdate {
            user: *caller,
            ledger,
            total_locked_nut: self.state.total_locked_nut,
            total_issued_np,
        });

        info!(
            "PowerDown: {caller} burned {amount} NP, {nut_amount} NUT of {period:?} vesting over {duration}s"
        );
        Ok(nut_amount)
    }

    /// Move `amount` locked NUT from `src` to the strictly longer `dest`,
    /// minting the NP difference.  Returns the NP minted.
    pub fn upgrade(
        &mut self,
        caller: &Pubkey,
        amount: u128,
        src: u8,
        dest: u8,
    ) -> Result<u128, NutPowerError> {
        let src = Period::try_from_index(src).map_err(|_| NutPowerError::InvalidPeriod)?;
        let dest = Period::try_from_index(dest).map_err(|_| NutPowerError::InvalidPeriod)?;
        if dest <= src {
            return Err(NutPowerError::InvalidPeriod);
        }

        let mut ledger = self.user_ledger(caller).cloned().unwrap_or_default();
        if amount == 0 || amount > ledger.locked_nut(src) {
            return Err(NutPowerError::InvalidUpgradeAmount);
        }

        let multiplier_delta = dest
            .multiplier()
            .checked_sub(src.multiplier())
            .ok_or(NutPowerError::InvalidPeriod)?;
        let minted = power_for(amount, multiplier_delta)?;

        ledger.release_principal(src, amount)?;
        ledger.lock_principal(dest, amount)?;
        ledger.credit_power(minted)?;

        let total_issued_np = self
            .state
            .total_issued_np
            .checked_add(minted)
            .ok_or(NutPowerError::ArithmeticOverflow)?;

        self.commit(StagedUpdate {
            user: *caller,
            ledger,
            total_locked_nut: self.state.total_locked_nut,
            total_issued_np,
        });

        info!("Upgrade: {caller} moved {amount} NUT from {src:?} to {dest:?}, minted {minted} NP");
        Ok(minted)
    }

    /// Pay out everything vested across `caller`'s redeem requests and drop
    /// the requests that are fully paid.  Returns the NUT transferred.
    pub fn redeem<T: TokenLedger + ?Sized>(
        &mut self,
        token: &mut T,
        caller: &Pubkey,
        clock: &Clock,
    ) -> Result<u128, NutPowerError> {
        self.check_token(token)?;

        let mut ledger = self
            .user_ledger(caller)
            .cloned()
            .ok_or(NutPowerError::NothingToClaim)?;
        let released = ledger.settle_redeems(clock.unix_timestamp)?;
        if released == 0 {
            return Err(NutPowerError::NothingToClaim);
        }

        let total_locked_nut = self
            .state
            .total_locked_nut
            .checked_sub(released)
            .ok_or(NutPowerError::InvalidStateData)?;

        token.transfer(caller, released).map_err(|err| {
            warn!("Redeem: transfer of {released} NUT to {caller} rejected: {err}");
            NutPowerError::TransferFailed
        })?;

        self.commit(StagedUpdate {
            user: *caller,
            ledger,
            total_locked_nut,
            total_issued_np: self.state.total_issued_np,
        });

        info!("Redeem: {released} NUT returned to {caller}");
        Ok(released)
    }

    /// Allow-listed direct lock: `caller` pays `amount` NUT and `recipient`
    /// receives the lock and the NP.
    pub fn lock<T: TokenLedger + ?Sized>(
        &mut self,
        token: &mut T,
        caller: &Pubkey,
        recipient: &Pubkey,
        amount: u128,
        period: u8,
    ) -> Result<u128, NutPowerError> {
        require_whitelisted(&self.state.whitelist, caller)?;
        let period = Period::try_from_index(period)?;
        self.deposit(token, caller, recipient, amount, period)
    }

    // -----------------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------------

    pub fn admin_set_nut(&mut self, caller: &Pubkey, nut: Pubkey) -> Result<(), NutPowerError> {
        require_admin(&self.state.config.owner, caller)?;
        info!("AdminSetNut: {} -> {nut}", self.state.config.nut);
        self.state.config.nut = nut;
        Ok(())
    }

    pub fn admin_set_whitelist(
        &mut self,
        caller: &Pubkey,
        account: Pubkey,
        allowed: bool,
    ) -> Result<(), NutPowerError> {
        require_admin(&self.state.config.owner, caller)?;
        if allowed {
            self.state.whitelist.insert(account);
        } else {
            self.state.whitelist.remove(&account);
        }
        info!("AdminSetWhitelist: {account} allowed={allowed}");
        Ok(())
    }

    pub fn admin_transfer_ownership(
        &mut self,
        caller: &Pubkey,
        new_owner: Pubkey,
    ) -> Result<(), NutPowerError> {
        require_admin(&self.state.config.owner, caller)?;
        if new_owner == Pubkey::default() {
            return Err(NutPowerError::InvalidConfig);
        }
        info!("AdminTransferOwnership: {caller} -> {new_owner}");
        self.state.config.owner = new_owner;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Instruction dispatch
    // -----------------------------------------------------------------------

    /// Decode `data` and apply it on behalf of `caller`.
    pub fn process_instruction<T: TokenLedger + ?Sized>(
        &mut self,
        token: &mut T,
        caller: &Pubkey,
        clock: &Clock,
        data: &[u8],
    ) -> Result<(), NutPowerError> {
        let instruction = NutPowerInstruction::from_bytes(data)?;

        trace!("nut_power process_instruction: {instruction:?}");

        match instruction {
            NutPowerInstruction::PowerUp { amount, period } => {
                self.power_up(token, caller, amount, period).map(drop)
            }
            NutPowerInstruction::PowerDown { amount, period } => {
                self.power_down(caller, amount, period, clock).map(drop)
            }
            NutPowerInstruction::Upgrade { amount, src, dest } => {
                self.upgrade(caller, amount, src, dest).map(drop)
            }
            NutPowerInstruction::Redeem => self.redeem(token, caller, clock).map(drop),
            NutPowerInstruction::AdminSetNut { nut } => self.admin_set_nut(caller, nut),
            NutPowerInstruction::AdminSetWhitelist { account, allowed } => {
                self.admin_set_whitelist(caller, account, allowed)
            }
            NutPowerInstruction::AdminTransferOwnership { new_owner } => {
                self.admin_transfer_ownership(caller, new_owner)
            }
            NutPowerInstruction::Lock {
                recipient,
                amount,
                period,
            } => self
                .lock(token, caller, &recipient, amount, period)
                .map(drop),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn user_ledger(&self, user: &Pubkey) -> Option<&UserLedger> {
        self.state.users.get(user)
    }

    fn check_token<T: TokenLedger + ?Sized>(&self, token: &T) -> Result<(), NutPowerError> {
        if token.mint() != self.state.config.nut {
            warn!(
                "token ledger {} does not match configured NUT {}",
                token.mint(),
                self.state.config.nut
            );
            return Err(NutPowerError::TokenMismatch);
        }
        Ok(())
    }

    /// Shared by power-up and lock: `payer` funds, `beneficiary` is credited.
    fn deposit<T: TokenLedger + ?Sized>(
        &mut self,
        token: &mut T,
        payer: &Pubkey,
        beneficiary: &Pubkey,
        amount: u128,
        period: Period,
    ) -> Result<u128, NutPowerError> {
        if amount == 0 {
            return Err(NutPowerError::ZeroAmount);
        }
        self.check_token(token)?;

        let minted = power_for(amount, period.multiplier())?;
        let mut ledger = self.user_ledger(beneficiary).cloned().unwrap_or_default();
        ledger.lock_principal(period, amount)?;
        ledger.credit_power(minted)?;

        let total_locked_nut = self
            .state
            .total_locked_nut
            .checked_add(amount)
            .ok_or(NutPowerError::ArithmeticOverflow)?;
        let total_issued_np = self
            .state
            .total_issued_np
            .checked_add(minted)
            .ok_or(NutPowerError::ArithmeticOverflow)?;

        token.transfer_from(payer, amount).map_err(|err| {
            warn!("PowerUp: transfer of {amount} NUT from {payer} rejected: {err}");
            NutPowerError::TransferFailed
        })?;

        self.commit(StagedUpdate {
            user: *beneficiary,
            ledger,
            total_locked_nut,
            total_issued_np,
        });

        info!(
            "PowerUp: {amount} NUT locked for {period:?} by {payer} for {beneficiary}, minted {minted} NP"
        );
        Ok(minted)
    }

    fn commit(&mut self, update: StagedUpdate) {
        let StagedUpdate {
            user,
            ledger,
            total_locked_nut,
            total_issued_np,
        } = update;
        if ledger.is_empty() {
            self.state.users.remove(&user);
        } else {
            self.state.users.insert(user, ledger);
        }
        self.state.total_locked_nut = total_locked_nut;
        self.state.total_issued_np = total_issued_np;
    }
}
