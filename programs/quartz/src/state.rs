use anchor_lang::prelude::*;
use anchor_lang::Discriminator;

use crate::{
    config::{ANCHOR_DISCRIMINATOR, PUBKEY_SIZE, U8_SIZE},
    errors::QuartzError,
};

/// User vault (PDA, seeds = [b"vault", owner]). Authority of the user's Drift
/// and marginfi accounts and of every transient token account.
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Vault {
    /// Wallet that controls the vault
    pub owner: Pubkey,
    /// Canonical bump of the vault PDA
    pub bump: u8,
    /// Max USDC base units per card spend
    pub spend_limit_per_transaction: u64,
    /// USDC base units allowed per timeframe
    pub spend_limit_per_timeframe: u64,
    pub remaining_spend_limit_per_timeframe: u64,
    /// Slot at which the timeframe allowance is refilled
    pub next_spend_limit_per_timeframe_reset_slot: u64,
    /// Timeframe length in slots
    pub extend_spend_limit_per_timeframe_reset_slot_amount: u64,
}

impl Vault {
    pub const LEN: usize = 8    // discriminator
        + 32 + 1                // owner, bump
        + 8 + 8 + 8             // per transaction, per timeframe, remaining
        + 8 + 8; // next reset slot, extend amount

    pub fn new(owner: Pubkey, bump: u8, limits: SpendLimits, current_slot: u64) -> Result<Self> {
        let mut vault = Self {
            owner,
            bump,
            ..Self::default()
        };
        vault.set_spend_limits(limits, current_slot)?;
        Ok(vault)
    }

    /// Replaces the limits and restarts the timeframe at `current_slot`.
    /// Whatever was already spent in the running timeframe stays spent. A
    /// timeframe that has already ended carries nothing over.
    pub fn adjust_spend_limits(&mut self, limits: SpendLimits, current_slot: u64) -> Result<()> {
        let used = if current_slot >= self.next_spend_limit_per_timeframe_reset_slot {
            0
        } else {
            self.spend_limit_per_timeframe
                .saturating_sub(self.remaining_spend_limit_per_timeframe)
        };
        self.set_spend_limits(limits, current_slot)?;
        self.remaining_spend_limit_per_timeframe =
            limits.spend_limit_per_timeframe.saturating_sub(used);
        Ok(())
    }

    fn set_spend_limits(&mut self, limits: SpendLimits, current_slot: u64) -> Result<()> {
        self.next_spend_limit_per_timeframe_reset_slot = current_slot
            .checked_add(limits.extend_spend_limit_per_timeframe_reset_slot_amount)
            .ok_or(QuartzError::MathOverflow)?;
        self.spend_limit_per_transaction = limits.spend_limit_per_transaction;
        self.spend_limit_per_timeframe = limits.spend_limit_per_timeframe;
        self.remaining_spend_limit_per_timeframe = limits.spend_limit_per_timeframe;
        self.extend_spend_limit_per_timeframe_reset_slot_amount =
            limits.extend_spend_limit_per_timeframe_reset_slot_amount;
        Ok(())
    }

    /// Deducts `amount` from the timeframe allowance, rolling the timeframe
    /// forward first if `current_slot` has passed the reset slot. The vault
    /// is left untouched on error.
    pub fn consume_spend_limit(&mut self, amount: u64, current_slot: u64) -> Result<()> {
        require!(
            amount <= self.spend_limit_per_transaction,
            QuartzError::InsufficientTransactionSpendLimit
        );

        let extend = self.extend_spend_limit_per_timeframe_reset_slot_amount;
        require!(extend > 0, QuartzError::InsufficientTimeframeSpendLimit);

        let mut next_reset = self.next_spend_limit_per_timeframe_reset_slot;
        let mut remaining = self.remaining_spend_limit_per_timeframe;

        if current_slot >= next_reset {
            let elapsed_timeframes = (current_slot - next_reset) / extend;
            let slots_to_add = elapsed_timeframes
                .checked_add(1)
                .and_then(|timeframes| timeframes.checked_mul(extend))
                .ok_or(QuartzError::MathOverflow)?;
            next_reset = next_reset
                .checked_add(slots_to_add)
                .ok_or(QuartzError::MathOverflow)?;
            remaining = self.spend_limit_per_timeframe;
        }

        remaining = remaining
            .checked_sub(amount)
            .ok_or(QuartzError::InsufficientTimeframeSpendLimit)?;

        self.next_spend_limit_per_timeframe_reset_slot = next_reset;
        self.remaining_spend_limit_per_timeframe = remaining;
        Ok(())
    }
}

/// Limits supplied by the owner on init, upgrade and adjust.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpendLimits {
    pub spend_limit_per_transaction: u64,
    pub spend_limit_per_timeframe: u64,
    pub extend_spend_limit_per_timeframe_reset_slot_amount: u64,
}

/// Vault layout written before spend limits existed: discriminator, owner, bump.
#[derive(Debug, PartialEq, Eq)]
pub struct LegacyVault {
    pub owner: Pubkey,
    pub bump: u8,
}

impl LegacyVault {
    pub const LEN: usize = ANCHOR_DISCRIMINATOR + PUBKEY_SIZE + U8_SIZE;

    /// Parses a vault that still needs upgrading. Already upgraded vaults
    /// are rejected with `VaultAlreadyUpgraded`.
    pub fn try_from_bytes(data: &[u8]) -> Result<Self> {
        require!(data.len() < Vault::LEN, QuartzError::VaultAlreadyUpgraded);
        require!(data.len() >= Self::LEN, QuartzError::InvalidVaultAccount);
        require!(
            data[..ANCHOR_DISCRIMINATOR] == Vault::DISCRIMINATOR[..],
            QuartzError::InvalidVaultAccount
        );

        let owner_end = ANCHOR_DISCRIMINATOR + PUBKEY_SIZE;
        let owner = Pubkey::try_from(&data[ANCHOR_DISCRIMINATOR..owner_end])
            .map_err(|_| QuartzError::InvalidVaultAccount)?;

        Ok(Self {
            owner,
            bump: data[owner_end],
        })
    }
}

/// Carries the amount repaid by `start_collateral_repay` to
/// `end_collateral_repay` (PDA, seeds = [b"collateral_repay_ledger", owner]).
#[account]
#[derive(Default)]
pub struct CollateralRepayLedger {
    pub deposit: u64,
}

impl CollateralRepayLedger {
    pub const LEN: usize = 8 + 8;
}

/// A Drift spot market the vault can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftMarket {
    pub market_index: u16,
    pub mint: Pubkey,
    pub pyth_feed: &'static str,
    pub pyth_max_age_seconds: u64,
    pub base_units_per_token: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(per_tx: u64, per_timeframe: u64, extend: u64) -> SpendLimits {
        SpendLimits {
            spend_limit_per_transaction: per_tx,
            spend_limit_per_timeframe: per_timeframe,
            extend_spend_limit_per_timeframe_reset_slot_amount: extend,
        }
    }

    fn vault(per_tx: u64, per_timeframe: u64, extend: u64, slot: u64) -> Vault {
        Vault::new(Pubkey::new_unique(), 254, limits(per_tx, per_timeframe, extend), slot).unwrap()
    }

    #[test]
    fn new_vault_starts_full_timeframe() {
        let v = vault(1_000, 5_000, 100, 40);
        assert_eq!(v.remaining_spend_limit_per_timeframe, 5_000);
        assert_eq!(v.next_spend_limit_per_timeframe_reset_slot, 140);
        assert_eq!(v.extend_spend_limit_per_timeframe_reset_slot_amount, 100);
        assert_eq!(v.bump, 254);
    }

    #[test]
    fn len_matches_serialized_size() {
        let v = vault(1, 2, 3, 4);
        let mut data = Vec::new();
        v.try_serialize(&mut data).unwrap();
        assert_eq!(data.len(), Vault::LEN);

        let mut ledger_data = Vec::new();
        CollateralRepayLedger::default().try_serialize(&mut ledger_data).unwrap();
        assert_eq!(ledger_data.len(), CollateralRepayLedger::LEN);
    }

    #[test]
    fn consume_within_timeframe_decrements_remaining() {
        let mut v = vault(1_000, 5_000, 100, 0);
        v.consume_spend_limit(1_000, 10).unwrap();
        v.consume_spend_limit(400, 99).unwrap();
        assert_eq!(v.remaining_spend_limit_per_timeframe, 3_600);
        assert_eq!(v.next_spend_limit_per_timeframe_reset_slot, 100);
    }

    #[test]
    fn consume_above_transaction_limit_fails_and_leaves_vault_untouched() {
        let mut v = vault(1_000, 5_000, 100, 0);
        let before = v.clone();
        let err = v.consume_spend_limit(1_001, 10).unwrap_err();
        assert_eq!(err, QuartzError::InsufficientTransactionSpendLimit.into());
        assert_eq!(v, before);
    }

    #[test]
    fn consume_above_timeframe_remaining_fails() {
        let mut v = vault(1_000, 1_500, 100, 0);
        v.consume_spend_limit(1_000, 1).unwrap();
        let before = v.clone();
        let err = v.consume_spend_limit(600, 2).unwrap_err();
        assert_eq!(err, QuartzError::InsufficientTimeframeSpendLimit.into());
        assert_eq!(v, before);
    }

    #[test]
    fn zero_timeframe_rejects_every_spend() {
        let mut v = vault(1_000, 5_000, 0, 0);
        let err = v.consume_spend_limit(1, 0).unwrap_err();
        assert_eq!(err, QuartzError::InsufficientTimeframeSpendLimit.into());
    }

    #[test]
    fn reset_slot_refills_allowance() {
        let mut v = vault(1_000, 1_000, 100, 0);
        v.consume_spend_limit(1_000, 5).unwrap();
        assert_eq!(v.remaining_spend_limit_per_timeframe, 0);

        v.consume_spend_limit(300, 100).unwrap();
        assert_eq!(v.remaining_spend_limit_per_timeframe, 700);
        assert_eq!(v.next_spend_limit_per_timeframe_reset_slot, 200);
    }

    #[test]
    fn reset_skips_every_elapsed_timeframe() {
        let mut v = vault(1_000, 1_000, 100, 0);
        // 3.5 timeframes past the reset slot of 100
        v.consume_spend_limit(10, 450).unwrap();
        assert_eq!(v.next_spend_limit_per_timeframe_reset_slot, 500);
        assert!(v.next_spend_limit_per_timeframe_reset_slot > 450);
        assert_eq!(v.remaining_spend_limit_per_timeframe, 990);
    }

    #[test]
    fn reset_overflow_is_reported() {
        let mut v = vault(10, 10, u64::MAX - 1, 1);
        let err = v.consume_spend_limit(1, u64::MAX).unwrap_err();
        assert_eq!(err, QuartzError::MathOverflow.into());
    }

    #[test]
    fn adjust_keeps_amount_already_spent() {
        let mut v = vault(1_000, 5_000, 100, 0);
        v.consume_spend_limit(1_000, 10).unwrap();

        v.adjust_spend_limits(limits(2_000, 8_000, 50), 20).unwrap();
        assert_eq!(v.spend_limit_per_transaction, 2_000);
        assert_eq!(v.spend_limit_per_timeframe, 8_000);
        assert_eq!(v.remaining_spend_limit_per_timeframe, 7_000);
        assert_eq!(v.next_spend_limit_per_timeframe_reset_slot, 70);
    }

    #[test]
    fn adjust_below_spent_amount_leaves_nothing() {
        let mut v = vault(1_000, 5_000, 100, 0);
        v.consume_spend_limit(1_000, 10).unwrap();
        v.adjust_spend_limits(limits(1_000, 500, 100), 20).unwrap();
        assert_eq!(v.remaining_spend_limit_per_timeframe, 0);
    }

    #[test]
    fn adjust_after_expired_timeframe_restores_full_allowance() {
        let mut v = vault(1_000, 1_000, 100, 0);
        v.consume_spend_limit(1_000, 5).unwrap();
        assert_eq!(v.remaining_spend_limit_per_timeframe, 0);

        v.adjust_spend_limits(limits(1_000, 1_000, 100), 500).unwrap();
        assert_eq!(v.remaining_spend_limit_per_timeframe, 1_000);
        assert_eq!(v.next_spend_limit_per_timeframe_reset_slot, 600);

        v.consume_spend_limit(1, 510).unwrap();
        assert_eq!(v.remaining_spend_limit_per_timeframe, 999);
    }

    #[test]
    fn adjust_on_reset_slot_starts_fresh() {
        let mut v = vault(1_000, 1_000, 100, 0);
        v.consume_spend_limit(600, 5).unwrap();
        v.adjust_spend_limits(limits(1_000, 800, 100), 100).unwrap();
        assert_eq!(v.remaining_spend_limit_per_timeframe, 800);
    }

    #[test]
    fn legacy_vault_parses_owner_and_bump() {
        let owner = Pubkey::new_unique();
        let mut data = Vault::DISCRIMINATOR.to_vec();
        data.extend_from_slice(owner.as_ref());
        data.push(253);

        let legacy = LegacyVault::try_from_bytes(&data).unwrap();
        assert_eq!(legacy, LegacyVault { owner, bump: 253 });
    }

    #[test]
    fn legacy_vault_rejects_upgraded_layout() {
        let mut data = Vec::new();
        vault(1, 1, 1, 1).try_serialize(&mut data).unwrap();
        let err = LegacyVault::try_from_bytes(&data).unwrap_err();
        assert_eq!(err, QuartzError::VaultAlreadyUpgraded.into());
    }

    #[test]
    fn legacy_vault_rejects_foreign_discriminator() {
        let mut data = vec![0u8; LegacyVault::LEN];
        data[0] = 1;
        let err = LegacyVault::try_from_bytes(&data).unwrap_err();
        assert_eq!(err, QuartzError::InvalidVaultAccount.into());

        let err = LegacyVault::try_from_bytes(&data[..10]).unwrap_err();
        assert_eq!(err, QuartzError::InvalidVaultAccount.into());
    }
}
