use crate::{
    errors::QuartzError,
    events::SpendLimitsUpdated,
    state::{SpendLimits, Vault},
};
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct AdjustSpendLimits<'info> {
    #[account(
        mut,
        seeds = [b"vault", owner.key().as_ref()],
        bump = vault.bump,
        has_one = owner @ QuartzError::InvalidVaultOwner,
    )]
    pub vault: Box<Account<'info, Vault>>,

    pub owner: Signer<'info>,
}

pub fn handler(
    ctx: Context<AdjustSpendLimits>,
    spend_limit_per_transaction: u64,
    spend_limit_per_timeframe: u64,
    extend_spend_limit_per_timeframe_reset_slot_amount: u64,
) -> Result<()> {
    let clock = Clock::get()?;
    let vault = &mut ctx.accounts.vault;

    vault.adjust_spend_limits(
        SpendLimits {
            spend_limit_per_transaction,
            spend_limit_per_timeframe,
            extend_spend_limit_per_timeframe_reset_slot_amount,
        },
        clock.slot,
    )?;

    emit!(SpendLimitsUpdated {
        vault: vault.key(),
        spend_limit_per_transaction,
        spend_limit_per_timeframe,
        remaining_spend_limit_per_timeframe: vault.remaining_spend_limit_per_timeframe,
        next_spend_limit_per_timeframe_reset_slot: vault.next_spend_limit_per_timeframe_reset_slot,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "[quartz] spend limits updated per_tx={} per_timeframe={} remaining={}",
        spend_limit_per_transaction,
        spend_limit_per_timeframe,
        vault.remaining_spend_limit_per_timeframe
    );
    Ok(())
}
