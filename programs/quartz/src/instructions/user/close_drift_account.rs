use crate::{
    cpi::{
        drift::{self, DeleteUser},
        Drift,
    },
    errors::QuartzError,
    events::DriftAccountClosed,
    state::Vault,
};
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct CloseDriftAccount<'info> {
    #[account(
        mut,
        seeds = [b"vault", owner.key().as_ref()],
        bump = vault.bump,
        has_one = owner @ QuartzError::InvalidVaultOwner,
    )]
    pub vault: Box<Account<'info, Vault>>,

    pub owner: Signer<'info>,

    /// CHECK: deleted by Drift, address checked by seeds
    #[account(
        mut,
        seeds = [b"user", vault.key().as_ref(), (0u16).to_le_bytes().as_ref()],
        seeds::program = drift_program.key(),
        bump,
    )]
    pub drift_user: UncheckedAccount<'info>,

    /// CHECK: address checked by seeds, contents checked by Drift
    #[account(
        mut,
        seeds = [b"user_stats", vault.key().as_ref()],
        seeds::program = drift_program.key(),
        bump,
    )]
    pub drift_user_stats: UncheckedAccount<'info>,

    /// CHECK: address checked by seeds, contents checked by Drift
    #[account(
        mut,
        seeds = [b"drift_state"],
        seeds::program = drift_program.key(),
        bump,
    )]
    pub drift_state: UncheckedAccount<'info>,

    pub drift_program: Program<'info, Drift>,
}

pub fn handler(ctx: Context<CloseDriftAccount>) -> Result<()> {
    let owner_key = ctx.accounts.owner.key();
    let vault_seeds = &[b"vault".as_ref(), owner_key.as_ref(), &[ctx.accounts.vault.bump]];
    let signer = &[&vault_seeds[..]];

    // Drift refunds the user account rent to the vault
    drift::delete_user(CpiContext::new_with_signer(
        ctx.accounts.drift_program.to_account_info(),
        DeleteUser {
            user: ctx.accounts.drift_user.to_account_info(),
            user_stats: ctx.accounts.drift_user_stats.to_account_info(),
            state: ctx.accounts.drift_state.to_account_info(),
            authority: ctx.accounts.vault.to_account_info(),
        },
        signer,
    ))?;

    let clock = Clock::get()?;
    emit!(DriftAccountClosed {
        vault: ctx.accounts.vault.key(),
        drift_user: ctx.accounts.drift_user.key(),
        timestamp: clock.unix_timestamp,
    });

    msg!("[quartz] drift account closed vault={}", ctx.accounts.vault.key());
    Ok(())
}
