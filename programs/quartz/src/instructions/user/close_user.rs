use crate::{
    config::{DRIFT_PROGRAM_ID, INIT_ACCOUNT_RENT_FEE},
    errors::QuartzError,
    events::UserClosed,
    state::Vault,
};
use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};

#[derive(Accounts)]
pub struct CloseUser<'info> {
    #[account(
        mut,
        close = init_rent_payer,
        seeds = [b"vault", owner.key().as_ref()],
        bump = vault.bump,
        has_one = owner @ QuartzError::InvalidVaultOwner,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(mut)]
    pub owner: Signer<'info>,

    /// CHECK: lamport pool, address checked by seeds
    #[account(
        mut,
        seeds = [b"init_rent_payer"],
        bump,
    )]
    pub init_rent_payer: UncheckedAccount<'info>,

    /// CHECK: only inspected to confirm Drift has deleted it
    #[account(
        seeds = [b"user", vault.key().as_ref(), (0u16).to_le_bytes().as_ref()],
        seeds::program = DRIFT_PROGRAM_ID,
        bump,
    )]
    pub drift_user: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<CloseUser>) -> Result<()> {
    let drift_user = &ctx.accounts.drift_user;
    require!(
        drift_user.lamports() == 0 && drift_user.data_is_empty(),
        QuartzError::DriftAccountStillOpen
    );

    let rent_payer_seeds = &[b"init_rent_payer".as_ref(), &[ctx.bumps.init_rent_payer]];
    let signer = &[&rent_payer_seeds[..]];

    // Refund the flat fee taken by init_user
    system_program::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.system_program.to_account_info(),
            Transfer {
                from: ctx.accounts.init_rent_payer.to_account_info(),
                to: ctx.accounts.owner.to_account_info(),
            },
            signer,
        ),
        INIT_ACCOUNT_RENT_FEE,
    )?;

    let clock = Clock::get()?;
    emit!(UserClosed {
        vault: ctx.accounts.vault.key(),
        owner: ctx.accounts.owner.key(),
        timestamp: clock.unix_timestamp,
    });

    msg!("[quartz] user closed owner={}", ctx.accounts.owner.key());
    Ok(())
}
