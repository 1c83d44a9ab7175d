use crate::{
    config::DRIFT_SUB_ACCOUNT_ID,
    cpi::{
        drift::{self, InitializeUser, InitializeUserStats},
        Drift,
    },
    errors::QuartzError,
    events::DriftAccountInitialised,
    state::Vault,
};
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct InitDriftAccount<'info> {
    #[account(
        mut,
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

    /// CHECK: created by Drift, address checked by seeds
    #[account(
        mut,
        seeds = [b"user", vault.key().as_ref(), (0u16).to_le_bytes().as_ref()],
        seeds::program = drift_program.key(),
        bump,
    )]
    pub drift_user: UncheckedAccount<'info>,

    /// CHECK: created by Drift, address checked by seeds
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

    pub rent: Sysvar<'info, Rent>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitDriftAccount>) -> Result<()> {
    let owner_key = ctx.accounts.owner.key();
    let vault_seeds = &[b"vault".as_ref(), owner_key.as_ref(), &[ctx.accounts.vault.bump]];
    let rent_payer_seeds = &[b"init_rent_payer".as_ref(), &[ctx.bumps.init_rent_payer]];
    let signer = &[&rent_payer_seeds[..], &vault_seeds[..]];

    let vault_info = ctx.accounts.vault.to_account_info();
    let lamports_before = vault_info.lamports();

    drift::initialize_user_stats(CpiContext::new_with_signer(
        ctx.accounts.drift_program.to_account_info(),
        InitializeUserStats {
            user_stats: ctx.accounts.drift_user_stats.to_account_info(),
            state: ctx.accounts.drift_state.to_account_info(),
            authority: vault_info.clone(),
            payer: ctx.accounts.init_rent_payer.to_account_info(),
            rent: ctx.accounts.rent.to_account_info(),
            system_program: ctx.accounts.system_program.to_account_info(),
        },
        signer,
    ))?;

    drift::initialize_user(
        CpiContext::new_with_signer(
            ctx.accounts.drift_program.to_account_info(),
            InitializeUser {
                user: ctx.accounts.drift_user.to_account_info(),
                user_stats: ctx.accounts.drift_user_stats.to_account_info(),
                state: ctx.accounts.drift_state.to_account_info(),
                authority: vault_info.clone(),
                payer: ctx.accounts.init_rent_payer.to_account_info(),
                rent: ctx.accounts.rent.to_account_info(),
                system_program: ctx.accounts.system_program.to_account_info(),
            },
            signer,
        ),
        DRIFT_SUB_ACCOUNT_ID,
        [0; 32],
    )?;

    require!(
        vault_info.lamports() >= lamports_before,
        QuartzError::IllegalVaultCpiModification
    );

    let clock = Clock::get()?;
    emit!(DriftAccountInitialised {
        vault: vault_info.key(),
        drift_user: ctx.accounts.drift_user.key(),
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "[quartz] drift account initialised vault={} drift_user={}",
        vault_info.key(),
        ctx.accounts.drift_user.key()
    );
    Ok(())
}
