use crate::{
    config::DRIFT_SIGNER,
    cpi::{
        drift::{self, Withdraw as DriftWithdraw},
        Drift,
    },
    errors::QuartzError,
    events::WithdrawMade,
    instructions::vault_spl::sweep_vault_spl,
    state::Vault,
    utils::validate_drift_market,
};
use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

#[derive(Accounts)]
#[instruction(amount_base_units: u64, drift_market_index: u16)]
pub struct Withdraw<'info> {
    #[account(
        seeds = [b"vault", owner.key().as_ref()],
        bump = vault.bump,
        has_one = owner @ QuartzError::InvalidVaultOwner,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        init,
        seeds = [vault.key().as_ref(), mint.key().as_ref()],
        bump,
        payer = owner,
        token::mint = mint,
        token::authority = vault,
    )]
    pub vault_spl: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        init_if_needed,
        payer = owner,
        associated_token::mint = mint,
        associated_token::authority = owner,
        associated_token::token_program = token_program,
    )]
    pub owner_spl: Box<InterfaceAccount<'info, TokenAccount>>,

    pub mint: Box<InterfaceAccount<'info, Mint>>,

    /// CHECK: address checked by seeds, contents checked by Drift
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

    /// CHECK: address checked by seeds, contents checked by Drift
    #[account(
        mut,
        seeds = [b"spot_market_vault", drift_market_index.to_le_bytes().as_ref()],
        seeds::program = drift_program.key(),
        bump,
    )]
    pub spot_market_vault: UncheckedAccount<'info>,

    /// CHECK: fixed Drift signer address
    #[account(address = DRIFT_SIGNER)]
    pub drift_signer: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub drift_program: Program<'info, Drift>,

    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
    amount_base_units: u64,
    drift_market_index: u16,
    reduce_only: bool,
) -> Result<()> {
    validate_drift_market(drift_market_index, &ctx.accounts.mint.key())?;
    // Always empty while vault_spl is `init` here. The sweep below moves the
    // whole balance, so it must hold only what Drift sends.
    require!(
        ctx.accounts.vault_spl.amount == 0,
        QuartzError::InvalidStartingVaultBalance
    );

    let owner_key = ctx.accounts.owner.key();
    let vault_seeds = &[b"vault".as_ref(), owner_key.as_ref(), &[ctx.accounts.vault.bump]];
    let signer = &[&vault_seeds[..]];

    drift::withdraw(
        CpiContext::new_with_signer(
            ctx.accounts.drift_program.to_account_info(),
            DriftWithdraw {
                state: ctx.accounts.drift_state.to_account_info(),
                user: ctx.accounts.drift_user.to_account_info(),
                user_stats: ctx.accounts.drift_user_stats.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
                spot_market_vault: ctx.accounts.spot_market_vault.to_account_info(),
                drift_signer: ctx.accounts.drift_signer.to_account_info(),
                user_token_account: ctx.accounts.vault_spl.to_account_info(),
                token_program: ctx.accounts.token_program.to_account_info(),
            },
            signer,
        )
        .with_remaining_accounts(ctx.remaining_accounts.to_vec()),
        drift_market_index,
        amount_base_units,
        reduce_only,
    )?;

    // reduce_only can withdraw less than requested
    let withdrawn = sweep_vault_spl(
        &mut ctx.accounts.vault_spl,
        ctx.accounts.owner_spl.to_account_info(),
        &ctx.accounts.mint,
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        signer,
    )?;

    let clock = Clock::get()?;
    emit!(WithdrawMade {
        vault: ctx.accounts.vault.key(),
        owner: owner_key,
        market_index: drift_market_index,
        amount: withdrawn,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "[quartz] withdraw market={} amount={}",
        drift_market_index,
        withdrawn
    );
    Ok(())
}
