use crate::{
    config::{DRIFT_SIGNER, USDC_MARKET_INDEX, USDC_MINT},
    cpi::{
        drift::{self, Withdraw as DriftWithdraw},
        Drift,
    },
    errors::QuartzError,
    events::CardToppedUp,
    instructions::bridge::*,
    state::Vault,
};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    close_account, CloseAccount, Mint, TokenAccount, TokenInterface,
};

#[derive(Accounts)]
pub struct TopUpCard<'info> {
    #[account(
        seeds = [b"vault", owner.key().as_ref()],
        bump = vault.bump,
        has_one = owner @ QuartzError::InvalidVaultOwner,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        init,
        seeds = [vault.key().as_ref(), usdc_mint.key().as_ref()],
        bump,
        payer = owner,
        token::mint = usdc_mint,
        token::authority = vault,
    )]
    pub vault_usdc: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        address = USDC_MINT @ QuartzError::InvalidMint,
    )]
    pub usdc_mint: Box<InterfaceAccount<'info, Mint>>,

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
        seeds = [b"spot_market_vault", USDC_MARKET_INDEX.to_le_bytes().as_ref()],
        seeds::program = drift_program.key(),
        bump,
    )]
    pub spot_market_vault: UncheckedAccount<'info>,

    /// CHECK: fixed Drift signer address
    #[account(address = DRIFT_SIGNER)]
    pub drift_signer: UncheckedAccount<'info>,

    pub drift_program: Program<'info, Drift>,

    pub bridge: BridgeAccounts<'info>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, TopUpCard<'info>>,
    amount_usdc_base_units: u64,
) -> Result<()> {
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
                user_token_account: ctx.accounts.vault_usdc.to_account_info(),
                token_program: ctx.accounts.token_program.to_account_info(),
            },
            signer,
        )
        .with_remaining_accounts(ctx.remaining_accounts.to_vec()),
        USDC_MARKET_INDEX,
        amount_usdc_base_units,
        false,
    )?;

    ctx.accounts.vault_usdc.reload()?;
    let amount = ctx.accounts.vault_usdc.amount;

    ctx.accounts.bridge.deposit_for_burn(
        ctx.bumps.bridge.bridge_rent_payer,
        ctx.accounts.vault.to_account_info(),
        vault_seeds,
        ctx.accounts.vault_usdc.to_account_info(),
        ctx.accounts.usdc_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
        amount,
    )?;

    close_account(CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        CloseAccount {
            account: ctx.accounts.vault_usdc.to_account_info(),
            destination: ctx.accounts.owner.to_account_info(),
            authority: ctx.accounts.vault.to_account_info(),
        },
        signer,
    ))?;

    let clock = Clock::get()?;
    emit!(CardToppedUp {
        vault: ctx.accounts.vault.key(),
        owner: owner_key,
        amount,
        timestamp: clock.unix_timestamp,
    });

    msg!("[quartz] card topped up owner={} amount={}", owner_key, amount);
    Ok(())
}
