use crate::{
    config::{ANCHOR_DISCRIMINATOR, COLLATERAL_REPAY_MAX_SLIPPAGE_BPS, DRIFT_SIGNER, U64_SIZE},
    cpi::{
        drift::{self, Withdraw as DriftWithdraw},
        Drift,
    },
    errors::QuartzError,
    events::CollateralRepaid,
    instructions::vault_spl::sweep_vault_spl,
    state::{CollateralRepayLedger, Vault},
    utils::{
        get_drift_market, load_relative_instruction, read_u16, require_instruction,
        require_same_user, require_top_level, validate_drift_market, validate_swap_prices,
        OraclePrice,
    },
};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, sysvar::instructions as sysvar_instructions};
use anchor_lang::Discriminator;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

/// `start_collateral_repay(amount: u64, deposit_market_index: u16)`
pub const START_COLLATERAL_REPAY_MARKET_INDEX_OFFSET: usize = ANCHOR_DISCRIMINATOR + U64_SIZE;

#[derive(Accounts)]
#[instruction(amount_withdraw_base_units: u64, withdraw_market_index: u16)]
pub struct EndCollateralRepay<'info> {
    #[account(
        seeds = [b"vault", owner.key().as_ref()],
        bump = vault.bump,
        has_one = owner @ QuartzError::InvalidVaultOwner,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        init_if_needed,
        payer = owner,
        associated_token::mint = spl_mint,
        associated_token::authority = owner,
        associated_token::token_program = token_program,
    )]
    pub owner_spl: Box<InterfaceAccount<'info, TokenAccount>>,

    pub spl_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        seeds = [vault.key().as_ref(), spl_mint.key().as_ref()],
        bump,
        payer = owner,
        token::mint = spl_mint,
        token::authority = vault,
    )]
    pub vault_spl: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [b"collateral_repay_ledger", owner.key().as_ref()],
        bump,
        close = owner,
    )]
    pub ledger: Box<Account<'info, CollateralRepayLedger>>,

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
        seeds = [b"spot_market_vault", withdraw_market_index.to_le_bytes().as_ref()],
        seeds::program = drift_program.key(),
        bump,
    )]
    pub spot_market_vault: UncheckedAccount<'info>,

    /// CHECK: fixed Drift signer address
    #[account(address = DRIFT_SIGNER)]
    pub drift_signer: UncheckedAccount<'info>,

    pub deposit_price_update: Box<Account<'info, PriceUpdateV2>>,

    pub withdraw_price_update: Box<Account<'info, PriceUpdateV2>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub drift_program: Program<'info, Drift>,

    /// CHECK: instructions sysvar, address checked
    #[account(address = sysvar_instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// Returns the deposit market index of the `start_collateral_repay` that
/// opened this repay.
pub fn validate_start_collateral_repay(
    start: &Instruction,
    vault: &Pubkey,
    owner: &Pubkey,
    withdraw_market_index: u16,
) -> Result<u16> {
    require_instruction(
        start,
        &crate::ID,
        &crate::instruction::StartCollateralRepay::DISCRIMINATOR,
        QuartzError::IllegalCollateralRepayInstructions,
    )?;
    require_same_user(start, vault, owner)?;

    let deposit_market_index = read_u16(start, START_COLLATERAL_REPAY_MARKET_INDEX_OFFSET)?;
    require!(
        deposit_market_index != withdraw_market_index,
        QuartzError::IdenticalCollateralRepayMarkets
    );
    Ok(deposit_market_index)
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, EndCollateralRepay<'info>>,
    amount_withdraw_base_units: u64,
    withdraw_market_index: u16,
) -> Result<()> {
    require_top_level()?;
    let start = load_relative_instruction(
        &ctx.accounts.instructions.to_account_info(),
        -1,
        QuartzError::IllegalCollateralRepayInstructions,
    )?;
    let deposit_market_index = validate_start_collateral_repay(
        &start,
        &ctx.accounts.vault.key(),
        &ctx.accounts.owner.key(),
        withdraw_market_index,
    )?;
    let withdraw_market = validate_drift_market(withdraw_market_index, &ctx.accounts.spl_mint.key())?;
    let deposit_market = get_drift_market(deposit_market_index)?;

    let owner_key = ctx.accounts.owner.key();
    let vault_seeds = &[b"vault".as_ref(), owner_key.as_ref(), &[ctx.accounts.vault.bump]];
    let signer = &[&vault_seeds[..]];

    // reduce_only: the collateral cannot be turned into a new loan
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
        withdraw_market_index,
        amount_withdraw_base_units,
        true,
    )?;

    ctx.accounts.vault_spl.reload()?;
    let withdrawn = ctx.accounts.vault_spl.amount;
    let deposited = ctx.accounts.ledger.deposit;

    let clock = Clock::get()?;
    let deposit_price = OraclePrice::load(&ctx.accounts.deposit_price_update, deposit_market, &clock)?;
    let withdraw_price = OraclePrice::load(&ctx.accounts.withdraw_price_update, withdraw_market, &clock)?;
    validate_swap_prices(
        deposited,
        &deposit_price,
        deposit_market,
        withdrawn,
        &withdraw_price,
        withdraw_market,
        COLLATERAL_REPAY_MAX_SLIPPAGE_BPS,
    )?;

    sweep_vault_spl(
        &mut ctx.accounts.vault_spl,
        ctx.accounts.owner_spl.to_account_info(),
        &ctx.accounts.spl_mint,
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        signer,
    )?;

    emit!(CollateralRepaid {
        vault: ctx.accounts.vault.key(),
        owner: owner_key,
        deposit_market_index,
        deposit_amount: deposited,
        withdraw_market_index,
        withdraw_amount: withdrawn,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "[quartz] collateral repaid deposit_market={} deposited={} withdraw_market={} withdrawn={}",
        deposit_market_index,
        deposited,
        withdraw_market_index,
        withdrawn
    );
    Ok(())
}
