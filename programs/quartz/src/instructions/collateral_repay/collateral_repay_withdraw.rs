use crate::{
    config::{COLLATERAL_REPAY_MAX_SLIPPAGE_BPS, DRIFT_SIGNER},
    cpi::{
        drift::{self, Withdraw as DriftWithdraw},
        Drift,
    },
    errors::QuartzError,
    events::CollateralRepaid,
    instructions::{
        collateral_repay::{START_WITHDRAW_BALANCE_OFFSET, SWAP_REPAY_MARKET_INDEX_OFFSET},
        vault_spl::sweep_vault_spl,
    },
    state::Vault,
    utils::{
        account_key, exact_out_route_out_amount, get_drift_market, load_relative_instruction,
        read_u16, read_u64, require_instruction, require_same_user, require_top_level,
        validate_drift_market, validate_exact_out_route, validate_swap_prices, OraclePrice,
        SWAP_SOURCE_MINT_POSITION, SWAP_SOURCE_TOKEN_ACCOUNT_POSITION,
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

#[derive(Accounts)]
#[instruction(withdraw_market_index: u16)]
pub struct CollateralRepayWithdraw<'info> {
    #[account(
        seeds = [b"vault", owner.key().as_ref()],
        bump = vault.bump,
        has_one = owner @ QuartzError::InvalidVaultOwner,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
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

/// What the swap repay moved, read back from the earlier instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRepayAmounts {
    pub start_withdraw_balance: u64,
    pub deposit_market_index: u16,
    pub deposit_amount: u64,
}

impl SwapRepayAmounts {
    /// Collateral the swap took out of the owner's token account.
    pub fn withdraw_amount(&self, owner_spl_balance: u64) -> Result<u64> {
        self.start_withdraw_balance
            .checked_sub(owner_spl_balance)
            .ok_or_else(|| QuartzError::InvalidStartBalance.into())
    }

    /// Event for a swap repay, recording the withdraw amount that was priced.
    pub fn repaid(
        &self,
        vault: Pubkey,
        owner: Pubkey,
        withdraw_market_index: u16,
        withdraw_amount: u64,
        timestamp: i64,
    ) -> CollateralRepaid {
        CollateralRepaid {
            vault,
            owner,
            deposit_market_index: self.deposit_market_index,
            deposit_amount: self.deposit_amount,
            withdraw_market_index,
            withdraw_amount,
            timestamp,
        }
    }
}

/// Checks the withdraw closes a swap repay whose swap spent from `owner_spl`.
#[allow(clippy::too_many_arguments)]
pub fn validate_swap_repay_withdraw(
    start: &Instruction,
    swap: &Instruction,
    deposit: &Instruction,
    vault: &Pubkey,
    owner: &Pubkey,
    owner_spl: &Pubkey,
    mint: &Pubkey,
    withdraw_market_index: u16,
) -> Result<SwapRepayAmounts> {
    require_instruction(
        start,
        &crate::ID,
        &crate::instruction::CollateralRepayStart::DISCRIMINATOR,
        QuartzError::IllegalCollateralRepayInstructions,
    )?;
    require_same_user(start, vault, owner)?;

    validate_exact_out_route(swap)?;
    require_keys_eq!(
        account_key(swap, SWAP_SOURCE_MINT_POSITION)?,
        *mint,
        QuartzError::InvalidMint
    );
    require_keys_eq!(
        account_key(swap, SWAP_SOURCE_TOKEN_ACCOUNT_POSITION)?,
        *owner_spl,
        QuartzError::InvalidSourceTokenAccount
    );

    require_instruction(
        deposit,
        &crate::ID,
        &crate::instruction::CollateralRepayDeposit::DISCRIMINATOR,
        QuartzError::IllegalCollateralRepayInstructions,
    )?;
    require_same_user(deposit, vault, owner)?;

    let deposit_market_index = read_u16(deposit, SWAP_REPAY_MARKET_INDEX_OFFSET)?;
    require!(
        deposit_market_index != withdraw_market_index,
        QuartzError::IdenticalCollateralRepayMarkets
    );

    Ok(SwapRepayAmounts {
        start_withdraw_balance: read_u64(start, START_WITHDRAW_BALANCE_OFFSET)?,
        deposit_market_index,
        deposit_amount: exact_out_route_out_amount(swap)?,
    })
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, CollateralRepayWithdraw<'info>>,
    withdraw_market_index: u16,
) -> Result<()> {
    require_top_level()?;
    let withdraw_market = validate_drift_market(withdraw_market_index, &ctx.accounts.spl_mint.key())?;

    let instructions = ctx.accounts.instructions.to_account_info();
    let load = |offset| {
        load_relative_instruction(
            &instructions,
            offset,
            QuartzError::IllegalCollateralRepayInstructions,
        )
    };
    let start = load(-3)?;
    let swap = load(-2)?;
    let deposit = load(-1)?;

    let owner_key = ctx.accounts.owner.key();
    let amounts = validate_swap_repay_withdraw(
        &start,
        &swap,
        &deposit,
        &ctx.accounts.vault.key(),
        &owner_key,
        &ctx.accounts.owner_spl.key(),
        &ctx.accounts.spl_mint.key(),
        withdraw_market_index,
    )?;
    let deposit_market = get_drift_market(amounts.deposit_market_index)?;

    let withdraw_amount = amounts.withdraw_amount(ctx.accounts.owner_spl.amount)?;

    let clock = Clock::get()?;
    let deposit_price = OraclePrice::load(&ctx.accounts.deposit_price_update, deposit_market, &clock)?;
    let withdraw_price = OraclePrice::load(&ctx.accounts.withdraw_price_update, withdraw_market, &clock)?;
    validate_swap_prices(
        amounts.deposit_amount,
        &deposit_price,
        deposit_market,
        withdraw_amount,
        &withdraw_price,
        withdraw_market,
        COLLATERAL_REPAY_MAX_SLIPPAGE_BPS,
    )?;

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
        withdraw_market_index,
        withdraw_amount,
        true,
    )?;

    let reimbursed = sweep_vault_spl(
        &mut ctx.accounts.vault_spl,
        ctx.accounts.owner_spl.to_account_info(),
        &ctx.accounts.spl_mint,
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        signer,
    )?;

    emit!(amounts.repaid(
        ctx.accounts.vault.key(),
        owner_key,
        withdraw_market_index,
        withdraw_amount,
        clock.unix_timestamp,
    ));

    msg!(
        "[quartz] swap repay withdraw market={} amount={} reimbursed={}",
        withdraw_market_index,
        withdraw_amount,
        reimbursed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::collateral_repay::test_instructions::{quartz_ix, swap_ix};

    struct Sequence {
        vault: Pubkey,
        owner: Pubkey,
        owner_spl: Pubkey,
        mint: Pubkey,
        start: Instruction,
        swap: Instruction,
        deposit: Instruction,
    }

    fn sequence() -> Sequence {
        let (vault, owner) = (Pubkey::new_unique(), Pubkey::new_unique());
        let (owner_spl, mint) = (Pubkey::new_unique(), Pubkey::new_unique());
        let start = quartz_ix(
            crate::instruction::CollateralRepayStart::DISCRIMINATOR,
            &40_000_000u64.to_le_bytes(),
            vault,
            owner,
        );
        let swap = swap_ix(owner_spl, Pubkey::new_unique(), mint, Pubkey::new_unique(), 6_000_000, 0);
        let deposit = quartz_ix(
            crate::instruction::CollateralRepayDeposit::DISCRIMINATOR,
            &0u16.to_le_bytes(),
            vault,
            owner,
        );
        Sequence { vault, owner, owner_spl, mint, start, swap, deposit }
    }

    fn check(s: &Sequence, withdraw_market_index: u16) -> Result<SwapRepayAmounts> {
        validate_swap_repay_withdraw(
            &s.start,
            &s.swap,
            &s.deposit,
            &s.vault,
            &s.owner,
            &s.owner_spl,
            &s.mint,
            withdraw_market_index,
        )
    }

    #[test]
    fn reads_amounts_from_sequence() {
        let amounts = check(&sequence(), 1).unwrap();
        assert_eq!(
            amounts,
            SwapRepayAmounts {
                start_withdraw_balance: 40_000_000,
                deposit_market_index: 0,
                deposit_amount: 6_000_000,
            }
        );
    }

    #[test]
    fn swap_from_other_mint_is_rejected() {
        let mut s = sequence();
        s.mint = Pubkey::new_unique();
        assert_eq!(check(&s, 1).unwrap_err(), QuartzError::InvalidMint.into());
    }

    #[test]
    fn swap_from_other_account_is_rejected() {
        let mut s = sequence();
        s.owner_spl = Pubkey::new_unique();
        assert_eq!(
            check(&s, 1).unwrap_err(),
            QuartzError::InvalidSourceTokenAccount.into()
        );
    }

    #[test]
    fn deposit_for_other_vault_is_rejected() {
        let mut s = sequence();
        s.deposit.accounts[0].pubkey = Pubkey::new_unique();
        assert_eq!(check(&s, 1).unwrap_err(), QuartzError::InvalidUserAccounts.into());
    }

    #[test]
    fn same_market_as_deposit_is_rejected() {
        assert_eq!(
            check(&sequence(), 0).unwrap_err(),
            QuartzError::IdenticalCollateralRepayMarkets.into()
        );
    }

    #[test]
    fn missing_start_is_rejected() {
        let mut s = sequence();
        s.start = s.deposit.clone();
        assert_eq!(
            check(&s, 1).unwrap_err(),
            QuartzError::IllegalCollateralRepayInstructions.into()
        );
    }

    #[test]
    fn withdraw_amount_is_what_the_swap_spent() {
        let amounts = check(&sequence(), 1).unwrap();
        assert_eq!(amounts.withdraw_amount(34_000_000).unwrap(), 6_000_000);
        assert_eq!(
            amounts.withdraw_amount(40_000_001).unwrap_err(),
            QuartzError::InvalidStartBalance.into()
        );
    }

    #[test]
    fn repaid_event_records_priced_withdraw_amount() {
        let s = sequence();
        let amounts = check(&s, 1).unwrap();
        let withdraw_amount = amounts.withdraw_amount(34_000_000).unwrap();

        let event = amounts.repaid(s.vault, s.owner, 1, withdraw_amount, 1_700_000_000);
        assert_eq!(event.withdraw_amount, 6_000_000);
        assert_eq!(event.deposit_amount, 6_000_000);
        assert_eq!(event.deposit_market_index, 0);
        assert_eq!(event.withdraw_market_index, 1);
        assert_eq!(event.vault, s.vault);
    }
}
