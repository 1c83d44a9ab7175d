use crate::{
    cpi::{
        drift::{self, Deposit as DriftDeposit},
        Drift,
    },
    errors::QuartzError,
    events::SwapRepayDeposited,
    instructions::{collateral_repay::SWAP_REPAY_MARKET_INDEX_OFFSET, vault_spl::sweep_vault_spl},
    state::Vault,
    utils::{
        account_key, exact_out_route_out_amount, load_relative_instruction, read_u16,
        require_instruction, require_same_user, require_top_level, validate_drift_market,
        validate_exact_out_route, SWAP_DESTINATION_MINT_POSITION,
        SWAP_DESTINATION_TOKEN_ACCOUNT_POSITION,
    },
};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, sysvar::instructions as sysvar_instructions};
use anchor_lang::Discriminator;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked},
};

#[derive(Accounts)]
#[instruction(deposit_market_index: u16)]
pub struct CollateralRepayDeposit<'info> {
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
        seeds = [b"spot_market_vault", deposit_market_index.to_le_bytes().as_ref()],
        seeds::program = drift_program.key(),
        bump,
    )]
    pub spot_market_vault: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub drift_program: Program<'info, Drift>,

    /// CHECK: instructions sysvar, address checked
    #[account(address = sysvar_instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// Checks the deposit sits between the swap and the withdraw of one swap
/// repay, and that the swap pays into `owner_spl`. Returns the swap's
/// `out_amount`, which is the amount to deposit.
#[allow(clippy::too_many_arguments)]
pub fn validate_swap_repay_deposit(
    start: &Instruction,
    swap: &Instruction,
    withdraw: &Instruction,
    vault: &Pubkey,
    owner: &Pubkey,
    owner_spl: &Pubkey,
    mint: &Pubkey,
    deposit_market_index: u16,
) -> Result<u64> {
    require_instruction(
        start,
        &crate::ID,
        &crate::instruction::CollateralRepayStart::DISCRIMINATOR,
        QuartzError::IllegalCollateralRepayInstructions,
    )?;
    require_same_user(start, vault, owner)?;

    validate_exact_out_route(swap)?;
    require_keys_eq!(
        account_key(swap, SWAP_DESTINATION_MINT_POSITION)?,
        *mint,
        QuartzError::InvalidMint
    );
    require_keys_eq!(
        account_key(swap, SWAP_DESTINATION_TOKEN_ACCOUNT_POSITION)?,
        *owner_spl,
        QuartzError::InvalidDestinationTokenAccount
    );

    require_instruction(
        withdraw,
        &crate::ID,
        &crate::instruction::CollateralRepayWithdraw::DISCRIMINATOR,
        QuartzError::IllegalCollateralRepayInstructions,
    )?;
    require_same_user(withdraw, vault, owner)?;
    require!(
        read_u16(withdraw, SWAP_REPAY_MARKET_INDEX_OFFSET)? != deposit_market_index,
        QuartzError::IdenticalCollateralRepayMarkets
    );

    exact_out_route_out_amount(swap)
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, CollateralRepayDeposit<'info>>,
    deposit_market_index: u16,
) -> Result<()> {
    require_top_level()?;
    validate_drift_market(deposit_market_index, &ctx.accounts.spl_mint.key())?;

    let instructions = ctx.accounts.instructions.to_account_info();
    let load = |offset| {
        load_relative_instruction(
            &instructions,
            offset,
            QuartzError::IllegalCollateralRepayInstructions,
        )
    };
    let start = load(-2)?;
    let swap = load(-1)?;
    let withdraw = load(1)?;

    let owner_key = ctx.accounts.owner.key();
    let amount = validate_swap_repay_deposit(
        &start,
        &swap,
        &withdraw,
        &ctx.accounts.vault.key(),
        &owner_key,
        &ctx.accounts.owner_spl.key(),
        &ctx.accounts.spl_mint.key(),
        deposit_market_index,
    )?;

    let vault_seeds = &[b"vault".as_ref(), owner_key.as_ref(), &[ctx.accounts.vault.bump]];
    let signer = &[&vault_seeds[..]];

    transfer_checked(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.owner_spl.to_account_info(),
                mint: ctx.accounts.spl_mint.to_account_info(),
                to: ctx.accounts.vault_spl.to_account_info(),
                authority: ctx.accounts.owner.to_account_info(),
            },
        ),
        amount,
        ctx.accounts.spl_mint.decimals,
    )?;

    drift::deposit(
        CpiContext::new_with_signer(
            ctx.accounts.drift_program.to_account_info(),
            DriftDeposit {
                state: ctx.accounts.drift_state.to_account_info(),
                user: ctx.accounts.drift_user.to_account_info(),
                user_stats: ctx.accounts.drift_user_stats.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
                spot_market_vault: ctx.accounts.spot_market_vault.to_account_info(),
                user_token_account: ctx.accounts.vault_spl.to_account_info(),
                token_program: ctx.accounts.token_program.to_account_info(),
            },
            signer,
        )
        .with_remaining_accounts(ctx.remaining_accounts.to_vec()),
        deposit_market_index,
        amount,
        false,
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

    let clock = Clock::get()?;
    emit!(SwapRepayDeposited {
        vault: ctx.accounts.vault.key(),
        owner: owner_key,
        deposit_market_index,
        deposit_amount: amount,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "[quartz] swap repay deposit market={} amount={}",
        deposit_market_index,
        amount
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
        withdraw: Instruction,
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
        let swap = swap_ix(Pubkey::new_unique(), owner_spl, Pubkey::new_unique(), mint, 6_000_000, 0);
        let withdraw = quartz_ix(
            crate::instruction::CollateralRepayWithdraw::DISCRIMINATOR,
            &1u16.to_le_bytes(),
            vault,
            owner,
        );
        Sequence { vault, owner, owner_spl, mint, start, swap, withdraw }
    }

    fn check(s: &Sequence, deposit_market_index: u16) -> Result<u64> {
        validate_swap_repay_deposit(
            &s.start,
            &s.swap,
            &s.withdraw,
            &s.vault,
            &s.owner,
            &s.owner_spl,
            &s.mint,
            deposit_market_index,
        )
    }

    #[test]
    fn deposits_swap_out_amount() {
        assert_eq!(check(&sequence(), 0).unwrap(), 6_000_000);
    }

    #[test]
    fn swap_into_other_mint_is_rejected() {
        let mut s = sequence();
        s.mint = Pubkey::new_unique();
        assert_eq!(check(&s, 0).unwrap_err(), QuartzError::InvalidMint.into());
    }

    #[test]
    fn swap_into_other_account_is_rejected() {
        let mut s = sequence();
        s.owner_spl = Pubkey::new_unique();
        assert_eq!(
            check(&s, 0).unwrap_err(),
            QuartzError::InvalidDestinationTokenAccount.into()
        );
    }

    #[test]
    fn same_market_as_withdraw_is_rejected() {
        assert_eq!(
            check(&sequence(), 1).unwrap_err(),
            QuartzError::IdenticalCollateralRepayMarkets.into()
        );
    }

    #[test]
    fn start_for_other_user_is_rejected() {
        let mut s = sequence();
        s.start.accounts[0].pubkey = Pubkey::new_unique();
        assert_eq!(check(&s, 0).unwrap_err(), QuartzError::InvalidUserAccounts.into());
    }
}
