use crate::{
    errors::QuartzError,
    events::SwapRepayStarted,
    state::Vault,
    utils::{
        load_relative_instruction, require_instruction, require_same_user, require_top_level,
        validate_exact_out_route,
    },
};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, sysvar::instructions as sysvar_instructions};
use anchor_lang::Discriminator;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

#[derive(Accounts)]
pub struct CollateralRepayStart<'info> {
    #[account(
        seeds = [b"vault", owner.key().as_ref()],
        bump = vault.bump,
        has_one = owner @ QuartzError::InvalidVaultOwner,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        associated_token::mint = withdraw_mint,
        associated_token::authority = owner,
        associated_token::token_program = token_program,
    )]
    pub owner_spl: Box<InterfaceAccount<'info, TokenAccount>>,

    pub withdraw_mint: Box<InterfaceAccount<'info, Mint>>,

    pub token_program: Interface<'info, TokenInterface>,

    /// CHECK: instructions sysvar, address checked
    #[account(address = sysvar_instructions::ID)]
    pub instructions: UncheckedAccount<'info>,
}

/// A swap repay is exactly: start, Jupiter exact_out_route, deposit, withdraw.
pub fn validate_swap_repay_sequence(
    swap: &Instruction,
    deposit: &Instruction,
    withdraw: &Instruction,
    vault: &Pubkey,
    owner: &Pubkey,
) -> Result<()> {
    validate_exact_out_route(swap)?;

    require_instruction(
        deposit,
        &crate::ID,
        &crate::instruction::CollateralRepayDeposit::DISCRIMINATOR,
        QuartzError::IllegalCollateralRepayInstructions,
    )?;
    require_same_user(deposit, vault, owner)?;

    require_instruction(
        withdraw,
        &crate::ID,
        &crate::instruction::CollateralRepayWithdraw::DISCRIMINATOR,
        QuartzError::IllegalCollateralRepayInstructions,
    )?;
    require_same_user(withdraw, vault, owner)
}

pub fn handler(ctx: Context<CollateralRepayStart>, start_withdraw_balance: u64) -> Result<()> {
    require_top_level()?;

    let instructions = ctx.accounts.instructions.to_account_info();
    let load = |offset| {
        load_relative_instruction(
            &instructions,
            offset,
            QuartzError::IllegalCollateralRepayInstructions,
        )
    };
    let swap = load(1)?;
    let deposit = load(2)?;
    let withdraw = load(3)?;
    validate_swap_repay_sequence(
        &swap,
        &deposit,
        &withdraw,
        &ctx.accounts.vault.key(),
        &ctx.accounts.owner.key(),
    )?;

    require!(
        ctx.accounts.owner_spl.amount == start_withdraw_balance,
        QuartzError::InvalidStartBalance
    );

    emit!(SwapRepayStarted {
        vault: ctx.accounts.vault.key(),
        owner: ctx.accounts.owner.key(),
        withdraw_mint: ctx.accounts.withdraw_mint.key(),
        start_withdraw_balance,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!(
        "[quartz] swap repay started owner={} start_balance={}",
        ctx.accounts.owner.key(),
        start_withdraw_balance
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
        swap: Instruction,
        deposit: Instruction,
        withdraw: Instruction,
    }

    fn sequence() -> Sequence {
        let (vault, owner) = (Pubkey::new_unique(), Pubkey::new_unique());
        let swap = swap_ix(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            1_000_000,
            0,
        );
        let deposit = quartz_ix(
            crate::instruction::CollateralRepayDeposit::DISCRIMINATOR,
            &0u16.to_le_bytes(),
            vault,
            owner,
        );
        let withdraw = quartz_ix(
            crate::instruction::CollateralRepayWithdraw::DISCRIMINATOR,
            &1u16.to_le_bytes(),
            vault,
            owner,
        );
        Sequence { vault, owner, swap, deposit, withdraw }
    }

    fn check(s: &Sequence) -> Result<()> {
        validate_swap_repay_sequence(&s.swap, &s.deposit, &s.withdraw, &s.vault, &s.owner)
    }

    #[test]
    fn full_sequence_is_accepted() {
        assert!(check(&sequence()).is_ok());
    }

    #[test]
    fn swap_with_platform_fee_is_rejected() {
        let mut s = sequence();
        *s.swap.data.last_mut().unwrap() = 5;
        assert_eq!(check(&s).unwrap_err(), QuartzError::InvalidPlatformFee.into());
    }

    #[test]
    fn swapped_deposit_and_withdraw_are_rejected() {
        let mut s = sequence();
        std::mem::swap(&mut s.deposit, &mut s.withdraw);
        assert_eq!(
            check(&s).unwrap_err(),
            QuartzError::IllegalCollateralRepayInstructions.into()
        );
    }

    #[test]
    fn withdraw_for_other_owner_is_rejected() {
        let mut s = sequence();
        s.withdraw.accounts[1].pubkey = Pubkey::new_unique();
        assert_eq!(check(&s).unwrap_err(), QuartzError::InvalidUserAccounts.into());
    }
}
