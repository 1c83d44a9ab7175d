use crate::{
    config::{DRIFT_SIGNER, SPEND_CALLER, USDC_MARKET_INDEX, USDC_MINT},
    cpi::{
        drift::{self, Withdraw as DriftWithdraw},
        Drift,
    },
    errors::QuartzError,
    events::SpendStarted,
    state::Vault,
    utils::{load_relative_instruction, require_instruction, require_same_user, require_top_level},
};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, sysvar::instructions as sysvar_instructions};
use anchor_lang::Discriminator;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

#[derive(Accounts)]
pub struct StartSpend<'info> {
    #[account(
        mut,
        seeds = [b"vault", owner.key().as_ref()],
        bump = vault.bump,
        has_one = owner @ QuartzError::InvalidVaultOwner,
    )]
    pub vault: Box<Account<'info, Vault>>,

    /// CHECK: any wallet with a vault, tied to it by has_one
    pub owner: UncheckedAccount<'info>,

    #[account(
        mut,
        address = SPEND_CALLER @ QuartzError::InvalidSpendCaller,
    )]
    pub spend_caller: Signer<'info>,

    #[account(
        init,
        seeds = [b"spend_mule", owner.key().as_ref()],
        bump,
        payer = spend_caller,
        token::mint = usdc_mint,
        token::authority = vault,
    )]
    pub spend_mule: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(address = USDC_MINT @ QuartzError::InvalidMint)]
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

    pub token_program: Interface<'info, TokenInterface>,

    pub drift_program: Program<'info, Drift>,

    /// CHECK: instructions sysvar, address checked
    #[account(address = sysvar_instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// The spend is only released if the same transaction completes it for the
/// same user right after.
pub fn validate_complete_spend(complete: &Instruction, vault: &Pubkey, owner: &Pubkey) -> Result<()> {
    require_instruction(
        complete,
        &crate::ID,
        &crate::instruction::CompleteSpend::DISCRIMINATOR,
        QuartzError::IllegalSpendInstructions,
    )?;
    require_same_user(complete, vault, owner)
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, StartSpend<'info>>,
    amount_usdc_base_units: u64,
) -> Result<()> {
    require_top_level()?;
    let complete = load_relative_instruction(
        &ctx.accounts.instructions.to_account_info(),
        1,
        QuartzError::IllegalSpendInstructions,
    )?;
    validate_complete_spend(&complete, &ctx.accounts.vault.key(), &ctx.accounts.owner.key())?;

    let clock = Clock::get()?;
    ctx.accounts
        .vault
        .consume_spend_limit(amount_usdc_base_units, clock.slot)?;

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
                user_token_account: ctx.accounts.spend_mule.to_account_info(),
                token_program: ctx.accounts.token_program.to_account_info(),
            },
            signer,
        )
        .with_remaining_accounts(ctx.remaining_accounts.to_vec()),
        USDC_MARKET_INDEX,
        amount_usdc_base_units,
        false,
    )?;

    emit!(SpendStarted {
        vault: ctx.accounts.vault.key(),
        owner: owner_key,
        amount: amount_usdc_base_units,
        remaining_spend_limit_per_timeframe: ctx.accounts.vault.remaining_spend_limit_per_timeframe,
        slot: clock.slot,
    });

    msg!(
        "[quartz] spend started owner={} amount={} remaining={}",
        owner_key,
        amount_usdc_base_units,
        ctx.accounts.vault.remaining_spend_limit_per_timeframe
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::solana_program::instruction::AccountMeta;
    use crate::utils::get_vault_pda;

    fn complete_spend_ix(vault: Pubkey, owner: Pubkey) -> Instruction {
        Instruction {
            program_id: crate::ID,
            accounts: vec![
                AccountMeta::new(vault, false),
                AccountMeta::new_readonly(owner, false),
                AccountMeta::new(SPEND_CALLER, true),
            ],
            data: crate::instruction::CompleteSpend::DISCRIMINATOR.to_vec(),
        }
    }

    #[test]
    fn complete_spend_for_same_user_is_accepted() {
        let owner = Pubkey::new_unique();
        let (vault, _) = get_vault_pda(&owner);
        assert!(validate_complete_spend(&complete_spend_ix(vault, owner), &vault, &owner).is_ok());
    }

    #[test]
    fn complete_spend_for_other_user_is_rejected() {
        let owner = Pubkey::new_unique();
        let (vault, _) = get_vault_pda(&owner);
        let (other_vault, _) = get_vault_pda(&Pubkey::new_unique());
        let other = complete_spend_ix(other_vault, owner);
        let err = validate_complete_spend(&other, &vault, &owner).unwrap_err();
        assert_eq!(err, QuartzError::InvalidUserAccounts.into());
    }

    #[test]
    fn other_instruction_after_start_spend_is_rejected() {
        let (vault, owner) = (Pubkey::new_unique(), Pubkey::new_unique());
        let mut ix = complete_spend_ix(vault, owner);
        ix.data = crate::instruction::StartSpend::DISCRIMINATOR.to_vec();
        let err = validate_complete_spend(&ix, &vault, &owner).unwrap_err();
        assert_eq!(err, QuartzError::IllegalSpendInstructions.into());
    }
}
