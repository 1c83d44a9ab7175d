use crate::{
    config::{ANCHOR_DISCRIMINATOR, U64_SIZE},
    cpi::{
        drift::{self, Deposit as DriftDeposit},
        Drift,
    },
    errors::QuartzError,
    events::CollateralRepayStarted,
    instructions::vault_spl::sweep_vault_spl,
    state::{CollateralRepayLedger, Vault},
    utils::{
        load_relative_instruction, read_u16, require_instruction, require_same_user,
        require_top_level, validate_drift_market,
    },
};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, sysvar::instructions as sysvar_instructions};
use anchor_lang::Discriminator;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked},
};

/// `end_collateral_repay(amount: u64, withdraw_market_index: u16)`
pub const END_COLLATERAL_REPAY_MARKET_INDEX_OFFSET: usize = ANCHOR_DISCRIMINATOR + U64_SIZE;

#[derive(Accounts)]
#[instruction(amount_deposit_base_units: u64, deposit_market_index: u16)]
pub struct StartCollateralRepay<'info> {
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

    #[account(
        init,
        seeds = [b"collateral_repay_ledger", owner.key().as_ref()],
        bump,
        payer = owner,
        space = CollateralRepayLedger::LEN,
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

/// The repay must be closed out by `end_collateral_repay` for the same user
/// on another market.
pub fn validate_end_collateral_repay(
    end: &Instruction,
    vault: &Pubkey,
    owner: &Pubkey,
    deposit_market_index: u16,
) -> Result<()> {
    require_instruction(
        end,
        &crate::ID,
        &crate::instruction::EndCollateralRepay::DISCRIMINATOR,
        QuartzError::IllegalCollateralRepayInstructions,
    )?;
    require_same_user(end, vault, owner)?;

    let withdraw_market_index = read_u16(end, END_COLLATERAL_REPAY_MARKET_INDEX_OFFSET)?;
    require!(
        withdraw_market_index != deposit_market_index,
        QuartzError::IdenticalCollateralRepayMarkets
    );
    Ok(())
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, StartCollateralRepay<'info>>,
    amount_deposit_base_units: u64,
    deposit_market_index: u16,
) -> Result<()> {
    require_top_level()?;
    let end = load_relative_instruction(
        &ctx.accounts.instructions.to_account_info(),
        1,
        QuartzError::IllegalCollateralRepayInstructions,
    )?;
    validate_end_collateral_repay(
        &end,
        &ctx.accounts.vault.key(),
        &ctx.accounts.owner.key(),
        deposit_market_index,
    )?;
    validate_drift_market(deposit_market_index, &ctx.accounts.spl_mint.key())?;

    let owner_key = ctx.accounts.owner.key();
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
        amount_deposit_base_units,
        ctx.accounts.spl_mint.decimals,
    )?;

    // reduce_only: this deposit may only pay down a loan
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
        amount_deposit_base_units,
        true,
    )?;

    let refunded = sweep_vault_spl(
        &mut ctx.accounts.vault_spl,
        ctx.accounts.owner_spl.to_account_info(),
        &ctx.accounts.spl_mint,
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        signer,
    )?;
    let deposited = amount_deposit_base_units
        .checked_sub(refunded)
        .ok_or(QuartzError::MathOverflow)?;

    ctx.accounts.ledger.deposit = deposited;

    let clock = Clock::get()?;
    emit!(CollateralRepayStarted {
        vault: ctx.accounts.vault.key(),
        owner: owner_key,
        deposit_market_index,
        deposit_amount: deposited,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "[quartz] collateral repay started market={} deposited={} refunded={}",
        deposit_market_index,
        deposited,
        refunded
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::solana_program::instruction::AccountMeta;

    fn end_ix(vault: Pubkey, owner: Pubkey, amount: u64, market_index: u16) -> Instruction {
        let mut data = crate::instruction::EndCollateralRepay::DISCRIMINATOR.to_vec();
        data.extend_from_slice(&amount.to_le_bytes());
        data.extend_from_slice(&market_index.to_le_bytes());
        Instruction {
            program_id: crate::ID,
            accounts: vec![AccountMeta::new(vault, false), AccountMeta::new(owner, true)],
            data,
        }
    }

    #[test]
    fn end_on_other_market_is_accepted() {
        let (vault, owner) = (Pubkey::new_unique(), Pubkey::new_unique());
        let end = end_ix(vault, owner, 1_000, 1);
        assert!(validate_end_collateral_repay(&end, &vault, &owner, 0).is_ok());
    }

    #[test]
    fn end_on_same_market_is_rejected() {
        let (vault, owner) = (Pubkey::new_unique(), Pubkey::new_unique());
        let end = end_ix(vault, owner, 1_000, 1);
        let err = validate_end_collateral_repay(&end, &vault, &owner, 1).unwrap_err();
        assert_eq!(err, QuartzError::IdenticalCollateralRepayMarkets.into());
    }

    #[test]
    fn missing_end_instruction_is_rejected() {
        let (vault, owner) = (Pubkey::new_unique(), Pubkey::new_unique());
        let mut ix = end_ix(vault, owner, 1_000, 1);
        ix.data[..8].copy_from_slice(&crate::instruction::Deposit::DISCRIMINATOR);
        let err = validate_end_collateral_repay(&ix, &vault, &owner, 0).unwrap_err();
        assert_eq!(err, QuartzError::IllegalCollateralRepayInstructions.into());
    }

    #[test]
    fn truncated_end_data_is_rejected() {
        let (vault, owner) = (Pubkey::new_unique(), Pubkey::new_unique());
        let mut ix = end_ix(vault, owner, 1_000, 1);
        ix.data.truncate(END_COLLATERAL_REPAY_MARKET_INDEX_OFFSET);
        let err = validate_end_collateral_repay(&ix, &vault, &owner, 0).unwrap_err();
        assert_eq!(err, QuartzError::DeserializationError.into());
    }
}
