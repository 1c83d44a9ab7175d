use crate::{
    config::{SPEND_CALLER, USDC_MINT},
    errors::QuartzError,
    events::SpendCompleted,
    instructions::bridge::*,
    state::Vault,
    utils::{load_relative_instruction, require_instruction, require_same_user, require_top_level},
};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, sysvar::instructions as sysvar_instructions};
use anchor_lang::Discriminator;
use anchor_spl::token_interface::{close_account, CloseAccount, Mint, TokenAccount, TokenInterface};

#[derive(Accounts)]
pub struct CompleteSpend<'info> {
    #[account(
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
        mut,
        seeds = [b"spend_mule", owner.key().as_ref()],
        bump,
        token::mint = usdc_mint,
        token::authority = vault,
    )]
    pub spend_mule: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        address = USDC_MINT @ QuartzError::InvalidMint,
    )]
    pub usdc_mint: Box<InterfaceAccount<'info, Mint>>,

    pub bridge: BridgeAccounts<'info>,

    pub token_program: Interface<'info, TokenInterface>,

    /// CHECK: instructions sysvar, address checked
    #[account(address = sysvar_instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn validate_start_spend(start: &Instruction, vault: &Pubkey, owner: &Pubkey) -> Result<()> {
    require_instruction(
        start,
        &crate::ID,
        &crate::instruction::StartSpend::DISCRIMINATOR,
        QuartzError::IllegalSpendInstructions,
    )?;
    require_same_user(start, vault, owner)
}

pub fn handler(ctx: Context<CompleteSpend>) -> Result<()> {
    require_top_level()?;
    let start = load_relative_instruction(
        &ctx.accounts.instructions.to_account_info(),
        -1,
        QuartzError::IllegalSpendInstructions,
    )?;
    validate_start_spend(&start, &ctx.accounts.vault.key(), &ctx.accounts.owner.key())?;

    let owner_key = ctx.accounts.owner.key();
    let vault_seeds = &[b"vault".as_ref(), owner_key.as_ref(), &[ctx.accounts.vault.bump]];
    let signer = &[&vault_seeds[..]];
    let amount = ctx.accounts.spend_mule.amount;

    ctx.accounts.bridge.deposit_for_burn(
        ctx.bumps.bridge.bridge_rent_payer,
        ctx.accounts.vault.to_account_info(),
        vault_seeds,
        ctx.accounts.spend_mule.to_account_info(),
        ctx.accounts.usdc_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
        amount,
    )?;

    // Mule rent goes back to the caller that paid for it in start_spend
    close_account(CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        CloseAccount {
            account: ctx.accounts.spend_mule.to_account_info(),
            destination: ctx.accounts.spend_caller.to_account_info(),
            authority: ctx.accounts.vault.to_account_info(),
        },
        signer,
    ))?;

    let clock = Clock::get()?;
    emit!(SpendCompleted {
        vault: ctx.accounts.vault.key(),
        owner: owner_key,
        amount,
        timestamp: clock.unix_timestamp,
    });

    msg!("[quartz] spend completed owner={} amount={}", owner_key, amount);
    Ok(())
}
