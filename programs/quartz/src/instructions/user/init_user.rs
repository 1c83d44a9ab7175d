use crate::{
    config::INIT_ACCOUNT_RENT_FEE,
    cpi::{
        marginfi::{self, MarginfiAccountInitialize},
        Marginfi,
    },
    errors::QuartzError,
    events::UserInitialised,
    state::{SpendLimits, Vault},
    utils::validate_account_fresh,
};
use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, CreateAccount, Transfer};

#[derive(Accounts)]
pub struct InitUser<'info> {
    /// CHECK: created by the handler once it is confirmed fresh
    #[account(
        mut,
        seeds = [b"vault", owner.key().as_ref()],
        bump,
    )]
    pub vault: UncheckedAccount<'info>,

    #[account(mut)]
    pub owner: Signer<'info>,

    /// CHECK: lamport pool, address checked by seeds
    #[account(
        mut,
        seeds = [b"init_rent_payer"],
        bump,
    )]
    pub init_rent_payer: UncheckedAccount<'info>,

    /// CHECK: passed through to marginfi, which performs the checks
    pub marginfi_group: Option<UncheckedAccount<'info>>,

    #[account(mut)]
    pub marginfi_account: Option<Signer<'info>>,

    pub marginfi_program: Option<Program<'info, Marginfi>>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<InitUser>,
    requires_marginfi_account: bool,
    spend_limit_per_transaction: u64,
    spend_limit_per_timeframe: u64,
    extend_spend_limit_per_timeframe_reset_slot_amount: u64,
) -> Result<()> {
    let vault_info = ctx.accounts.vault.to_account_info();
    validate_account_fresh(&vault_info)?;

    let clock = Clock::get()?;
    let owner_key = ctx.accounts.owner.key();
    let vault_bump = ctx.bumps.vault;
    let vault_seeds = &[b"vault".as_ref(), owner_key.as_ref(), &[vault_bump]];
    let rent_payer_seeds = &[b"init_rent_payer".as_ref(), &[ctx.bumps.init_rent_payer]];
    let signer = &[&rent_payer_seeds[..], &vault_seeds[..]];

    // Owner pays a flat fee, the pool covers the actual rent
    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            Transfer {
                from: ctx.accounts.owner.to_account_info(),
                to: ctx.accounts.init_rent_payer.to_account_info(),
            },
        ),
        INIT_ACCOUNT_RENT_FEE,
    )?;

    let rent = Rent::get()?.minimum_balance(Vault::LEN);
    system_program::create_account(
        CpiContext::new_with_signer(
            ctx.accounts.system_program.to_account_info(),
            CreateAccount {
                from: ctx.accounts.init_rent_payer.to_account_info(),
                to: vault_info.clone(),
            },
            signer,
        ),
        rent,
        Vault::LEN as u64,
        &crate::ID,
    )?;

    let limits = SpendLimits {
        spend_limit_per_transaction,
        spend_limit_per_timeframe,
        extend_spend_limit_per_timeframe_reset_slot_amount,
    };
    let vault = Vault::new(owner_key, vault_bump, limits, clock.slot)?;
    {
        let mut data = vault_info.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data[..];
        vault.try_serialize(&mut writer)?;
    }

    let marginfi_account = if requires_marginfi_account {
        let (Some(group), Some(account), Some(program)) = (
            &ctx.accounts.marginfi_group,
            &ctx.accounts.marginfi_account,
            &ctx.accounts.marginfi_program,
        ) else {
            return err!(QuartzError::MissingMarginfiAccounts);
        };

        let lamports_before = vault_info.lamports();
        marginfi::marginfi_account_initialize(CpiContext::new_with_signer(
            program.to_account_info(),
            MarginfiAccountInitialize {
                marginfi_group: group.to_account_info(),
                marginfi_account: account.to_account_info(),
                authority: vault_info.clone(),
                fee_payer: ctx.accounts.init_rent_payer.to_account_info(),
                system_program: ctx.accounts.system_program.to_account_info(),
            },
            signer,
        ))?;
        require!(
            vault_info.lamports() >= lamports_before,
            QuartzError::IllegalVaultCpiModification
        );

        Some(account.key())
    } else {
        None
    };

    emit!(UserInitialised {
        vault: vault_info.key(),
        owner: owner_key,
        marginfi_account,
        spend_limit_per_transaction,
        spend_limit_per_timeframe,
        next_spend_limit_per_timeframe_reset_slot: vault.next_spend_limit_per_timeframe_reset_slot,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "[quartz] user initialised owner={} vault={} marginfi={}",
        owner_key,
        vault_info.key(),
        marginfi_account.is_some()
    );
    Ok(())
}
