use crate::{
    errors::QuartzError,
    events::VaultUpgraded,
    state::{LegacyVault, SpendLimits, Vault},
};
use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};

#[derive(Accounts)]
pub struct UpgradeVault<'info> {
    /// CHECK: legacy layout, parsed and validated by the handler
    #[account(
        mut,
        seeds = [b"vault", owner.key().as_ref()],
        bump,
        owner = crate::ID @ QuartzError::InvalidVaultAccount,
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

    pub system_program: Program<'info, System>,
}

/// Lamports needed to make the vault rent exempt at its new size.
#[derive(Debug, PartialEq, Eq)]
pub enum RentAdjustment {
    TopUp(u64),
    Refund(u64),
    None,
}

impl RentAdjustment {
    pub fn new(current_lamports: u64, rent_required: u64) -> Self {
        match current_lamports.cmp(&rent_required) {
            std::cmp::Ordering::Less => Self::TopUp(rent_required - current_lamports),
            std::cmp::Ordering::Greater => Self::Refund(current_lamports - rent_required),
            std::cmp::Ordering::Equal => Self::None,
        }
    }
}

pub fn handler(
    ctx: Context<UpgradeVault>,
    spend_limit_per_transaction: u64,
    spend_limit_per_timeframe: u64,
    extend_spend_limit_per_timeframe_reset_slot_amount: u64,
) -> Result<()> {
    let vault_info = ctx.accounts.vault.to_account_info();

    let legacy = {
        let data = vault_info.try_borrow_data()?;
        LegacyVault::try_from_bytes(&data)?
    };
    require_keys_eq!(
        legacy.owner,
        ctx.accounts.owner.key(),
        QuartzError::InvalidVaultOwner
    );
    require!(legacy.bump == ctx.bumps.vault, QuartzError::InvalidVaultAccount);

    // Pool covers the rent difference in either direction
    let rent_required = Rent::get()?.minimum_balance(Vault::LEN);
    match RentAdjustment::new(vault_info.lamports(), rent_required) {
        RentAdjustment::TopUp(shortfall) => {
            let rent_payer_seeds = &[b"init_rent_payer".as_ref(), &[ctx.bumps.init_rent_payer]];
            system_program::transfer(
                CpiContext::new_with_signer(
                    ctx.accounts.system_program.to_account_info(),
                    Transfer {
                        from: ctx.accounts.init_rent_payer.to_account_info(),
                        to: vault_info.clone(),
                    },
                    &[&rent_payer_seeds[..]],
                ),
                shortfall,
            )?;
        }
        RentAdjustment::Refund(excess) => {
            ctx.accounts.vault.sub_lamports(excess)?;
            ctx.accounts.init_rent_payer.add_lamports(excess)?;
        }
        RentAdjustment::None => {}
    }

    vault_info.realloc(Vault::LEN, false)?;

    let clock = Clock::get()?;
    let limits = SpendLimits {
        spend_limit_per_transaction,
        spend_limit_per_timeframe,
        extend_spend_limit_per_timeframe_reset_slot_amount,
    };
    let vault = Vault::new(legacy.owner, legacy.bump, limits, clock.slot)?;
    {
        let mut data = vault_info.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data[..];
        vault.try_serialize(&mut writer)?;
    }

    emit!(VaultUpgraded {
        vault: vault_info.key(),
        owner: legacy.owner,
        spend_limit_per_transaction,
        spend_limit_per_timeframe,
        timestamp: clock.unix_timestamp,
    });

    msg!("[quartz] vault upgraded owner={}", legacy.owner);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_vault_is_topped_up() {
        assert_eq!(RentAdjustment::new(1_000, 1_500), RentAdjustment::TopUp(500));
    }

    #[test]
    fn oversized_vault_refunds_excess() {
        assert_eq!(RentAdjustment::new(2_000, 1_500), RentAdjustment::Refund(500));
    }

    #[test]
    fn exact_rent_moves_nothing() {
        assert_eq!(RentAdjustment::new(1_500, 1_500), RentAdjustment::None);
    }
}
