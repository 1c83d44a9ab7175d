#![allow(unexpected_cfgs)]

//! # Quartz: Solana Anchor Program
//!
//! Per-user vault PDA that holds a Drift account and backs a card:
//!  - deposit / withdraw SPL tokens through Drift spot markets
//!  - card top-ups and spend-limited card spends bridged to Base over CCTP
//!  - collateral repay, atomic or via a Jupiter swap, checked against Pyth
//!  - on-chain events for off-chain observability

use anchor_lang::prelude::*;

pub mod config;
pub mod cpi;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;
pub mod utils;

use instructions::*;

#[cfg(not(feature = "no-entrypoint"))]
use solana_security_txt::security_txt;

declare_id!("6JjHXLheGSNvvexgzMthEcgjkcirDrGduc3HAKB2P1v2");

#[cfg(not(feature = "no-entrypoint"))]
security_txt! {
    name: "Quartz",
    project_url: "https://quartzpay.io/",
    contacts: "email:iarla@quartzpay.io",
    policy: "https://github.com/quartz-labs/quartz-protocol/blob/main/SECURITY.md",
    preferred_languages: "en",
    source_code: "https://github.com/quartz-labs/quartz-protocol"
}

#[program]
pub mod quartz {
    use super::*;

    // Admin

    /// Reclaim the rent of a CCTP event account once its message is attested.
    pub fn reclaim_bridge_rent(ctx: Context<ReclaimBridgeRent>, attestation: Vec<u8>) -> Result<()> {
        reclaim_bridge_rent::handler(ctx, attestation)
    }

    // User

    /// Create the vault PDA for the signing owner, with spend limits.
    pub fn init_user(
        ctx: Context<InitUser>,
        requires_marginfi_account: bool,
        spend_limit_per_transaction: u64,
        spend_limit_per_timeframe: u64,
        extend_spend_limit_per_timeframe_reset_slot_amount: u64,
    ) -> Result<()> {
        init_user::handler(
            ctx,
            requires_marginfi_account,
            spend_limit_per_transaction,
            spend_limit_per_timeframe,
            extend_spend_limit_per_timeframe_reset_slot_amount,
        )
    }

    /// Close the vault once its Drift account is gone, refunding the fee.
    pub fn close_user(ctx: Context<CloseUser>) -> Result<()> {
        close_user::handler(ctx)
    }

    /// Migrate a vault created before spend limits existed.
    pub fn upgrade_vault(
        ctx: Context<UpgradeVault>,
        spend_limit_per_transaction: u64,
        spend_limit_per_timeframe: u64,
        extend_spend_limit_per_timeframe_reset_slot_amount: u64,
    ) -> Result<()> {
        upgrade_vault::handler(
            ctx,
            spend_limit_per_transaction,
            spend_limit_per_timeframe,
            extend_spend_limit_per_timeframe_reset_slot_amount,
        )
    }

    pub fn init_drift_account(ctx: Context<InitDriftAccount>) -> Result<()> {
        init_drift_account::handler(ctx)
    }

    pub fn close_drift_account(ctx: Context<CloseDriftAccount>) -> Result<()> {
        close_drift_account::handler(ctx)
    }

    /// Owner replaces the vault's spend limits.
    pub fn adjust_spend_limits(
        ctx: Context<AdjustSpendLimits>,
        spend_limit_per_transaction: u64,
        spend_limit_per_timeframe: u64,
        extend_spend_limit_per_timeframe_reset_slot_amount: u64,
    ) -> Result<()> {
        adjust_spend_limits::handler(
            ctx,
            spend_limit_per_transaction,
            spend_limit_per_timeframe,
            extend_spend_limit_per_timeframe_reset_slot_amount,
        )
    }

    // Balance

    /// Deposit SPL tokens from the owner into the vault's Drift account.
    pub fn deposit<'info>(
        ctx: Context<'_, '_, '_, 'info, Deposit<'info>>,
        amount_base_units: u64,
        drift_market_index: u16,
        reduce_only: bool,
    ) -> Result<()> {
        deposit::handler(ctx, amount_base_units, drift_market_index, reduce_only)
    }

    /// Withdraw SPL tokens from Drift back to the owner.
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
        amount_base_units: u64,
        drift_market_index: u16,
        reduce_only: bool,
    ) -> Result<()> {
        withdraw::handler(ctx, amount_base_units, drift_market_index, reduce_only)
    }

    /// Owner bridges USDC to the card provider.
    pub fn top_up_card<'info>(
        ctx: Context<'_, '_, '_, 'info, TopUpCard<'info>>,
        amount_usdc_base_units: u64,
    ) -> Result<()> {
        top_up_card::handler(ctx, amount_usdc_base_units)
    }

    // Spend

    /// Spend caller pulls a card payment out of Drift, within the spend limits.
    pub fn start_spend<'info>(
        ctx: Context<'_, '_, '_, 'info, StartSpend<'info>>,
        amount_usdc_base_units: u64,
    ) -> Result<()> {
        start_spend::handler(ctx, amount_usdc_base_units)
    }

    /// Bridges the payment pulled by `start_spend`.
    pub fn complete_spend(ctx: Context<CompleteSpend>) -> Result<()> {
        complete_spend::handler(ctx)
    }

    // Collateral repay

    /// Repay a loan with tokens from the owner's wallet. Must be followed by
    /// `end_collateral_repay`.
    pub fn start_collateral_repay<'info>(
        ctx: Context<'_, '_, '_, 'info, StartCollateralRepay<'info>>,
        amount_deposit_base_units: u64,
        deposit_market_index: u16,
    ) -> Result<()> {
        start_collateral_repay::handler(ctx, amount_deposit_base_units, deposit_market_index)
    }

    /// Pay the owner back in collateral, at no worse than oracle price.
    pub fn end_collateral_repay<'info>(
        ctx: Context<'_, '_, '_, 'info, EndCollateralRepay<'info>>,
        amount_withdraw_base_units: u64,
        withdraw_market_index: u16,
    ) -> Result<()> {
        end_collateral_repay::handler(ctx, amount_withdraw_base_units, withdraw_market_index)
    }

    /// Opens a swap repay: Jupiter exact_out_route, deposit, withdraw.
    pub fn collateral_repay_start(
        ctx: Context<CollateralRepayStart>,
        start_withdraw_balance: u64,
    ) -> Result<()> {
        collateral_repay_start::handler(ctx, start_withdraw_balance)
    }

    pub fn collateral_repay_deposit<'info>(
        ctx: Context<'_, '_, '_, 'info, CollateralRepayDeposit<'info>>,
        deposit_market_index: u16,
    ) -> Result<()> {
        collateral_repay_deposit::handler(ctx, deposit_market_index)
    }

    pub fn collateral_repay_withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, CollateralRepayWithdraw<'info>>,
        withdraw_market_index: u16,
    ) -> Result<()> {
        collateral_repay_withdraw::handler(ctx, withdraw_market_index)
    }
}
