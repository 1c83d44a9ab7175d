use crate::{
    config::{DOMAIN_BASE, PROVIDER_BASE_ADDRESS, QUARTZ_CALLER_BASE_ADDRESS},
    cpi::{
        cctp::{self, DepositForBurn, DepositForBurnWithCallerParams},
        MessageTransmitter, TokenMessengerMinter,
    },
    errors::QuartzError,
    utils::evm_address_to_solana,
};
use anchor_lang::prelude::*;

/// CCTP accounts needed to burn vault USDC and mint it to the card provider
/// on Base. Shared by `top_up_card` and `complete_spend`.
#[derive(Accounts)]
pub struct BridgeAccounts<'info> {
    /// CHECK: address fixed to the card provider's Base address
    #[account(
        constraint = provider_base_address.key()
            == evm_address_to_solana(PROVIDER_BASE_ADDRESS)? @ QuartzError::InvalidEvmAddress,
    )]
    pub provider_base_address: UncheckedAccount<'info>,

    /// CHECK: address fixed to the Base contract allowed to receive the message
    #[account(
        constraint = quartz_caller_base_address.key()
            == evm_address_to_solana(QUARTZ_CALLER_BASE_ADDRESS)? @ QuartzError::InvalidEvmAddress,
    )]
    pub quartz_caller_base_address: UncheckedAccount<'info>,

    /// CHECK: lamport pool for CCTP event accounts, address checked by seeds
    #[account(
        mut,
        seeds = [b"bridge_rent_payer"],
        bump,
    )]
    pub bridge_rent_payer: UncheckedAccount<'info>,

    /// CHECK: passed through to CCTP, which performs the checks
    pub sender_authority_pda: UncheckedAccount<'info>,

    /// CHECK: passed through to CCTP, which performs the checks
    #[account(mut)]
    pub message_transmitter: UncheckedAccount<'info>,

    /// CHECK: passed through to CCTP, which performs the checks
    pub token_messenger: UncheckedAccount<'info>,

    /// CHECK: passed through to CCTP, which performs the checks
    pub remote_token_messenger: UncheckedAccount<'info>,

    /// CHECK: passed through to CCTP, which performs the checks
    pub token_minter: UncheckedAccount<'info>,

    /// CHECK: passed through to CCTP, which performs the checks
    #[account(mut)]
    pub local_token: UncheckedAccount<'info>,

    #[account(mut)]
    pub message_sent_event_data: Signer<'info>,

    /// CHECK: passed through to CCTP, which performs the checks
    pub event_authority: UncheckedAccount<'info>,

    pub message_transmitter_program: Program<'info, MessageTransmitter>,

    pub token_messenger_minter_program: Program<'info, TokenMessengerMinter>,
}

impl<'info> BridgeAccounts<'info> {
    /// Burns `amount` USDC from `burn_token_account` (owned by the vault) and
    /// sends it to the provider on Base.
    #[allow(clippy::too_many_arguments)]
    pub fn deposit_for_burn(
        &self,
        bridge_rent_payer_bump: u8,
        vault: AccountInfo<'info>,
        vault_seeds: &[&[u8]],
        burn_token_account: AccountInfo<'info>,
        usdc_mint: AccountInfo<'info>,
        token_program: AccountInfo<'info>,
        system_program: AccountInfo<'info>,
        amount: u64,
    ) -> Result<()> {
        let rent_payer_seeds: &[&[u8]] = &[b"bridge_rent_payer", &[bridge_rent_payer_bump]];
        let signer = &[rent_payer_seeds, vault_seeds];

        let cpi_ctx = CpiContext::new_with_signer(
            self.token_messenger_minter_program.to_account_info(),
            DepositForBurn {
                owner: vault,
                event_rent_payer: self.bridge_rent_payer.to_account_info(),
                sender_authority_pda: self.sender_authority_pda.to_account_info(),
                burn_token_account,
                message_transmitter: self.message_transmitter.to_account_info(),
                token_messenger: self.token_messenger.to_account_info(),
                remote_token_messenger: self.remote_token_messenger.to_account_info(),
                token_minter: self.token_minter.to_account_info(),
                local_token: self.local_token.to_account_info(),
                burn_token_mint: usdc_mint,
                message_sent_event_data: self.message_sent_event_data.to_account_info(),
                message_transmitter_program: self.message_transmitter_program.to_account_info(),
                token_messenger_minter_program: self
                    .token_messenger_minter_program
                    .to_account_info(),
                token_program,
                system_program,
                event_authority: self.event_authority.to_account_info(),
                program: self.token_messenger_minter_program.to_account_info(),
            },
            signer,
        );

        cctp::deposit_for_burn_with_caller(
            cpi_ctx,
            DepositForBurnWithCallerParams {
                amount,
                destination_domain: DOMAIN_BASE,
                mint_recipient: self.provider_base_address.key(),
                destination_caller: self.quartz_caller_base_address.key(),
            },
        )
    }
}
