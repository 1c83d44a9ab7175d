use anchor_lang::prelude::*;
use anchor_lang::{Discriminator, InstructionData};

use super::invoke_with_context;
use crate::config::{MESSAGE_TRANSMITTER_PROGRAM_ID, TOKEN_MESSENGER_MINTER_PROGRAM_ID};

#[derive(Clone)]
pub struct MessageTransmitter;

impl anchor_lang::Id for MessageTransmitter {
    fn id() -> Pubkey {
        MESSAGE_TRANSMITTER_PROGRAM_ID
    }
}

#[derive(Clone)]
pub struct TokenMessengerMinter;

impl anchor_lang::Id for TokenMessengerMinter {
    fn id() -> Pubkey {
        TOKEN_MESSENGER_MINTER_PROGRAM_ID
    }
}

#[derive(AnchorSerialize, Clone, Debug, PartialEq, Eq)]
pub struct DepositForBurnWithCallerParams {
    pub amount: u64,
    pub destination_domain: u32,
    /// Recipient on the destination chain, left padded to 32 bytes
    pub mint_recipient: Pubkey,
    /// Only this address may receive the message on the destination chain
    pub destination_caller: Pubkey,
}

#[derive(AnchorSerialize)]
pub struct DepositForBurnWithCallerArgs {
    pub params: DepositForBurnWithCallerParams,
}

impl Discriminator for DepositForBurnWithCallerArgs {
    const DISCRIMINATOR: [u8; 8] = [167, 222, 19, 114, 85, 21, 14, 118];
}

impl InstructionData for DepositForBurnWithCallerArgs {}

#[derive(AnchorSerialize)]
pub struct ReclaimEventAccountArgs {
    pub attestation: Vec<u8>,
}

impl Discriminator for ReclaimEventAccountArgs {
    const DISCRIMINATOR: [u8; 8] = [94, 198, 180, 159, 131, 236, 15, 174];
}

impl InstructionData for ReclaimEventAccountArgs {}

/// Accounts for TokenMessengerMinter `deposit_for_burn_with_caller`.
pub struct DepositForBurn<'info> {
    pub owner: AccountInfo<'info>,
    pub event_rent_payer: AccountInfo<'info>,
    pub sender_authority_pda: AccountInfo<'info>,
    pub burn_token_account: AccountInfo<'info>,
    pub message_transmitter: AccountInfo<'info>,
    pub token_messenger: AccountInfo<'info>,
    pub remote_token_messenger: AccountInfo<'info>,
    pub token_minter: AccountInfo<'info>,
    pub local_token: AccountInfo<'info>,
    pub burn_token_mint: AccountInfo<'info>,
    pub message_sent_event_data: AccountInfo<'info>,
    pub message_transmitter_program: AccountInfo<'info>,
    pub token_messenger_minter_program: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
    pub event_authority: AccountInfo<'info>,
    pub program: AccountInfo<'info>,
}

impl ToAccountMetas for DepositForBurn<'_> {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new_readonly(*self.owner.key, true),
            AccountMeta::new(*self.event_rent_payer.key, true),
            AccountMeta::new_readonly(*self.sender_authority_pda.key, false),
            AccountMeta::new(*self.burn_token_account.key, false),
            AccountMeta::new(*self.message_transmitter.key, false),
            AccountMeta::new_readonly(*self.token_messenger.key, false),
            AccountMeta::new_readonly(*self.remote_token_messenger.key, false),
            AccountMeta::new_readonly(*self.token_minter.key, false),
            AccountMeta::new(*self.local_token.key, false),
            AccountMeta::new(*self.burn_token_mint.key, false),
            AccountMeta::new(*self.message_sent_event_data.key, true),
            AccountMeta::new_readonly(*self.message_transmitter_program.key, false),
            AccountMeta::new_readonly(*self.token_messenger_minter_program.key, false),
            AccountMeta::new_readonly(*self.token_program.key, false),
            AccountMeta::new_readonly(*self.system_program.key, false),
            AccountMeta::new_readonly(*self.event_authority.key, false),
            AccountMeta::new_readonly(*self.program.key, false),
        ]
    }
}

impl<'info> ToAccountInfos<'info> for DepositForBurn<'info> {
    fn to_account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.owner.clone(),
            self.event_rent_payer.clone(),
            self.sender_authority_pda.clone(),
            self.burn_token_account.clone(),
            self.message_transmitter.clone(),
            self.token_messenger.clone(),
            self.remote_token_messenger.clone(),
            self.token_minter.clone(),
            self.local_token.clone(),
            self.burn_token_mint.clone(),
            self.message_sent_event_data.clone(),
            self.message_transmitter_program.clone(),
            self.token_messenger_minter_program.clone(),
            self.token_program.clone(),
            self.system_program.clone(),
            self.event_authority.clone(),
            self.program.clone(),
        ]
    }
}

/// Accounts for MessageTransmitter `reclaim_event_account`.
pub struct ReclaimEventAccount<'info> {
    pub payee: AccountInfo<'info>,
    pub message_transmitter: AccountInfo<'info>,
    pub message_sent_event_data: AccountInfo<'info>,
}

impl ToAccountMetas for ReclaimEventAccount<'_> {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(*self.payee.key, true),
            AccountMeta::new(*self.message_transmitter.key, false),
            AccountMeta::new(*self.message_sent_event_data.key, false),
        ]
    }
}

impl<'info> ToAccountInfos<'info> for ReclaimEventAccount<'info> {
    fn to_account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.payee.clone(),
            self.message_transmitter.clone(),
            self.message_sent_event_data.clone(),
        ]
    }
}

pub fn deposit_for_burn_with_caller<'info>(
    ctx: CpiContext<'_, '_, '_, 'info, DepositForBurn<'info>>,
    params: DepositForBurnWithCallerParams,
) -> Result<()> {
    invoke_with_context(ctx, DepositForBurnWithCallerArgs { params }.data())
}

pub fn reclaim_event_account<'info>(
    ctx: CpiContext<'_, '_, '_, 'info, ReclaimEventAccount<'info>>,
    attestation: Vec<u8>,
) -> Result<()> {
    invoke_with_context(ctx, ReclaimEventAccountArgs { attestation }.data())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpi::sighash;

    #[test]
    fn discriminators_match_cctp_sighashes() {
        assert_eq!(
            DepositForBurnWithCallerArgs::DISCRIMINATOR,
            sighash("deposit_for_burn_with_caller")
        );
        assert_eq!(ReclaimEventAccountArgs::DISCRIMINATOR, sighash("reclaim_event_account"));
    }

    #[test]
    fn deposit_for_burn_params_layout() {
        let recipient = Pubkey::new_unique();
        let caller = Pubkey::new_unique();
        let data = DepositForBurnWithCallerArgs {
            params: DepositForBurnWithCallerParams {
                amount: 25_000_000,
                destination_domain: 6,
                mint_recipient: recipient,
                destination_caller: caller,
            },
        }
        .data();

        assert_eq!(data.len(), 8 + 8 + 4 + 32 + 32);
        assert_eq!(data[8..16], 25_000_000u64.to_le_bytes());
        assert_eq!(data[16..20], 6u32.to_le_bytes());
        assert_eq!(data[20..52], recipient.to_bytes());
        assert_eq!(data[52..84], caller.to_bytes());
    }

    #[test]
    fn attestation_is_length_prefixed() {
        let data = ReclaimEventAccountArgs {
            attestation: vec![7; 65],
        }
        .data();
        assert_eq!(data[8..12], 65u32.to_le_bytes());
        assert_eq!(data.len(), 8 + 4 + 65);
    }
}
