use anchor_lang::prelude::*;
use anchor_lang::{Discriminator, InstructionData};

use super::invoke_with_context;
use crate::config::MARGINFI_PROGRAM_ID;

#[derive(Clone)]
pub struct Marginfi;

impl anchor_lang::Id for Marginfi {
    fn id() -> Pubkey {
        MARGINFI_PROGRAM_ID
    }
}

#[derive(AnchorSerialize)]
pub struct MarginfiAccountInitializeArgs {}

impl Discriminator for MarginfiAccountInitializeArgs {
    const DISCRIMINATOR: [u8; 8] = [43, 78, 61, 255, 148, 52, 249, 154];
}

impl InstructionData for MarginfiAccountInitializeArgs {}

pub struct MarginfiAccountInitialize<'info> {
    pub marginfi_group: AccountInfo<'info>,
    pub marginfi_account: AccountInfo<'info>,
    pub authority: AccountInfo<'info>,
    pub fee_payer: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
}

impl ToAccountMetas for MarginfiAccountInitialize<'_> {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new_readonly(*self.marginfi_group.key, false),
            AccountMeta::new(*self.marginfi_account.key, true),
            AccountMeta::new_readonly(*self.authority.key, true),
            AccountMeta::new(*self.fee_payer.key, true),
            AccountMeta::new_readonly(*self.system_program.key, false),
        ]
    }
}

impl<'info> ToAccountInfos<'info> for MarginfiAccountInitialize<'info> {
    fn to_account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.marginfi_group.clone(),
            self.marginfi_account.clone(),
            self.authority.clone(),
            self.fee_payer.clone(),
            self.system_program.clone(),
        ]
    }
}

pub fn marginfi_account_initialize<'info>(
    ctx: CpiContext<'_, '_, '_, 'info, MarginfiAccountInitialize<'info>>,
) -> Result<()> {
    invoke_with_context(ctx, MarginfiAccountInitializeArgs {}.data())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpi::sighash;

    #[test]
    fn discriminator_matches_marginfi_sighash() {
        assert_eq!(
            MarginfiAccountInitializeArgs::DISCRIMINATOR,
            sighash("marginfi_account_initialize")
        );
    }

    #[test]
    fn marginfi_account_signs_for_itself() {
        let keys: Vec<Pubkey> = (0..5).map(|_| Pubkey::new_unique()).collect();
        let mut lamports: Vec<u64> = vec![0; 5];
        let mut data: Vec<Vec<u8>> = vec![vec![]; 5];
        let owner = Pubkey::default();
        let mut infos = keys
            .iter()
            .zip(lamports.iter_mut())
            .zip(data.iter_mut())
            .map(|((key, lamports), data)| {
                AccountInfo::new(key, false, false, lamports, data, &owner, false, 0)
            });
        let mut next = || infos.next().unwrap();
        let accounts = MarginfiAccountInitialize {
            marginfi_group: next(),
            marginfi_account: next(),
            authority: next(),
            fee_payer: next(),
            system_program: next(),
        };

        let metas = accounts.to_account_metas(None);
        assert_eq!(metas.len(), 5);
        assert!(metas[1].is_signer && metas[1].is_writable);
        assert!(metas[2].is_signer && !metas[2].is_writable);
        assert!(metas[3].is_signer && metas[3].is_writable);
        assert!(!metas[0].is_signer);
        assert_eq!(metas[1].pubkey, keys[1]);
    }
}
