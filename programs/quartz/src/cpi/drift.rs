use anchor_lang::prelude::*;
use anchor_lang::{Discriminator, InstructionData};

use super::invoke_with_context;
use crate::config::DRIFT_PROGRAM_ID;

#[derive(Clone)]
pub struct Drift;

impl anchor_lang::Id for Drift {
    fn id() -> Pubkey {
        DRIFT_PROGRAM_ID
    }
}

macro_rules! drift_instruction {
    ($name:ident, $discriminator:expr $(, $field:ident: $ty:ty)*) => {
        #[derive(AnchorSerialize)]
        pub struct $name {
            $(pub $field: $ty,)*
        }

        impl Discriminator for $name {
            const DISCRIMINATOR: [u8; 8] = $discriminator;
        }

        impl InstructionData for $name {}
    };
}

drift_instruction!(InitializeUserStatsArgs, [254, 243, 72, 98, 251, 130, 168, 213]);
drift_instruction!(
    InitializeUserArgs,
    [111, 17, 185, 250, 60, 122, 38, 254],
    sub_account_id: u16,
    name: [u8; 32]
);
drift_instruction!(DeleteUserArgs, [186, 85, 17, 249, 219, 231, 98, 251]);
drift_instruction!(
    DepositArgs,
    [242, 35, 198, 137, 82, 225, 242, 182],
    market_index: u16,
    amount: u64,
    reduce_only: bool
);
drift_instruction!(
    WithdrawArgs,
    [183, 18, 70, 156, 148, 109, 161, 34],
    market_index: u16,
    amount: u64,
    reduce_only: bool
);

// ─── Accounts ────────────────────────────────────────────────────────────────

pub struct InitializeUserStats<'info> {
    pub user_stats: AccountInfo<'info>,
    pub state: AccountInfo<'info>,
    pub authority: AccountInfo<'info>,
    pub payer: AccountInfo<'info>,
    pub rent: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
}

pub struct InitializeUser<'info> {
    pub user: AccountInfo<'info>,
    pub user_stats: AccountInfo<'info>,
    pub state: AccountInfo<'info>,
    pub authority: AccountInfo<'info>,
    pub payer: AccountInfo<'info>,
    pub rent: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
}

/// Drift refunds the user account rent to `authority`, so it is writable.
pub struct DeleteUser<'info> {
    pub user: AccountInfo<'info>,
    pub user_stats: AccountInfo<'info>,
    pub state: AccountInfo<'info>,
    pub authority: AccountInfo<'info>,
}

pub struct Deposit<'info> {
    pub state: AccountInfo<'info>,
    pub user: AccountInfo<'info>,
    pub user_stats: AccountInfo<'info>,
    pub authority: AccountInfo<'info>,
    pub spot_market_vault: AccountInfo<'info>,
    pub user_token_account: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
}

pub struct Withdraw<'info> {
    pub state: AccountInfo<'info>,
    pub user: AccountInfo<'info>,
    pub user_stats: AccountInfo<'info>,
    pub authority: AccountInfo<'info>,
    pub spot_market_vault: AccountInfo<'info>,
    pub drift_signer: AccountInfo<'info>,
    pub user_token_account: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
}

impl ToAccountMetas for InitializeUserStats<'_> {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(*self.user_stats.key, false),
            AccountMeta::new(*self.state.key, false),
            AccountMeta::new_readonly(*self.authority.key, true),
            AccountMeta::new(*self.payer.key, true),
            AccountMeta::new_readonly(*self.rent.key, false),
            AccountMeta::new_readonly(*self.system_program.key, false),
        ]
    }
}

impl<'info> ToAccountInfos<'info> for InitializeUserStats<'info> {
    fn to_account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.user_stats.clone(),
            self.state.clone(),
            self.authority.clone(),
            self.payer.clone(),
            self.rent.clone(),
            self.system_program.clone(),
        ]
    }
}

impl ToAccountMetas for InitializeUser<'_> {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(*self.user.key, false),
            AccountMeta::new(*self.user_stats.key, false),
            AccountMeta::new(*self.state.key, false),
            AccountMeta::new_readonly(*self.authority.key, true),
            AccountMeta::new(*self.payer.key, true),
            AccountMeta::new_readonly(*self.rent.key, false),
            AccountMeta::new_readonly(*self.system_program.key, false),
        ]
    }
}

impl<'info> ToAccountInfos<'info> for InitializeUser<'info> {
    fn to_account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.user.clone(),
            self.user_stats.clone(),
            self.state.clone(),
            self.authority.clone(),
            self.payer.clone(),
            self.rent.clone(),
            self.system_program.clone(),
        ]
    }
}

impl ToAccountMetas for DeleteUser<'_> {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(*self.user.key, false),
            AccountMeta::new(*self.user_stats.key, false),
            AccountMeta::new(*self.state.key, false),
            AccountMeta::new(*self.authority.key, true),
        ]
    }
}

impl<'info> ToAccountInfos<'info> for DeleteUser<'info> {
    fn to_account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.user.clone(),
            self.user_stats.clone(),
            self.state.clone(),
            self.authority.clone(),
        ]
    }
}

impl ToAccountMetas for Deposit<'_> {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new_readonly(*self.state.key, false),
            AccountMeta::new(*self.user.key, false),
            AccountMeta::new(*self.user_stats.key, false),
            AccountMeta::new_readonly(*self.authority.key, true),
            AccountMeta::new(*self.spot_market_vault.key, false),
            AccountMeta::new(*self.user_token_account.key, false),
            AccountMeta::new_readonly(*self.token_program.key, false),
        ]
    }
}

impl<'info> ToAccountInfos<'info> for Deposit<'info> {
    fn to_account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.state.clone(),
            self.user.clone(),
            self.user_stats.clone(),
            self.authority.clone(),
            self.spot_market_vault.clone(),
            self.user_token_account.clone(),
            self.token_program.clone(),
        ]
    }
}

impl ToAccountMetas for Withdraw<'_> {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new_readonly(*self.state.key, false),
            AccountMeta::new(*self.user.key, false),
            AccountMeta::new(*self.user_stats.key, false),
            AccountMeta::new_readonly(*self.authority.key, true),
            AccountMeta::new(*self.spot_market_vault.key, false),
            AccountMeta::new_readonly(*self.drift_signer.key, false),
            AccountMeta::new(*self.user_token_account.key, false),
            AccountMeta::new_readonly(*self.token_program.key, false),
        ]
    }
}

impl<'info> ToAccountInfos<'info> for Withdraw<'info> {
    fn to_account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.state.clone(),
            self.user.clone(),
            self.user_stats.clone(),
            self.authority.clone(),
            self.spot_market_vault.clone(),
            self.drift_signer.clone(),
            self.user_token_account.clone(),
            self.token_program.clone(),
        ]
    }
}

// ─── Calls ───────────────────────────────────────────────────────────────────

pub fn initialize_user_stats<'info>(
    ctx: CpiContext<'_, '_, '_, 'info, InitializeUserStats<'info>>,
) -> Result<()> {
    invoke_with_context(ctx, InitializeUserStatsArgs {}.data())
}

pub fn initialize_user<'info>(
    ctx: CpiContext<'_, '_, '_, 'info, InitializeUser<'info>>,
    sub_account_id: u16,
    name: [u8; 32],
) -> Result<()> {
    let args = InitializeUserArgs {
        sub_account_id,
        name,
    };
    invoke_with_context(ctx, args.data())
}

pub fn delete_user<'info>(ctx: CpiContext<'_, '_, '_, 'info, DeleteUser<'info>>) -> Result<()> {
    invoke_with_context(ctx, DeleteUserArgs {}.data())
}

pub fn deposit<'info>(
    ctx: CpiContext<'_, '_, '_, 'info, Deposit<'info>>,
    market_index: u16,
    amount: u64,
    reduce_only: bool,
) -> Result<()> {
    let args = DepositArgs {
        market_index,
        amount,
        reduce_only,
    };
    invoke_with_context(ctx, args.data())
}

pub fn withdraw<'info>(
    ctx: CpiContext<'_, '_, '_, 'info, Withdraw<'info>>,
    market_index: u16,
    amount: u64,
    reduce_only: bool,
) -> Result<()> {
    let args = WithdrawArgs {
        market_index,
        amount,
        reduce_only,
    };
    invoke_with_context(ctx, args.data())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpi::sighash;

    #[test]
    fn discriminators_match_drift_sighashes() {
        assert_eq!(InitializeUserStatsArgs::DISCRIMINATOR, sighash("initialize_user_stats"));
        assert_eq!(InitializeUserArgs::DISCRIMINATOR, sighash("initialize_user"));
        assert_eq!(DeleteUserArgs::DISCRIMINATOR, sighash("delete_user"));
        assert_eq!(DepositArgs::DISCRIMINATOR, sighash("deposit"));
        assert_eq!(WithdrawArgs::DISCRIMINATOR, sighash("withdraw"));
    }

    #[test]
    fn deposit_data_is_sighash_then_borsh_args() {
        let data = DepositArgs {
            market_index: 1,
            amount: 2_500_000_000,
            reduce_only: true,
        }
        .data();

        let mut expected = sighash("deposit").to_vec();
        expected.extend_from_slice(&1u16.to_le_bytes());
        expected.extend_from_slice(&2_500_000_000u64.to_le_bytes());
        expected.push(1);
        assert_eq!(data, expected);
    }

    #[test]
    fn initialize_user_data_carries_name() {
        let data = InitializeUserArgs {
            sub_account_id: 0,
            name: [0; 32],
        }
        .data();
        assert_eq!(data.len(), 8 + 2 + 32);
        assert_eq!(DeleteUserArgs {}.data(), sighash("delete_user").to_vec());
    }
}
