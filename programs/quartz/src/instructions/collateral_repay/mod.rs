use crate::config::ANCHOR_DISCRIMINATOR;

pub mod collateral_repay_deposit;
pub mod collateral_repay_start;
pub mod collateral_repay_withdraw;
pub mod end_collateral_repay;
pub mod start_collateral_repay;

pub use collateral_repay_deposit::*;
pub use collateral_repay_start::*;
pub use collateral_repay_withdraw::*;
pub use end_collateral_repay::*;
pub use start_collateral_repay::*;

/// `collateral_repay_start(start_withdraw_balance: u64)`
pub const START_WITHDRAW_BALANCE_OFFSET: usize = ANCHOR_DISCRIMINATOR;
/// `collateral_repay_deposit(market_index: u16)` and `collateral_repay_withdraw(market_index: u16)`
pub const SWAP_REPAY_MARKET_INDEX_OFFSET: usize = ANCHOR_DISCRIMINATOR;

#[cfg(test)]
pub(crate) mod test_instructions {
    use anchor_lang::prelude::*;
    use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};

    use crate::config::{JUPITER_EXACT_OUT_ROUTE_DISCRIMINATOR, JUPITER_PROGRAM_ID};

    pub fn quartz_ix(discriminator: [u8; 8], args: &[u8], vault: Pubkey, owner: Pubkey) -> Instruction {
        let mut data = discriminator.to_vec();
        data.extend_from_slice(args);
        Instruction {
            program_id: crate::ID,
            accounts: vec![AccountMeta::new(vault, false), AccountMeta::new(owner, true)],
            data,
        }
    }

    /// Jupiter exact_out_route swapping `source_mint` out of `source` into
    /// `destination_mint` at `destination`.
    pub fn swap_ix(
        source: Pubkey,
        destination: Pubkey,
        source_mint: Pubkey,
        destination_mint: Pubkey,
        out_amount: u64,
        platform_fee_bps: u8,
    ) -> Instruction {
        let mut data = JUPITER_EXACT_OUT_ROUTE_DISCRIMINATOR.to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&[17, 100, 0, 1]);
        data.extend_from_slice(&out_amount.to_le_bytes());
        data.extend_from_slice(&(out_amount * 160).to_le_bytes());
        data.extend_from_slice(&50u16.to_le_bytes());
        data.push(platform_fee_bps);

        let filler = || AccountMeta::new_readonly(Pubkey::new_unique(), false);
        Instruction {
            program_id: JUPITER_PROGRAM_ID,
            accounts: vec![
                filler(),
                filler(),
                AccountMeta::new(source, false),
                AccountMeta::new(destination, false),
                filler(),
                AccountMeta::new_readonly(source_mint, false),
                AccountMeta::new_readonly(destination_mint, false),
            ],
            data,
        }
    }
}
