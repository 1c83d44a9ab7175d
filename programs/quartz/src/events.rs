use anchor_lang::prelude::*;

#[event]
pub struct UserInitialised {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub marginfi_account: Option<Pubkey>,
    pub spend_limit_per_transaction: u64,
    pub spend_limit_per_timeframe: u64,
    pub next_spend_limit_per_timeframe_reset_slot: u64,
    pub timestamp: i64,
}

#[event]
pub struct UserClosed {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct VaultUpgraded {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub spend_limit_per_transaction: u64,
    pub spend_limit_per_timeframe: u64,
    pub timestamp: i64,
}

#[event]
pub struct DriftAccountInitialised {
    pub vault: Pubkey,
    pub drift_user: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct DriftAccountClosed {
    pub vault: Pubkey,
    pub drift_user: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct SpendLimitsUpdated {
    pub vault: Pubkey,
    pub spend_limit_per_transaction: u64,
    pub spend_limit_per_timeframe: u64,
    pub remaining_spend_limit_per_timeframe: u64,
    pub next_spend_limit_per_timeframe_reset_slot: u64,
    pub timestamp: i64,
}

#[event]
pub struct DepositMade {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub market_index: u16,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawMade {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub market_index: u16,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct CardToppedUp {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct SpendStarted {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub remaining_spend_limit_per_timeframe: u64,
    pub slot: u64,
}

#[event]
pub struct SpendCompleted {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct CollateralRepayStarted {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub deposit_market_index: u16,
    pub deposit_amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct SwapRepayStarted {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub withdraw_mint: Pubkey,
    pub start_withdraw_balance: u64,
    pub timestamp: i64,
}

#[event]
pub struct SwapRepayDeposited {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub deposit_market_index: u16,
    pub deposit_amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct CollateralRepaid {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub deposit_market_index: u16,
    pub deposit_amount: u64,
    pub withdraw_market_index: u16,
    pub withdraw_amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct BridgeRentReclaimed {
    pub message_sent_event_data: Pubkey,
    pub lamports: u64,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::Discriminator;

    #[test]
    fn repay_flows_emit_distinct_events() {
        let discriminators = [
            CollateralRepayStarted::DISCRIMINATOR,
            SwapRepayStarted::DISCRIMINATOR,
            SwapRepayDeposited::DISCRIMINATOR,
            CollateralRepaid::DISCRIMINATOR,
        ];
        for (i, a) in discriminators.iter().enumerate() {
            for b in &discriminators[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
