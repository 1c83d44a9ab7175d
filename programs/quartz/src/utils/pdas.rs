//! Off-chain derivations of every address the program checks with `seeds`.

use anchor_lang::prelude::*;

use crate::config::{DRIFT_PROGRAM_ID, DRIFT_SUB_ACCOUNT_ID};

pub fn get_vault_pda(owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"vault", owner.as_ref()], &crate::ID)
}

pub fn get_vault_spl_pda(vault: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[vault.as_ref(), mint.as_ref()], &crate::ID)
}

pub fn get_spend_mule_pda(owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"spend_mule", owner.as_ref()], &crate::ID)
}

pub fn get_collateral_repay_ledger_pda(owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"collateral_repay_ledger", owner.as_ref()], &crate::ID)
}

pub fn get_init_rent_payer_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"init_rent_payer"], &crate::ID)
}

pub fn get_bridge_rent_payer_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"bridge_rent_payer"], &crate::ID)
}

pub fn get_drift_user_pda(vault: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[b"user", vault.as_ref(), &DRIFT_SUB_ACCOUNT_ID.to_le_bytes()],
        &DRIFT_PROGRAM_ID,
    )
}

pub fn get_drift_user_stats_pda(vault: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"user_stats", vault.as_ref()], &DRIFT_PROGRAM_ID)
}

pub fn get_drift_state_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"drift_state"], &DRIFT_PROGRAM_ID)
}

pub fn get_drift_spot_market_vault_pda(market_index: u16) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[b"spot_market_vault", &market_index.to_le_bytes()],
        &DRIFT_PROGRAM_ID,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::USDC_MINT;

    #[test]
    fn vault_pda_is_canonical_per_owner() {
        let owner = Pubkey::new_unique();
        let (vault, bump) = get_vault_pda(&owner);
        let expected =
            Pubkey::create_program_address(&[b"vault", owner.as_ref(), &[bump]], &crate::ID).unwrap();
        assert_eq!(vault, expected);
        assert_ne!(vault, get_vault_pda(&Pubkey::new_unique()).0);
    }

    #[test]
    fn token_pdas_depend_on_vault_and_mint() {
        let owner = Pubkey::new_unique();
        let (vault, _) = get_vault_pda(&owner);
        let (usdc_spl, _) = get_vault_spl_pda(&vault, &USDC_MINT);
        let (other_spl, _) = get_vault_spl_pda(&vault, &Pubkey::new_unique());
        assert_ne!(usdc_spl, other_spl);
        assert_ne!(get_spend_mule_pda(&owner).0, usdc_spl);
        assert_ne!(get_collateral_repay_ledger_pda(&owner).0, get_spend_mule_pda(&owner).0);
    }

    #[test]
    fn drift_pdas_live_under_drift() {
        let (vault, _) = get_vault_pda(&Pubkey::new_unique());
        let (user, bump) = get_drift_user_pda(&vault);
        let expected = Pubkey::create_program_address(
            &[b"user", vault.as_ref(), &0u16.to_le_bytes(), &[bump]],
            &DRIFT_PROGRAM_ID,
        )
        .unwrap();
        assert_eq!(user, expected);
        assert_ne!(get_drift_user_stats_pda(&vault).0, user);
        assert_ne!(get_drift_spot_market_vault_pda(0).0, get_drift_spot_market_vault_pda(1).0);
        assert_ne!(get_drift_state_pda().0, get_init_rent_payer_pda().0);
        assert_ne!(get_init_rent_payer_pda().0, get_bridge_rent_payer_pda().0);
    }
}
