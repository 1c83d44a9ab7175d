use anchor_lang::prelude::*;

use crate::errors::QuartzError;

/// An address is fresh when nothing has been written to it yet: system
/// owned, no lamports, no data.
pub fn validate_account_fresh(account: &AccountInfo) -> Result<()> {
    require_keys_eq!(
        *account.owner,
        anchor_lang::system_program::ID,
        QuartzError::AccountAlreadyInitialized
    );
    require!(account.lamports() == 0, QuartzError::AccountAlreadyInitialized);
    require!(account.data_is_empty(), QuartzError::AccountAlreadyInitialized);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(owner: Pubkey, mut lamports: u64, data: &mut [u8]) -> Result<()> {
        let key = Pubkey::new_unique();
        let info = AccountInfo::new(&key, false, true, &mut lamports, data, &owner, false, 0);
        validate_account_fresh(&info)
    }

    #[test]
    fn empty_system_account_is_fresh() {
        assert!(check(anchor_lang::system_program::ID, 0, &mut []).is_ok());
    }

    #[test]
    fn funded_or_owned_accounts_are_not_fresh() {
        let expected: Error = QuartzError::AccountAlreadyInitialized.into();
        assert_eq!(check(anchor_lang::system_program::ID, 1, &mut []).unwrap_err(), expected);
        assert_eq!(check(crate::ID, 0, &mut []).unwrap_err(), expected);
        assert_eq!(
            check(anchor_lang::system_program::ID, 0, &mut [0u8; 4]).unwrap_err(),
            expected
        );
    }
}
