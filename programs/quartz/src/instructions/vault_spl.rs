use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    close_account, transfer_checked, CloseAccount, Mint, TokenAccount, TransferChecked,
};

/// Moves whatever `vault_spl` holds to `destination`, then closes it.
/// Returns the amount moved.
pub fn sweep_vault_spl<'info>(
    vault_spl: &mut InterfaceAccount<'info, TokenAccount>,
    destination: AccountInfo<'info>,
    mint: &InterfaceAccount<'info, Mint>,
    vault: AccountInfo<'info>,
    rent_destination: AccountInfo<'info>,
    token_program: AccountInfo<'info>,
    vault_signer: &[&[&[u8]]],
) -> Result<u64> {
    vault_spl.reload()?;
    let amount = vault_spl.amount;

    if amount > 0 {
        transfer_checked(
            CpiContext::new_with_signer(
                token_program.clone(),
                TransferChecked {
                    from: vault_spl.to_account_info(),
                    mint: mint.to_account_info(),
                    to: destination,
                    authority: vault.clone(),
                },
                vault_signer,
            ),
            amount,
            mint.decimals,
        )?;
    }

    close_account(CpiContext::new_with_signer(
        token_program,
        CloseAccount {
            account: vault_spl.to_account_info(),
            destination: rent_destination,
            authority: vault,
        },
        vault_signer,
    ))?;

    Ok(amount)
}
