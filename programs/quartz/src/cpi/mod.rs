//! Hand-built CPIs into the external programs a vault talks to. Each call
//! mirrors what an Anchor generated `cpi` module does: an accounts struct
//! implementing `ToAccountMetas` + `ToAccountInfos`, and instruction data
//! made of the 8 byte sighash followed by the Borsh encoded arguments.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, program::invoke_signed};

pub mod cctp;
pub mod drift;
pub mod marginfi;

pub use cctp::{MessageTransmitter, TokenMessengerMinter};
pub use drift::Drift;
pub use marginfi::Marginfi;

/// Invokes `ctx.program` with `data`, appending any remaining accounts after
/// the named ones.
pub(crate) fn invoke_with_context<'info, T>(
    ctx: CpiContext<'_, '_, '_, 'info, T>,
    data: Vec<u8>,
) -> Result<()>
where
    T: ToAccountMetas + ToAccountInfos<'info>,
{
    let mut accounts = ctx.accounts.to_account_metas(None);
    accounts.extend(ctx.remaining_accounts.iter().map(|account| AccountMeta {
        pubkey: *account.key,
        is_signer: account.is_signer,
        is_writable: account.is_writable,
    }));

    let instruction = Instruction {
        program_id: *ctx.program.key,
        accounts,
        data,
    };

    invoke_signed(&instruction, &ctx.to_account_infos(), ctx.signer_seeds).map_err(Into::into)
}

#[cfg(test)]
pub(crate) fn sighash(name: &str) -> [u8; 8] {
    let preimage = format!("global:{name}");
    let hash = anchor_lang::solana_program::hash::hash(preimage.as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash.to_bytes()[..8]);
    discriminator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JUPITER_EXACT_OUT_ROUTE_DISCRIMINATOR;

    #[test]
    fn jupiter_discriminator_is_the_route_sighash() {
        assert_eq!(JUPITER_EXACT_OUT_ROUTE_DISCRIMINATOR, sighash("exact_out_route"));
    }
}
