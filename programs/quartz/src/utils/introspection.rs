use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::{get_stack_height, Instruction, TRANSACTION_LEVEL_STACK_HEIGHT},
    sysvar::instructions::{load_current_index_checked, load_instruction_at_checked},
};

use crate::{
    config::{ANCHOR_DISCRIMINATOR, U16_SIZE, U64_SIZE},
    errors::QuartzError,
};

/// Account positions shared by every instruction that is checked from a
/// neighbouring instruction in the same transaction.
pub const VAULT_ACCOUNT_POSITION: usize = 0;
pub const OWNER_ACCOUNT_POSITION: usize = 1;

/// Loads the transaction instruction `offset` slots away from the one
/// currently executing. Missing instructions map to `err`.
pub fn load_relative_instruction(
    instructions_sysvar: &AccountInfo,
    offset: i64,
    err: QuartzError,
) -> Result<Instruction> {
    let current = i64::from(load_current_index_checked(instructions_sysvar)?);
    let index = current
        .checked_add(offset)
        .and_then(|index| usize::try_from(index).ok())
        .ok_or(err)?;
    load_instruction_at_checked(index, instructions_sysvar).map_err(|_| err.into())
}

pub fn require_instruction(
    instruction: &Instruction,
    program_id: &Pubkey,
    discriminator: &[u8],
    err: QuartzError,
) -> Result<()> {
    require_keys_eq!(instruction.program_id, *program_id, err);
    if instruction.data.get(..ANCHOR_DISCRIMINATOR) != Some(discriminator) {
        return Err(error!(err));
    }
    Ok(())
}

pub fn account_key(instruction: &Instruction, position: usize) -> Result<Pubkey> {
    instruction
        .accounts
        .get(position)
        .map(|meta| meta.pubkey)
        .ok_or_else(|| QuartzError::InvalidUserAccounts.into())
}

/// Checks the neighbouring instruction acts on the same vault and owner.
pub fn require_same_user(instruction: &Instruction, vault: &Pubkey, owner: &Pubkey) -> Result<()> {
    require_keys_eq!(
        account_key(instruction, VAULT_ACCOUNT_POSITION)?,
        *vault,
        QuartzError::InvalidUserAccounts
    );
    require_keys_eq!(
        account_key(instruction, OWNER_ACCOUNT_POSITION)?,
        *owner,
        QuartzError::InvalidUserAccounts
    );
    Ok(())
}

/// Reads a little-endian `u16` argument at `offset` bytes into the data,
/// counted from the start of the instruction data.
pub fn read_u16(instruction: &Instruction, offset: usize) -> Result<u16> {
    let bytes = offset
        .checked_add(U16_SIZE)
        .and_then(|end| instruction.data.get(offset..end))
        .ok_or(QuartzError::DeserializationError)?;
    let bytes: [u8; U16_SIZE] = bytes
        .try_into()
        .map_err(|_| QuartzError::DeserializationError)?;
    Ok(u16::from_le_bytes(bytes))
}

pub fn read_u64(instruction: &Instruction, offset: usize) -> Result<u64> {
    let bytes = offset
        .checked_add(U64_SIZE)
        .and_then(|end| instruction.data.get(offset..end))
        .ok_or(QuartzError::DeserializationError)?;
    let bytes: [u8; U64_SIZE] = bytes
        .try_into()
        .map_err(|_| QuartzError::DeserializationError)?;
    Ok(u64::from_le_bytes(bytes))
}

/// Introspection only sees top level instructions, so the caller must be one.
pub fn require_top_level() -> Result<()> {
    require!(
        get_stack_height() == TRANSACTION_LEVEL_STACK_HEIGHT,
        QuartzError::IllegalCpi
    );
    Ok(())
}
