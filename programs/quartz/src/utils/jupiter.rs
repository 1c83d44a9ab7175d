use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;

use crate::{
    config::{JUPITER_EXACT_OUT_ROUTE_DISCRIMINATOR, JUPITER_PROGRAM_ID, U16_SIZE, U64_SIZE, U8_SIZE},
    errors::QuartzError,
    utils::{read_u64, require_instruction},
};

// exact_out_route account positions
pub const SWAP_SOURCE_TOKEN_ACCOUNT_POSITION: usize = 2;
pub const SWAP_DESTINATION_TOKEN_ACCOUNT_POSITION: usize = 3;
pub const SWAP_SOURCE_MINT_POSITION: usize = 5;
pub const SWAP_DESTINATION_MINT_POSITION: usize = 6;

/// exact_out_route data ends with
/// `out_amount: u64, quoted_in_amount: u64, slippage_bps: u16, platform_fee_bps: u8`.
const OUT_AMOUNT_FROM_END: usize = U64_SIZE + U64_SIZE + U16_SIZE + U8_SIZE;

pub fn exact_out_route_out_amount(instruction: &Instruction) -> Result<u64> {
    let start = instruction
        .data
        .len()
        .checked_sub(OUT_AMOUNT_FROM_END)
        .ok_or(QuartzError::DeserializationError)?;
    read_u64(instruction, start)
}

pub fn exact_out_route_platform_fee_bps(instruction: &Instruction) -> Result<u8> {
    instruction
        .data
        .last()
        .copied()
        .ok_or_else(|| QuartzError::DeserializationError.into())
}

/// The swap in a collateral repay must be a fee-free Jupiter exact_out_route.
pub fn validate_exact_out_route(instruction: &Instruction) -> Result<()> {
    require_instruction(
        instruction,
        &JUPITER_PROGRAM_ID,
        &JUPITER_EXACT_OUT_ROUTE_DISCRIMINATOR,
        QuartzError::IllegalCollateralRepayInstructions,
    )?;
    require!(
        exact_out_route_platform_fee_bps(instruction)? == 0,
        QuartzError::InvalidPlatformFee
    );
    Ok(())
}
