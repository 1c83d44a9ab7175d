use crate::{
    config::RENT_RECLAIMER,
    cpi::{
        cctp::{self, ReclaimEventAccount},
        MessageTransmitter,
    },
    errors::QuartzError,
    events::BridgeRentReclaimed,
};
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct ReclaimBridgeRent<'info> {
    #[account(
        mut,
        address = RENT_RECLAIMER @ QuartzError::InvalidRentReclaimer,
    )]
    pub rent_reclaimer: Signer<'info>,

    /// CHECK: lamport pool for CCTP event accounts, address checked by seeds
    #[account(
        mut,
        seeds = [b"bridge_rent_payer"],
        bump,
    )]
    pub bridge_rent_payer: UncheckedAccount<'info>,

    /// CHECK: passed through to CCTP, which performs the checks
    #[account(mut)]
    pub message_transmitter: UncheckedAccount<'info>,

    /// CHECK: passed through to CCTP, which checks the attestation against it
    #[account(mut)]
    pub message_sent_event_data: UncheckedAccount<'info>,

    pub message_transmitter_program: Program<'info, MessageTransmitter>,
}

pub fn handler(ctx: Context<ReclaimBridgeRent>, attestation: Vec<u8>) -> Result<()> {
    let rent_payer_seeds = &[b"bridge_rent_payer".as_ref(), &[ctx.bumps.bridge_rent_payer]];
    let signer = &[&rent_payer_seeds[..]];
    let lamports_before = ctx.accounts.bridge_rent_payer.lamports();

    cctp::reclaim_event_account(
        CpiContext::new_with_signer(
            ctx.accounts.message_transmitter_program.to_account_info(),
            ReclaimEventAccount {
                payee: ctx.accounts.bridge_rent_payer.to_account_info(),
                message_transmitter: ctx.accounts.message_transmitter.to_account_info(),
                message_sent_event_data: ctx.accounts.message_sent_event_data.to_account_info(),
            },
            signer,
        ),
        attestation,
    )?;

    let lamports = ctx
        .accounts
        .bridge_rent_payer
        .lamports()
        .checked_sub(lamports_before)
        .ok_or(QuartzError::MathOverflow)?;

    let clock = Clock::get()?;
    emit!(BridgeRentReclaimed {
        message_sent_event_data: ctx.accounts.message_sent_event_data.key(),
        lamports,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "[quartz] bridge rent reclaimed event={} lamports={}",
        ctx.accounts.message_sent_event_data.key(),
        lamports
    );
    Ok(())
}
