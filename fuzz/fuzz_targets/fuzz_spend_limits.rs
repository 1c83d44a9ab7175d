#![no_main]

use anchor_lang::prelude::Pubkey;
use libfuzzer_sys::fuzz_target;
use quartz::state::{SpendLimits, Vault};

fn read_u64(data: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(data[at..at + 8].try_into().unwrap_or([0; 8]))
}

fn read_limits(data: &[u8], at: usize) -> SpendLimits {
    SpendLimits {
        spend_limit_per_transaction: read_u64(data, at),
        spend_limit_per_timeframe: read_u64(data, at + 8),
        // Keep timeframes short enough for the fuzzer to cross many of them
        extend_spend_limit_per_timeframe_reset_slot_amount: read_u64(data, at + 16) % 10_000,
    }
}

const SPEND_CHUNK: usize = 11;
const ADJUST_CHUNK: usize = 27;

fuzz_target!(|data: &[u8]| {
    if data.len() < 32 {
        return;
    }

    let mut limits = read_limits(data, 0);
    let start_slot = read_u64(data, 24) >> 8;

    let Ok(mut vault) = Vault::new(Pubkey::default(), 255, limits, start_slot) else {
        return;
    };

    let mut slot = start_slot;
    let mut spent_in_timeframe: u64 = 0;
    let mut timeframe_end = vault.next_spend_limit_per_timeframe_reset_slot;

    // Ops: tag byte, u16 slot step, then either a u64 spend amount or
    // (tag % 8 == 0) a full set of new limits for the owner to adjust to
    let mut rest = &data[32..];
    while rest.len() >= SPEND_CHUNK {
        let tag = rest[0];
        let step = u64::from(u16::from_le_bytes([rest[1], rest[2]]));
        slot = slot.saturating_add(step);
        let before = vault.clone();

        if tag % 8 == 0 {
            if rest.len() < ADJUST_CHUNK {
                break;
            }
            let new_limits = read_limits(rest, 3);
            rest = &rest[ADJUST_CHUNK..];

            match vault.adjust_spend_limits(new_limits, slot) {
                Ok(()) => {
                    // Spending only carries over from a timeframe still running
                    spent_in_timeframe = if slot >= timeframe_end {
                        0
                    } else {
                        spent_in_timeframe.min(new_limits.spend_limit_per_timeframe)
                    };
                    limits = new_limits;
                    timeframe_end = vault.next_spend_limit_per_timeframe_reset_slot;
                    assert_eq!(
                        vault.remaining_spend_limit_per_timeframe,
                        limits.spend_limit_per_timeframe - spent_in_timeframe
                    );
                }
                Err(_) => assert_eq!(vault, before),
            }
            continue;
        }

        let amount = read_u64(rest, 3);
        rest = &rest[SPEND_CHUNK..];

        match vault.consume_spend_limit(amount, slot) {
            Ok(()) => {
                assert!(amount <= limits.spend_limit_per_transaction);
                if vault.next_spend_limit_per_timeframe_reset_slot != timeframe_end {
                    spent_in_timeframe = 0;
                    timeframe_end = vault.next_spend_limit_per_timeframe_reset_slot;
                }
                spent_in_timeframe += amount;

                // Never overspend a timeframe
                assert!(spent_in_timeframe <= limits.spend_limit_per_timeframe);
                assert_eq!(
                    vault.remaining_spend_limit_per_timeframe,
                    limits.spend_limit_per_timeframe - spent_in_timeframe
                );
                assert!(vault.next_spend_limit_per_timeframe_reset_slot > slot);
            }
            // Failed spends leave the vault untouched
            Err(_) => assert_eq!(vault, before),
        }
    }
});
