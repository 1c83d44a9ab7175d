use anchor_lang::prelude::*;
use anchor_lang::solana_program::native_token::LAMPORTS_PER_SOL;

use crate::state::DriftMarket;

// ─── Sizes ───────────────────────────────────────────────────────────────────

pub const ANCHOR_DISCRIMINATOR: usize = 8;
pub const PUBKEY_SIZE: usize = 32;
pub const U8_SIZE: usize = 1;
pub const U16_SIZE: usize = 2;
pub const U64_SIZE: usize = 8;

// ─── External programs ───────────────────────────────────────────────────────

pub const DRIFT_PROGRAM_ID: Pubkey = pubkey!("dRiftyHA39MWEi3m9aunc5MzRF1JYuBsbn6VPcn33UH");
pub const MARGINFI_PROGRAM_ID: Pubkey = pubkey!("MFv2hWf31Z9kbCa1snEPYctwafyhdvnV7FZnsebVacA");
pub const JUPITER_PROGRAM_ID: Pubkey = pubkey!("JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4");
pub const MESSAGE_TRANSMITTER_PROGRAM_ID: Pubkey =
    pubkey!("CCTPmbSD7gX1bxKPAmg77w8oFzNFpaQiQUWD43TKaecd");
pub const TOKEN_MESSENGER_MINTER_PROGRAM_ID: Pubkey =
    pubkey!("CCTPiPYPc6AsJuwueEnWgSgucamXDZwBd53dQ11YiKX3");

/// Signs for Drift's spot market vaults on withdraw
pub const DRIFT_SIGNER: Pubkey = pubkey!("JCNCMFXo5M5qwUPg2Utu1u6YWp3MbygxqBsBeXXJfrw");
pub const DRIFT_SUB_ACCOUNT_ID: u16 = 0;

pub const JUPITER_EXACT_OUT_ROUTE_DISCRIMINATOR: [u8; 8] = [208, 51, 239, 151, 123, 43, 237, 92];

// ─── Admin keys ──────────────────────────────────────────────────────────────

/// Backend key allowed to move card spends out of a vault
pub const SPEND_CALLER: Pubkey = pubkey!("mYRib4AjU2QwUNEjdDYLCSnhjvd1wrGEAfk8SiX3kCG");
/// Backend key allowed to reclaim CCTP event account rent
pub const RENT_RECLAIMER: Pubkey = pubkey!("EEtNV77UYbqBjhqDbGBojC5eptsAzkjY5oRUfMBGcgve");

// ─── User accounts ───────────────────────────────────────────────────────────

/// Flat fee the owner pays into the init rent pool, refunded on close_user.
pub const INIT_ACCOUNT_RENT_FEE: u64 = 35_000_000;

// ─── Bridge ──────────────────────────────────────────────────────────────────

pub const DOMAIN_BASE: u32 = 6;
pub const PROVIDER_BASE_ADDRESS: &str = "0x2f08d2B5E1CBC587cfdf7DA1679F2fe200fe493d";
pub const QUARTZ_CALLER_BASE_ADDRESS: &str = "0x28A0105A0cf8C0485a4956ba14b5274e9ED229DE";

// ─── Collateral repay ────────────────────────────────────────────────────────

pub const COLLATERAL_REPAY_MAX_SLIPPAGE_BPS: u16 = 100;
pub const MAX_PRICE_EXPONENT_DIFFERENCE: u32 = 12;
pub const BPS_DENOMINATOR: u128 = 10_000;

// ─── Drift markets ───────────────────────────────────────────────────────────

pub const USDC_MINT: Pubkey = pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
pub const WSOL_MINT: Pubkey = pubkey!("So11111111111111111111111111111111111111112");

pub const PYTH_FEED_USDC_USD: &str =
    "0xeaa020c61cc479712813461ce153894a96a6c00b21ed0cfc2798d1f9a9e9c94a";
pub const PYTH_FEED_SOL_USD: &str =
    "0xef0d8b6fda2ceba41da15d4095d1da392a0d2f8ed0c6c7bc0f4cfac8c280b56d";

pub const USDC_MARKET_INDEX: u16 = 0;

pub const DRIFT_MARKETS: [DriftMarket; 2] = [
    DriftMarket {
        market_index: USDC_MARKET_INDEX,
        mint: USDC_MINT,
        pyth_feed: PYTH_FEED_USDC_USD,
        pyth_max_age_seconds: 60,
        base_units_per_token: 1_000_000,
    },
    DriftMarket {
        market_index: 1,
        mint: WSOL_MINT,
        pyth_feed: PYTH_FEED_SOL_USD,
        pyth_max_age_seconds: 30,
        base_units_per_token: LAMPORTS_PER_SOL,
    },
];
