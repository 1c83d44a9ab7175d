use anchor_lang::prelude::*;
use pyth_solana_receiver_sdk::price_update::{get_feed_id_from_hex, PriceUpdateV2};

use crate::{
    config::{BPS_DENOMINATOR, MAX_PRICE_EXPONENT_DIFFERENCE},
    errors::QuartzError,
    state::DriftMarket,
};

/// A Pyth price: `price ± conf`, scaled by `10^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OraclePrice {
    pub price: i64,
    pub conf: u64,
    pub exponent: i32,
}

impl OraclePrice {
    /// Reads the market's feed from a price update, rejecting stale prices.
    pub fn load(update: &PriceUpdateV2, market: &DriftMarket, clock: &Clock) -> Result<Self> {
        let feed_id = get_feed_id_from_hex(market.pyth_feed)?;
        let price = update.get_price_no_older_than(clock, market.pyth_max_age_seconds, &feed_id)?;
        Ok(Self {
            price: price.price,
            conf: price.conf,
            exponent: price.exponent,
        })
    }

    fn positive_price(&self) -> Result<u64> {
        require!(self.price > 0, QuartzError::NegativeOraclePrice);
        u64::try_from(self.price).map_err(|_| QuartzError::NegativeOraclePrice.into())
    }

    /// Bottom of the confidence interval
    pub fn lowest(&self) -> Result<u64> {
        self.positive_price()?
            .checked_sub(self.conf)
            .ok_or_else(|| QuartzError::NegativeOraclePrice.into())
    }

    /// Top of the confidence interval
    pub fn highest(&self) -> Result<u64> {
        self.positive_price()?
            .checked_add(self.conf)
            .ok_or_else(|| QuartzError::MathOverflow.into())
    }
}

/// Brings two prices onto the smaller of their exponents so they can be
/// compared directly.
pub fn normalize_price_exponents(
    price_a: u64,
    exponent_a: i32,
    price_b: u64,
    exponent_b: i32,
) -> Result<(u128, u128)> {
    let difference = i64::from(exponent_a) - i64::from(exponent_b);
    let scale_power =
        u32::try_from(difference.unsigned_abs()).map_err(|_| QuartzError::InvalidPriceExponent)?;
    require!(
        scale_power <= MAX_PRICE_EXPONENT_DIFFERENCE,
        QuartzError::InvalidPriceExponent
    );

    let scale = 10u128
        .checked_pow(scale_power)
        .ok_or(QuartzError::MathOverflow)?;
    let (a, b) = (u128::from(price_a), u128::from(price_b));

    if difference > 0 {
        let a = a.checked_mul(scale).ok_or(QuartzError::MathOverflow)?;
        Ok((a, b))
    } else {
        let b = b.checked_mul(scale).ok_or(QuartzError::MathOverflow)?;
        Ok((a, b))
    }
}

/// Checks that the collateral sold (`withdraw_amount` of the withdraw market)
/// is worth at most `max_slippage_bps` more than the loan repaid
/// (`deposit_amount` of the deposit market). Deposits are valued at the low
/// end of the confidence interval and withdrawals at the high end.
pub fn validate_swap_prices(
    deposit_amount: u64,
    deposit_price: &OraclePrice,
    deposit_market: &DriftMarket,
    withdraw_amount: u64,
    withdraw_price: &OraclePrice,
    withdraw_market: &DriftMarket,
    max_slippage_bps: u16,
) -> Result<()> {
    let (deposit_price_normalized, withdraw_price_normalized) = normalize_price_exponents(
        deposit_price.lowest()?,
        deposit_price.exponent,
        withdraw_price.highest()?,
        withdraw_price.exponent,
    )?;

    // Cross-multiply base units so both sides share the same decimals
    let deposit_value = u128::from(deposit_amount)
        .checked_mul(u128::from(withdraw_market.base_units_per_token))
        .and_then(|v| v.checked_mul(deposit_price_normalized))
        .ok_or(QuartzError::MathOverflow)?;
    let withdraw_value = u128::from(withdraw_amount)
        .checked_mul(u128::from(deposit_market.base_units_per_token))
        .and_then(|v| v.checked_mul(withdraw_price_normalized))
        .ok_or(QuartzError::MathOverflow)?;

    let withdraw_multiplier = BPS_DENOMINATOR
        .checked_sub(u128::from(max_slippage_bps))
        .ok_or(QuartzError::MathOverflow)?;

    let deposit_check = deposit_value
        .checked_mul(BPS_DENOMINATOR)
        .ok_or(QuartzError::MathOverflow)?;
    let withdraw_check = withdraw_value
        .checked_mul(withdraw_multiplier)
        .ok_or(QuartzError::MathOverflow)?;

    require!(deposit_check >= withdraw_check, QuartzError::MaxSlippageExceeded);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{COLLATERAL_REPAY_MAX_SLIPPAGE_BPS, DRIFT_MARKETS};

    const USDC: &DriftMarket = &DRIFT_MARKETS[0];
    const SOL: &DriftMarket = &DRIFT_MARKETS[1];

    fn price(price: i64, conf: u64, exponent: i32) -> OraclePrice {
        OraclePrice { price, conf, exponent }
    }

    #[test]
    fn normalize_scales_larger_exponent_down() {
        // 1.50 at 10^-2 vs 1.50000000 at 10^-8
        let (a, b) = normalize_price_exponents(150, -2, 150_000_000, -8).unwrap();
        assert_eq!(a, b);

        let (a, b) = normalize_price_exponents(150_000_000, -8, 150, -2).unwrap();
        assert_eq!(a, b);

        let (a, b) = normalize_price_exponents(7, -5, 9, -5).unwrap();
        assert_eq!((a, b), (7, 9));
    }

    #[test]
    fn normalize_rejects_wide_exponent_gap() {
        let err = normalize_price_exponents(1, 0, 1, -13).unwrap_err();
        assert_eq!(err, QuartzError::InvalidPriceExponent.into());
        assert!(normalize_price_exponents(1, 0, 1, -12).is_ok());

        let err = normalize_price_exponents(1, i32::MAX, 1, i32::MIN).unwrap_err();
        assert_eq!(err, QuartzError::InvalidPriceExponent.into());
    }

    #[test]
    fn confidence_interval_bounds() {
        let p = price(1_000, 10, -2);
        assert_eq!(p.lowest().unwrap(), 990);
        assert_eq!(p.highest().unwrap(), 1_010);

        let err = price(5, 10, -2).lowest().unwrap_err();
        assert_eq!(err, QuartzError::NegativeOraclePrice.into());
        let err = price(0, 0, -2).highest().unwrap_err();
        assert_eq!(err, QuartzError::NegativeOraclePrice.into());
    }

    #[test]
    fn fair_swap_passes() {
        // Sell 1 SOL at $150 to repay 150 USDC
        let usdc_price = price(100_000_000, 0, -8);
        let sol_price = price(15_000_000_000, 0, -8);
        validate_swap_prices(
            150_000_000,
            &usdc_price,
            USDC,
            1_000_000_000,
            &sol_price,
            SOL,
            COLLATERAL_REPAY_MAX_SLIPPAGE_BPS,
        )
        .unwrap();
    }

    #[test]
    fn swap_within_one_percent_passes() {
        // 148.5 USDC for 1 SOL at $150 is exactly 1% slippage
        let usdc_price = price(100_000_000, 0, -8);
        let sol_price = price(15_000_000_000, 0, -8);
        validate_swap_prices(148_500_000, &usdc_price, USDC, 1_000_000_000, &sol_price, SOL, 100)
            .unwrap();
    }

    #[test]
    fn swap_beyond_slippage_fails() {
        let usdc_price = price(100_000_000, 0, -8);
        let sol_price = price(15_000_000_000, 0, -8);
        let err =
            validate_swap_prices(148_000_000, &usdc_price, USDC, 1_000_000_000, &sol_price, SOL, 100)
                .unwrap_err();
        assert_eq!(err, QuartzError::MaxSlippageExceeded.into());
    }

    #[test]
    fn confidence_counts_against_the_swap() {
        // Fair at mid price but the confidence interval pushes it past 1%
        let usdc_price = price(100_000_000, 1_000_000, -8);
        let sol_price = price(15_000_000_000, 100_000_000, -8);
        let err =
            validate_swap_prices(150_000_000, &usdc_price, USDC, 1_000_000_000, &sol_price, SOL, 100)
                .unwrap_err();
        assert_eq!(err, QuartzError::MaxSlippageExceeded.into());
    }

    #[test]
    fn negative_oracle_price_is_rejected() {
        let usdc_price = price(-1, 0, -8);
        let sol_price = price(15_000_000_000, 0, -8);
        let err = validate_swap_prices(1, &usdc_price, USDC, 1, &sol_price, SOL, 100).unwrap_err();
        assert_eq!(err, QuartzError::NegativeOraclePrice.into());
    }
}
