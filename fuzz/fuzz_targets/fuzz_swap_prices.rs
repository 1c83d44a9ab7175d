#![no_main]

use libfuzzer_sys::fuzz_target;
use quartz::{
    config::{COLLATERAL_REPAY_MAX_SLIPPAGE_BPS, DRIFT_MARKETS},
    utils::{normalize_price_exponents, validate_swap_prices, OraclePrice},
};

fn read_u64(data: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(data[at..at + 8].try_into().unwrap_or([0; 8]))
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 50 {
        return;
    }

    let deposit_amount = read_u64(data, 0);
    let withdraw_amount = read_u64(data, 8);
    let deposit_price = OraclePrice {
        price: read_u64(data, 16) as i64,
        conf: read_u64(data, 24) >> 16,
        exponent: -i32::from(data[48] % 16),
    };
    let withdraw_price = OraclePrice {
        price: read_u64(data, 32) as i64,
        conf: read_u64(data, 40) >> 16,
        exponent: -i32::from(data[49] % 16),
    };
    let (deposit_market, withdraw_market) = (&DRIFT_MARKETS[0], &DRIFT_MARKETS[1]);

    // Arbitrary prices must produce an error, never a panic
    let accepted = validate_swap_prices(
        deposit_amount,
        &deposit_price,
        deposit_market,
        withdraw_amount,
        &withdraw_price,
        withdraw_market,
        COLLATERAL_REPAY_MAX_SLIPPAGE_BPS,
    )
    .is_ok();

    if accepted {
        assert!(deposit_price.price > 0 && withdraw_price.price > 0);

        // Re-derive the bound at 1% slippage from the interval edges
        let (Ok(low), Ok(high)) = (deposit_price.lowest(), withdraw_price.highest()) else {
            panic!("accepted swap with unusable confidence interval");
        };
        let (low, high) =
            normalize_price_exponents(low, deposit_price.exponent, high, withdraw_price.exponent)
                .unwrap_or_else(|_| panic!("accepted swap with invalid exponents"));
        let deposit_value = u128::from(deposit_amount)
            * u128::from(withdraw_market.base_units_per_token)
            * low;
        let withdraw_value = u128::from(withdraw_amount)
            * u128::from(deposit_market.base_units_per_token)
            * high;
        assert!(deposit_value.checked_mul(10_000) >= withdraw_value.checked_mul(9_900));
    }
});
