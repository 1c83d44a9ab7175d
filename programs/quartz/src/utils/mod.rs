pub mod accounts;
pub mod evm;
pub mod introspection;
pub mod jupiter;
#[cfg(test)]
pub mod pdas;
pub mod price;

pub use accounts::*;
pub use evm::*;
pub use introspection::*;
pub use jupiter::*;
#[cfg(test)]
pub use pdas::*;
pub use price::*;

use anchor_lang::prelude::*;

use crate::{config::DRIFT_MARKETS, errors::QuartzError, state::DriftMarket};

pub fn get_drift_market(market_index: u16) -> Result<&'static DriftMarket> {
    DRIFT_MARKETS
        .iter()
        .find(|market| market.market_index == market_index)
        .ok_or_else(|| QuartzError::InvalidMarketIndex.into())
}

/// Looks up the market and checks `mint` is the market's mint.
pub fn validate_drift_market(market_index: u16, mint: &Pubkey) -> Result<&'static DriftMarket> {
    let market = get_drift_market(market_index)?;
    require_keys_eq!(*mint, market.mint, QuartzError::InvalidMint);
    Ok(market)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{USDC_MINT, WSOL_MINT};

    #[test]
    fn known_markets_resolve() {
        assert_eq!(get_drift_market(0).unwrap().mint, USDC_MINT);
        assert_eq!(get_drift_market(1).unwrap().mint, WSOL_MINT);
        assert_eq!(get_drift_market(1).unwrap().base_units_per_token, 1_000_000_000);
    }

    #[test]
    fn unknown_market_is_rejected() {
        let err = get_drift_market(7).unwrap_err();
        assert_eq!(err, QuartzError::InvalidMarketIndex.into());
    }

    #[test]
    fn market_mint_must_match() {
        assert!(validate_drift_market(0, &USDC_MINT).is_ok());
        let err = validate_drift_market(0, &WSOL_MINT).unwrap_err();
        assert_eq!(err, QuartzError::InvalidMint.into());
    }
}
