use anchor_lang::prelude::*;

#[error_code]
pub enum QuartzError {
    #[msg("Illegal collateral repay instructions")]
    IllegalCollateralRepayInstructions,
    #[msg("Instruction must be called directly, not through CPI")]
    IllegalCpi,
    #[msg("Invalid mint provided")]
    InvalidMint,
    #[msg("Price slippage is above maximum")]
    MaxSlippageExceeded,
    #[msg("Swap platform fee must be zero")]
    InvalidPlatformFee,
    #[msg("User accounts across instructions do not match")]
    InvalidUserAccounts,
    #[msg("Swap source token account does not match withdraw")]
    InvalidSourceTokenAccount,
    #[msg("Swap destination token account does not match deposit")]
    InvalidDestinationTokenAccount,
    #[msg("Declared start balance is not accurate")]
    InvalidStartBalance,
    #[msg("Price received from oracle should be a positive number")]
    NegativeOraclePrice,
    #[msg("Invalid market index")]
    InvalidMarketIndex,
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Price exponents received from oracle are too far apart")]
    InvalidPriceExponent,
    #[msg("Could not deserialize introspection instruction data")]
    DeserializationError,
    #[msg("Collateral repay deposit and withdraw markets must be different")]
    IdenticalCollateralRepayMarkets,
    #[msg("Invalid starting vault balance")]
    InvalidStartingVaultBalance,
    #[msg("Provided EVM address does not match expected format")]
    InvalidEvmAddress,
    #[msg("Vault owner does not match signer")]
    InvalidVaultOwner,
    #[msg("Account is not a vault owned by this program")]
    InvalidVaultAccount,
    #[msg("Vault has already been upgraded")]
    VaultAlreadyUpgraded,
    #[msg("Insufficient spend limit remaining for the timeframe")]
    InsufficientTimeframeSpendLimit,
    #[msg("Amount exceeds the per transaction spend limit")]
    InsufficientTransactionSpendLimit,
    #[msg("start_spend must be followed by complete_spend")]
    IllegalSpendInstructions,
    #[msg("Signer is not the spend caller")]
    InvalidSpendCaller,
    #[msg("Signer is not the rent reclaimer")]
    InvalidRentReclaimer,
    #[msg("Account is already initialized")]
    AccountAlreadyInitialized,
    #[msg("Vault lamports were modified by a CPI")]
    IllegalVaultCpiModification,
    #[msg("Marginfi accounts are required")]
    MissingMarginfiAccounts,
    #[msg("Drift account must be closed first")]
    DriftAccountStillOpen,
}
