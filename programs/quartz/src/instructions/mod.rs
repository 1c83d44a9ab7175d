#![allow(ambiguous_glob_reexports)]

pub mod admin;
pub mod balance;
pub mod bridge;
pub mod collateral_repay;
pub mod spend;
pub mod user;
pub mod vault_spl;

pub use admin::*;
pub use balance::*;
pub use bridge::*;
pub use collateral_repay::*;
pub use spend::*;
pub use user::*;
