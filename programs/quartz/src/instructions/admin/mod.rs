pub mod reclaim_bridge_rent;

pub use reclaim_bridge_rent::*;
