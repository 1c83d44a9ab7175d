pub mod complete_spend;
pub mod start_spend;

pub use complete_spend::*;
pub use start_spend::*;
