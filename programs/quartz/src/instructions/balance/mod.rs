pub mod deposit;
pub mod top_up_card;
pub mod withdraw;

pub use deposit::*;
pub use top_up_card::*;
pub use withdraw::*;
