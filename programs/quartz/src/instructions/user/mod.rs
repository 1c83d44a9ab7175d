pub mod adjust_spend_limits;
pub mod close_drift_account;
pub mod close_user;
pub mod init_drift_account;
pub mod init_user;
pub mod upgrade_vault;

pub use adjust_spend_limits::*;
pub use close_drift_account::*;
pub use close_user::*;
pub use init_drift_account::*;
pub use init_user::*;
pub use upgrade_vault::*;
