pub mod executor;
pub mod opportunity;
pub mod preparer;
pub mod sweeper;

pub use executor::{execute_liquidation, ExecuteError, Liquidated};
pub use opportunity::{debt_to_cover_units, rank_opportunities};
pub use preparer::prepare_capital;
pub use sweeper::sweep_profits;
