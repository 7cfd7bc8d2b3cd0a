pub mod discovery;
pub mod evaluator;

pub use discovery::{discover_borrowers, BorrowerScan, EventKind, EventScan};
pub use evaluator::evaluate_borrower;
