pub mod amortization;
pub mod analysis;
pub mod error;
pub mod loan;
pub mod types;

pub use error::MortgageCalcError;
pub use loan::{LoanInputs, LoanState, LoanSummary, Payoff};
pub use types::*;

/// Standard result type for all mortgage-calc operations
pub type MortgageCalcResult<T> = Result<T, MortgageCalcError>;
