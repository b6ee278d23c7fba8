use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MortgageCalcError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Payment insufficient: monthly payment {payment} never retires the principal (monthly interest accrued: {monthly_interest})")]
    PaymentInsufficient {
        payment: Decimal,
        monthly_interest: Decimal,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Numeric overflow in {context}")]
    NumericOverflow { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MortgageCalcError {
    /// True when the loan is well formed but the payment is too low to ever
    /// pay it off. Display layers show "payment too low" for this case.
    pub fn is_payment_insufficient(&self) -> bool {
        matches!(self, MortgageCalcError::PaymentInsufficient { .. })
    }
}

impl From<serde_json::Error> for MortgageCalcError {
    fn from(e: serde_json::Error) -> Self {
        MortgageCalcError::SerializationError(e.to_string())
    }
}
