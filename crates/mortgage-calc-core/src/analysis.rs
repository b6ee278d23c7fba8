//! Payoff analyses wrapped in the standard computation envelope.
//!
//! Thin entry points over `LoanState` for callers that want a single
//! serializable answer (the CLI, a form's display layer) rather than a live
//! model: one payoff summary, or a side-by-side of several extra payments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::loan::{LoanInputs, LoanState, LoanSummary};
use crate::types::{with_metadata, ComputationOutput, Money};

const PAYOFF_METHODOLOGY: &str =
    "Level-payment annuity on the initial loan; payoff by logarithmic period count on the current principal, rounded up to whole months";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Payoff under one extra-payment amount. Every row serializes the same keys,
/// `payoff_error` included, so tabular output gets one column per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPaymentRow {
    pub extra_monthly_payment: Money,
    pub total_monthly_payment: Option<Money>,
    pub remaining_payments: Option<u32>,
    pub completion_date: Option<NaiveDate>,
    pub months_saved: Option<u32>,
    pub payoff_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPaymentComparison {
    pub base_monthly_payment: Option<Money>,
    pub reference_date: NaiveDate,
    pub rows: Vec<ExtraPaymentRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Summarise the payoff of `inputs` as of `reference_date`.
///
/// An insufficient payment is not an error here: the summary carries it in
/// `payoff_error` and it is repeated in `warnings`.
pub fn analyze_payoff(
    inputs: &LoanInputs,
    reference_date: NaiveDate,
) -> ComputationOutput<LoanSummary> {
    let start = Instant::now();
    let state = LoanState::from_inputs(inputs, reference_date);
    let mut warnings = input_warnings(inputs);

    if let Err(e) = state.payoff() {
        warnings.push(e.to_string());
    }

    with_metadata(
        PAYOFF_METHODOLOGY,
        inputs,
        warnings,
        start.elapsed().as_micros() as u64,
        state.summary(),
    )
}

/// Payoff of the same loan under each of `extra_payments`, in the order given.
/// The `extra_monthly_payment` in `inputs` is ignored.
pub fn compare_extra_payments(
    inputs: &LoanInputs,
    reference_date: NaiveDate,
    extra_payments: &[Money],
) -> ComputationOutput<ExtraPaymentComparison> {
    let start = Instant::now();
    let mut warnings = input_warnings(inputs);
    let mut state = LoanState::from_inputs(inputs, reference_date);

    if let Err(e) = state.base_monthly_payment() {
        warnings.push(e.to_string());
    }

    let rows = extra_payments
        .iter()
        .map(|&extra| {
            state.set_extra_monthly_payment(extra);
            let summary = state.summary();
            ExtraPaymentRow {
                extra_monthly_payment: extra,
                total_monthly_payment: summary.total_monthly_payment,
                remaining_payments: summary.remaining_payments,
                completion_date: summary.completion_date,
                months_saved: summary.months_saved,
                payoff_error: summary.payoff_error,
            }
        })
        .collect();

    let comparison = ExtraPaymentComparison {
        base_monthly_payment: state.base_monthly_payment().ok(),
        reference_date,
        rows,
    };

    with_metadata(
        PAYOFF_METHODOLOGY,
        &serde_json::json!({ "loan": inputs, "extra_payments": extra_payments }),
        warnings,
        start.elapsed().as_micros() as u64,
        comparison,
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Inputs the model accepts but that are probably typos.
fn input_warnings(inputs: &LoanInputs) -> Vec<String> {
    let mut warnings = Vec::new();
    if inputs.current_principal > inputs.initial_loan {
        warnings.push(format!(
            "Current principal {} exceeds the initial loan {}",
            inputs.current_principal, inputs.initial_loan
        ));
    }
    if inputs.annual_interest_rate < Money::ZERO {
        warnings.push(format!("Negative interest rate {}", inputs.annual_interest_rate));
    }
    if inputs.annual_interest_rate >= Money::ONE {
        warnings.push(format!(
            "Interest rate {} is 100% or more; rates are decimals (0.04 = 4%)",
            inputs.annual_interest_rate
        ));
    }
    if inputs.extra_monthly_payment < Money::ZERO {
        warnings.push("Negative extra payment reduces the monthly payment".into());
    }
    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
