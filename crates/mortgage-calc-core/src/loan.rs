//! The loan amortization model.
//!
//! `LoanState` holds the five user-facing inputs of a fixed-rate loan and keeps
//! three derived values in step with them: the contractual monthly payment,
//! the number of payments still to make and the payoff date. Derivations run
//! eagerly in the constructor and in every setter, always in the same order:
//!
//! ```text
//! initial_loan, term_years, rate ──► base_monthly_payment ─┐
//!                current_principal, extra_monthly_payment ─┴─► remaining_payments ──► completion_date
//! ```
//!
//! The payoff date is measured from a reference date fixed at construction,
//! so reads never depend on the wall clock.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::amortization;
use crate::error::MortgageCalcError;
use crate::types::{Money, Rate};
use crate::MortgageCalcResult;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_INITIAL_LOAN: Money = dec!(300000);
pub const DEFAULT_PRINCIPAL: Money = dec!(300000);
pub const DEFAULT_TERM_YEARS: u32 = 30;
pub const DEFAULT_RATE: Rate = dec!(0.04);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The inputs a session saves and restores. Derived values are never stored;
/// they are rebuilt from these plus a reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanInputs {
    /// Amount originally borrowed. Drives the contractual payment.
    pub initial_loan: Money,
    /// Amount still owed. Drives the time to payoff.
    pub current_principal: Money,
    /// Original term in whole years.
    pub term_years: u32,
    /// Nominal annual rate as a decimal (0.04 = 4%).
    pub annual_interest_rate: Rate,
    /// Voluntary amount paid on top of the base payment each month.
    pub extra_monthly_payment: Money,
}

impl Default for LoanInputs {
    fn default() -> Self {
        Self {
            initial_loan: DEFAULT_INITIAL_LOAN,
            current_principal: DEFAULT_PRINCIPAL,
            term_years: DEFAULT_TERM_YEARS,
            annual_interest_rate: DEFAULT_RATE,
            extra_monthly_payment: Decimal::ZERO,
        }
    }
}

impl LoanInputs {
    /// Restore saved inputs from a JSON document. Missing fields take their
    /// defaults; a field of the wrong type is a `SerializationError`.
    pub fn from_json(value: serde_json::Value) -> MortgageCalcResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// When the loan will be paid off under the current payment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payoff {
    /// Whole monthly payments still to make (a partial final month counts as one).
    pub remaining_payments: u32,
    /// Reference date plus `remaining_payments` calendar months.
    pub completion_date: NaiveDate,
}

/// Flat snapshot of a `LoanState` for display layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub initial_loan: Money,
    pub current_principal: Money,
    pub term_years: u32,
    pub annual_interest_rate: Rate,
    pub extra_monthly_payment: Money,
    pub reference_date: NaiveDate,
    pub base_monthly_payment: Option<Money>,
    pub total_monthly_payment: Option<Money>,
    pub remaining_payments: Option<u32>,
    pub completion_date: Option<NaiveDate>,
    /// Payments saved by the extra monthly amount, when both plans converge.
    pub months_saved: Option<u32>,
    /// Why the payoff could not be derived, if it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_error: Option<String>,
}

/// A fixed-rate loan with its derived payment and payoff values.
///
/// Construction never fails. A derivation that is undefined for the current
/// inputs (zero term, payment below the monthly interest) is kept as an `Err`
/// and handed back by the accessor until an input change fixes it.
///
/// Mutation takes `&mut self`; callers sharing one instance across threads
/// must serialize access themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanState {
    initial_loan: Money,
    current_principal: Money,
    term_years: u32,
    annual_interest_rate: Rate,
    extra_monthly_payment: Money,
    reference_date: NaiveDate,
    base_monthly_payment: MortgageCalcResult<Money>,
    payoff: MortgageCalcResult<Payoff>,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl LoanState {
    /// Build the model with no extra payment. `reference_date` is "now" for
    /// every payoff date this instance will report.
    pub fn new(
        initial_loan: Money,
        current_principal: Money,
        term_years: u32,
        annual_interest_rate: Rate,
        reference_date: NaiveDate,
    ) -> Self {
        let mut state = Self {
            initial_loan,
            current_principal,
            term_years,
            annual_interest_rate,
            extra_monthly_payment: Decimal::ZERO,
            reference_date,
            base_monthly_payment: Ok(Decimal::ZERO),
            payoff: Ok(Payoff {
                remaining_payments: 0,
                completion_date: reference_date,
            }),
        };
        state.recompute_base_payment();
        state.recompute_payoff();
        state
    }

    /// Rebuild a saved session: constructor, then the extra payment.
    pub fn from_inputs(inputs: &LoanInputs, reference_date: NaiveDate) -> Self {
        let mut state = Self::new(
            inputs.initial_loan,
            inputs.current_principal,
            inputs.term_years,
            inputs.annual_interest_rate,
            reference_date,
        );
        state.set_extra_monthly_payment(inputs.extra_monthly_payment);
        state
    }
}

// ---------------------------------------------------------------------------
// Mutators
// ---------------------------------------------------------------------------

impl LoanState {
    pub fn set_initial_loan(&mut self, initial_loan: Money) {
        self.initial_loan = initial_loan;
        self.recompute_base_payment();
        self.recompute_payoff();
    }

    pub fn set_current_principal(&mut self, current_principal: Money) {
        self.current_principal = current_principal;
        self.recompute_payoff();
    }

    pub fn set_term_years(&mut self, term_years: u32) {
        self.term_years = term_years;
        self.recompute_base_payment();
        self.recompute_payoff();
    }

    pub fn set_annual_interest_rate(&mut self, annual_interest_rate: Rate) {
        self.annual_interest_rate = annual_interest_rate;
        self.recompute_base_payment();
        self.recompute_payoff();
    }

    pub fn set_extra_monthly_payment(&mut self, extra_monthly_payment: Money) {
        self.extra_monthly_payment = extra_monthly_payment;
        self.recompute_payoff();
    }
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl LoanState {
    pub fn initial_loan(&self) -> Money {
        self.initial_loan
    }

    pub fn current_principal(&self) -> Money {
        self.current_principal
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn annual_interest_rate(&self) -> Rate {
        self.annual_interest_rate
    }

    pub fn extra_monthly_payment(&self) -> Money {
        self.extra_monthly_payment
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn monthly_interest_rate(&self) -> Rate {
        amortization::monthly_rate(self.annual_interest_rate)
    }

    /// Contractual payment amortizing `initial_loan` over the full term.
    pub fn base_monthly_payment(&self) -> MortgageCalcResult<Money> {
        self.base_monthly_payment.clone()
    }

    /// Base payment plus the extra payment.
    pub fn total_monthly_payment(&self) -> MortgageCalcResult<Money> {
        let base = self.base_monthly_payment.clone()?;
        base.checked_add(self.extra_monthly_payment)
            .ok_or_else(|| MortgageCalcError::NumericOverflow {
                context: "base + extra monthly payment".into(),
            })
    }

    pub fn payoff(&self) -> MortgageCalcResult<Payoff> {
        self.payoff.clone()
    }

    pub fn remaining_payments(&self) -> MortgageCalcResult<u32> {
        self.payoff().map(|p| p.remaining_payments)
    }

    pub fn completion_date(&self) -> MortgageCalcResult<NaiveDate> {
        self.payoff().map(|p| p.completion_date)
    }

    /// The five inputs, for saving the session.
    pub fn inputs(&self) -> LoanInputs {
        LoanInputs {
            initial_loan: self.initial_loan,
            current_principal: self.current_principal,
            term_years: self.term_years,
            annual_interest_rate: self.annual_interest_rate,
            extra_monthly_payment: self.extra_monthly_payment,
        }
    }

    /// Payments saved by the extra amount compared with paying only the base
    /// payment. `None` when either plan has no payoff.
    pub fn months_saved(&self) -> Option<u32> {
        let with_extra = self.payoff.as_ref().ok()?.remaining_payments;
        if self.extra_monthly_payment.is_zero() {
            return Some(0);
        }

        let mut base_only = self.clone();
        base_only.set_extra_monthly_payment(Decimal::ZERO);
        let without_extra = base_only.payoff.ok()?.remaining_payments;
        Some(without_extra.saturating_sub(with_extra))
    }

    pub fn summary(&self) -> LoanSummary {
        LoanSummary {
            initial_loan: self.initial_loan,
            current_principal: self.current_principal,
            term_years: self.term_years,
            annual_interest_rate: self.annual_interest_rate,
            extra_monthly_payment: self.extra_monthly_payment,
            reference_date: self.reference_date,
            base_monthly_payment: self.base_monthly_payment.as_ref().ok().copied(),
            total_monthly_payment: self.total_monthly_payment().ok(),
            remaining_payments: self.remaining_payments().ok(),
            completion_date: self.completion_date().ok(),
            months_saved: self.months_saved(),
            payoff_error: self.payoff.as_ref().err().map(|e| e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Recomputation
// ---------------------------------------------------------------------------

impl LoanState {
    fn recompute_base_payment(&mut self) {
        self.base_monthly_payment = amortization::base_monthly_payment(
            self.initial_loan,
            self.term_years,
            self.annual_interest_rate,
        );
        debug!(
            initial_loan = %self.initial_loan,
            term_years = self.term_years,
            annual_interest_rate = %self.annual_interest_rate,
            base_monthly_payment = ?self.base_monthly_payment,
            "recomputed base monthly payment"
        );
    }

    fn recompute_payoff(&mut self) {
        self.payoff = self.derive_payoff();
        match &self.payoff {
            Ok(payoff) => debug!(
                current_principal = %self.current_principal,
                extra_monthly_payment = %self.extra_monthly_payment,
                remaining_payments = payoff.remaining_payments,
                completion_date = %payoff.completion_date,
                "recomputed payoff"
            ),
            Err(e) if e.is_payment_insufficient() => warn!(
                current_principal = %self.current_principal,
                extra_monthly_payment = %self.extra_monthly_payment,
                "{e}"
            ),
            Err(e) => debug!(error = %e, "payoff undefined for current inputs"),
        }
    }

    fn derive_payoff(&self) -> MortgageCalcResult<Payoff> {
        let payment = self.total_monthly_payment()?;
        let remaining_payments = amortization::remaining_payments(
            self.current_principal,
            payment,
            self.annual_interest_rate,
        )?;
        let completion_date =
            amortization::completion_date(self.reference_date, remaining_payments)?;
        Ok(Payoff {
            remaining_payments,
            completion_date,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
