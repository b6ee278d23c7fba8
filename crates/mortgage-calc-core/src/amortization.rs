//! Level-payment amortization formulas.
//!
//! Pure functions over `rust_decimal::Decimal`: the contractual monthly payment
//! for a fixed-rate loan, the number of whole months needed to retire a balance
//! at a given payment, and the calendar date that many months out. Every
//! undefined case (zero term, a payment that never catches up with interest,
//! compounding overflow) comes back as a `MortgageCalcError` instead of a
//! panic or a nonsense number.

use chrono::{Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::MortgageCalcError;
use crate::types::{Money, Rate};
use crate::MortgageCalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MONTHS_IN_YEAR: u32 = 12;

/// Period counts are rounded to this many decimal places before the ceiling
/// is taken, so a payoff that lands on a whole month (up to ln/pow rounding
/// noise) is not pushed into the following month.
const PERIOD_SNAP_DP: u32 = 6;

/// Monthly rates smaller than this in magnitude are treated as zero. Below it
/// `ln(1 + i)` and `1 - i * principal / payment` keep too few significant
/// digits in a 28-digit Decimal, while the straight-line answer is already
/// exact to far more places than a whole-month count needs.
pub const MIN_COMPOUNDING_RATE: Rate = dec!(0.000000000001);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Nominal annual rate divided by twelve.
pub fn monthly_rate(annual_interest_rate: Rate) -> Rate {
    annual_interest_rate / Decimal::from(MONTHS_IN_YEAR)
}

/// Number of scheduled payments over the life of the loan.
pub fn total_payments(term_years: u32) -> u64 {
    u64::from(term_years) * u64::from(MONTHS_IN_YEAR)
}

/// Fixed monthly payment that amortizes `loan` over `term_years` at
/// `annual_interest_rate`.
///
/// With `i` the monthly rate and `n` the number of payments:
/// `loan * i(1+i)^n / ((1+i)^n - 1)`, or `loan / n` when `i` is zero or
/// below `MIN_COMPOUNDING_RATE`.
pub fn base_monthly_payment(
    loan: Money,
    term_years: u32,
    annual_interest_rate: Rate,
) -> MortgageCalcResult<Money> {
    let i = monthly_rate(annual_interest_rate);
    validate_monthly_rate(i)?;
    let n = total_payments(term_years);

    if n == 0 {
        return Err(MortgageCalcError::DivisionByZero {
            context: "base monthly payment with a zero-year term".into(),
        });
    }

    if is_negligible(i) {
        return Ok(loan / Decimal::from(n));
    }

    let growth = (Decimal::ONE + i)
        .checked_powu(n)
        .ok_or_else(|| overflow("(1 + i)^n in base monthly payment"))?;
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return Err(MortgageCalcError::DivisionByZero {
            context: "(1 + i)^n - 1 in base monthly payment".into(),
        });
    }

    let factor = i
        .checked_mul(growth)
        .and_then(|num| num.checked_div(denominator))
        .ok_or_else(|| overflow("annuity factor in base monthly payment"))?;

    loan.checked_mul(factor)
        .ok_or_else(|| overflow("base monthly payment"))
}

/// Whole months needed to retire `principal` paying `payment` every month at
/// `annual_interest_rate`.
///
/// Solves `principal = payment * (1 - (1+i)^-n) / i` for `n` and rounds up:
/// `n = -ln(1 - i * principal / payment) / ln(1 + i)`, or
/// `principal / payment` when `i` is zero or below `MIN_COMPOUNDING_RATE`,
/// matching `base_monthly_payment`. A balance that is already zero or
/// negative needs no further payments.
///
/// Returns `PaymentInsufficient` when the payment is not positive or does not
/// exceed the interest accruing each month.
pub fn remaining_payments(
    principal: Money,
    payment: Money,
    annual_interest_rate: Rate,
) -> MortgageCalcResult<u32> {
    let i = monthly_rate(annual_interest_rate);
    validate_monthly_rate(i)?;

    if principal <= Decimal::ZERO {
        return Ok(0);
    }

    // Taken from the annual rate directly so a payment equal to the interest
    // compares equal instead of missing by the truncation of rate / 12.
    let monthly_interest = principal
        .checked_mul(annual_interest_rate)
        .ok_or_else(|| overflow("monthly interest in remaining payments"))?
        / Decimal::from(MONTHS_IN_YEAR);

    if payment <= Decimal::ZERO {
        return Err(MortgageCalcError::PaymentInsufficient {
            payment,
            monthly_interest,
        });
    }

    let interest_share = monthly_interest
        .checked_div(payment)
        .ok_or_else(|| overflow("interest share of payment"))?;
    if interest_share >= Decimal::ONE {
        return Err(MortgageCalcError::PaymentInsufficient {
            payment,
            monthly_interest,
        });
    }

    let periods = if is_negligible(i) {
        principal
            .checked_div(payment)
            .ok_or_else(|| overflow("principal / payment in remaining payments"))?
    } else {
        let numerator = (Decimal::ONE - interest_share).checked_ln().ok_or(
            MortgageCalcError::PaymentInsufficient {
                payment,
                monthly_interest,
            },
        )?;
        let denominator = (Decimal::ONE + i)
            .checked_ln()
            .ok_or_else(|| overflow("ln(1 + i) in remaining payments"))?;
        if denominator.is_zero() {
            return Err(MortgageCalcError::DivisionByZero {
                context: "ln(1 + i) in remaining payments".into(),
            });
        }

        (-numerator)
            .checked_div(denominator)
            .ok_or_else(|| overflow("period count in remaining payments"))?
    };

    periods
        .round_dp(PERIOD_SNAP_DP)
        .ceil()
        .max(Decimal::ZERO)
        .to_u32()
        .ok_or_else(|| overflow("remaining payment count"))
}

/// `reference` plus `months` calendar months. Days past the end of the target
/// month clamp to its last day (Jan 31 + 1 month = Feb 28/29).
pub fn completion_date(reference: NaiveDate, months: u32) -> MortgageCalcResult<NaiveDate> {
    reference
        .checked_add_months(Months::new(months))
        .ok_or_else(|| {
            MortgageCalcError::DateError(format!(
                "{reference} + {months} months is outside the supported calendar range"
            ))
        })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_monthly_rate(i: Rate) -> MortgageCalcResult<()> {
    if i <= dec!(-1) {
        return Err(MortgageCalcError::InvalidInput {
            field: "annual_interest_rate".into(),
            reason: "Monthly rate must be greater than -100%".into(),
        });
    }
    Ok(())
}

fn is_negligible(i: Rate) -> bool {
    i.abs() < MIN_COMPOUNDING_RATE
}

fn overflow(context: &str) -> MortgageCalcError {
    MortgageCalcError::NumericOverflow {
        context: context.into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Roll `principal` forward month by month: accrue interest, subtract payment.
    fn balance_after(principal: Money, payment: Money, annual_rate: Rate, months: u64) -> Money {
        let i = monthly_rate(annual_rate);
        let mut balance = principal;
        for _ in 0..months {
            balance = balance * (Decimal::ONE + i) - payment;
        }
        balance
    }

    #[test]
    fn test_monthly_rate_is_annual_over_twelve() {
        assert_eq!(monthly_rate(dec!(0.12)), dec!(0.01));
        assert_eq!(monthly_rate(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_total_payments_does_not_overflow_u32() {
        assert_eq!(total_payments(30), 360);
        assert_eq!(total_payments(u32::MAX), u64::from(u32::MAX) * 12);
    }

    #[test]
    fn test_base_payment_30y_4pct() {
        let pmt = base_monthly_payment(dec!(300_000), 30, dec!(0.04)).unwrap();
        assert!(
            (pmt - dec!(1432.25)).abs() < dec!(0.01),
            "Expected ~1432.25, got {pmt}"
        );
    }

    #[test]
    fn test_base_payment_amortizes_loan_to_zero() {
        for (loan, years, rate) in [
            (dec!(300_000), 30u32, dec!(0.04)),
            (dec!(150_000), 15, dec!(0.065)),
            (dec!(25_000), 5, dec!(0.0199)),
        ] {
            let pmt = base_monthly_payment(loan, years, rate).unwrap();
            let residual = balance_after(loan, pmt, rate, total_payments(years));
            assert!(
                (residual / loan).abs() < dec!(0.000001),
                "Residual {residual} too large for loan {loan} over {years}y at {rate}"
            );
        }
    }

    #[test]
    fn test_base_payment_zero_rate_is_straight_line() {
        let pmt = base_monthly_payment(dec!(300_000), 30, Decimal::ZERO).unwrap();
        assert_eq!(pmt, dec!(300_000) / dec!(360));
    }

    #[test]
    fn test_base_payment_zero_term_is_division_by_zero() {
        for rate in [Decimal::ZERO, dec!(0.04)] {
            let err = base_monthly_payment(dec!(300_000), 0, rate).unwrap_err();
            assert!(
                matches!(err, MortgageCalcError::DivisionByZero { .. }),
                "Expected DivisionByZero, got {err:?}"
            );
        }
    }

    #[test]
    fn test_base_payment_rejects_rate_at_minus_100pct_monthly() {
        let err = base_monthly_payment(dec!(1000), 1, dec!(-12)).unwrap_err();
        assert!(matches!(err, MortgageCalcError::InvalidInput { .. }));
    }

    #[test]
    fn test_base_payment_scales_linearly_with_loan() {
        let one = base_monthly_payment(dec!(100_000), 30, dec!(0.05)).unwrap();
        let three = base_monthly_payment(dec!(300_000), 30, dec!(0.05)).unwrap();
        assert!((three - one * dec!(3)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_remaining_payments_full_term() {
        let pmt = base_monthly_payment(dec!(300_000), 30, dec!(0.04)).unwrap();
        assert_eq!(remaining_payments(dec!(300_000), pmt, dec!(0.04)).unwrap(), 360);
    }

    #[test]
    fn test_remaining_payments_with_extra_is_shorter() {
        let pmt = base_monthly_payment(dec!(300_000), 30, dec!(0.04)).unwrap();
        let n = remaining_payments(dec!(300_000), pmt + dec!(500), dec!(0.04)).unwrap();
        // -ln(1 - 1000/1932.2459) / ln(1.003333) = 219.02 -> 220
        assert_eq!(n, 220);
    }

    #[test]
    fn test_remaining_payments_partial_month_rounds_up() {
        let pmt = base_monthly_payment(dec!(300_000), 30, dec!(0.04)).unwrap();
        // 262.0007 months rounds up to 263
        assert_eq!(remaining_payments(dec!(250_000), pmt, dec!(0.04)).unwrap(), 263);
    }

    #[test]
    fn test_remaining_payments_zero_rate_ceiling() {
        assert_eq!(remaining_payments(dec!(1000), dec!(300), Decimal::ZERO).unwrap(), 4);
        assert_eq!(remaining_payments(dec!(3000), dec!(1000), Decimal::ZERO).unwrap(), 3);
    }

    #[test]
    fn test_remaining_payments_zero_payment_is_insufficient() {
        let err = remaining_payments(dec!(300_000), Decimal::ZERO, Decimal::ZERO).unwrap_err();
        assert_eq!(
            err,
            MortgageCalcError::PaymentInsufficient {
                payment: Decimal::ZERO,
                monthly_interest: Decimal::ZERO,
            }
        );
    }

    #[test]
    fn test_remaining_payments_negative_payment_is_insufficient() {
        let err = remaining_payments(dec!(1000), dec!(-10), dec!(0.04)).unwrap_err();
        assert!(err.is_payment_insufficient());
    }

    #[test]
    fn test_remaining_payments_interest_only_payment_is_insufficient() {
        // 300k at 4%: 1000/month of interest. Paying exactly that never reduces the balance.
        let err = remaining_payments(dec!(300_000), dec!(1000), dec!(0.04)).unwrap_err();
        assert!(err.is_payment_insufficient(), "got {err:?}");

        let err = remaining_payments(dec!(300_000), dec!(999.99), dec!(0.04)).unwrap_err();
        assert!(err.is_payment_insufficient(), "got {err:?}");
    }

    #[test]
    fn test_remaining_payments_just_above_interest_converges() {
        let n = remaining_payments(dec!(300_000), dec!(1000.01), dec!(0.04)).unwrap();
        assert!(n > 360, "Barely-amortizing payment should take very long, got {n}");
    }

    #[test]
    fn test_remaining_payments_paid_off_balance() {
        assert_eq!(remaining_payments(Decimal::ZERO, dec!(1000), dec!(0.04)).unwrap(), 0);
        assert_eq!(remaining_payments(dec!(-50), Decimal::ZERO, dec!(0.04)).unwrap(), 0);
    }

    #[test]
    fn test_remaining_payments_payment_exceeds_balance() {
        assert_eq!(remaining_payments(dec!(500), dec!(1432.25), dec!(0.04)).unwrap(), 1);
    }

    #[test]
    fn test_tiny_rates_pay_off_over_full_term() {
        for years in [1u32, 15, 30] {
            for scale in 4..=28 {
                let rate = Decimal::new(1, scale);
                let pmt = base_monthly_payment(dec!(300_000), years, rate)
                    .unwrap_or_else(|e| panic!("rate {rate} over {years}y: {e:?}"));
                let n = remaining_payments(dec!(300_000), pmt, rate)
                    .unwrap_or_else(|e| panic!("rate {rate} over {years}y: {e:?}"));
                assert_eq!(
                    u64::from(n),
                    total_payments(years),
                    "rate {rate} over {years}y"
                );
            }
        }
    }

    #[test]
    fn test_tiny_rate_still_detects_insufficient_payment() {
        // 300k at 1e-10 annual accrues 2.5e-6 a month.
        let err =
            remaining_payments(dec!(300_000), dec!(0.000001), dec!(0.0000000001)).unwrap_err();
        assert!(err.is_payment_insufficient(), "got {err:?}");
    }

    #[test]
    fn test_completion_date_adds_calendar_months() {
        assert_eq!(
            completion_date(date(2026, 10, 17), 360).unwrap(),
            date(2056, 10, 17)
        );
        assert_eq!(completion_date(date(2026, 10, 17), 3).unwrap(), date(2027, 1, 17));
        assert_eq!(completion_date(date(2026, 10, 17), 0).unwrap(), date(2026, 10, 17));
    }

    #[test]
    fn test_completion_date_clamps_day_of_month() {
        assert_eq!(completion_date(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(completion_date(date(2025, 1, 31), 1).unwrap(), date(2025, 2, 28));
        assert_eq!(completion_date(date(2025, 8, 31), 1).unwrap(), date(2025, 9, 30));
    }

    #[test]
    fn test_completion_date_out_of_range() {
        let err = completion_date(date(2026, 1, 1), u32::MAX).unwrap_err();
        assert!(matches!(err, MortgageCalcError::DateError(_)));
    }
}
