//! Text-to-number parsing for command-line values.
//!
//! Blank text counts as zero, the same way an emptied form field does, so
//! `--extra ""` clears the extra payment instead of failing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

pub fn amount(s: &str) -> Result<Decimal, String> {
    let text = s.trim();
    if text.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(text).map_err(|e| format!("'{text}' is not a number: {e}"))
}

/// A rate typed as a percentage (`4.25`) converted to a decimal (`0.0425`).
pub fn percent(s: &str) -> Result<Decimal, String> {
    Ok(amount(s)? / dec!(100))
}

pub fn term_years(s: &str) -> Result<u32, String> {
    let text = s.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse::<u32>()
        .map_err(|e| format!("'{text}' is not a whole number of years: {e}"))
}

pub fn date(s: &str) -> Result<NaiveDate, String> {
    let text = s.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| format!("'{text}' is not a YYYY-MM-DD date: {e}"))
}
