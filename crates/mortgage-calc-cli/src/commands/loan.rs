use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_calc_core::analysis;
use mortgage_calc_core::{LoanInputs, LoanState};

use crate::input::{self, parse};

/// Loan inputs shared by every loan command. Flags override the input
/// document, which overrides the defaults.
#[derive(Args, Debug, Default)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Path to a JSON or YAML file of saved inputs
    #[arg(long)]
    pub input: Option<String>,

    /// Amount originally borrowed
    #[arg(long, value_parser = parse::amount)]
    pub initial_loan: Option<Decimal>,

    /// Amount currently owed
    #[arg(long, alias = "current-principal", value_parser = parse::amount)]
    pub principal: Option<Decimal>,

    /// Original term in whole years
    #[arg(long, alias = "term", value_parser = parse::term_years)]
    pub term_years: Option<u32>,

    /// Annual interest rate as a decimal (0.04 = 4%)
    #[arg(long, value_parser = parse::amount, conflicts_with = "rate_percent")]
    pub rate: Option<Decimal>,

    /// Annual interest rate as a percentage (4 = 4%)
    #[arg(long, value_parser = parse::percent)]
    pub rate_percent: Option<Decimal>,

    /// Date payoff is measured from (YYYY-MM-DD, default today)
    #[arg(long, value_parser = parse::date)]
    pub as_of: Option<NaiveDate>,
}

/// Arguments for the payoff summary
#[derive(Args)]
pub struct PayoffArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Extra amount paid each month on top of the base payment
    #[arg(long, alias = "addl", value_parser = parse::amount)]
    pub extra: Option<Decimal>,

    /// Exit with an error when the payment never pays the loan off
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for comparing extra payments
#[derive(Args)]
pub struct CompareExtraArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Extra monthly payments to compare, comma separated (e.g. 0,100,500)
    #[arg(long, required = true, value_delimiter = ',', value_parser = parse::amount)]
    pub extra: Vec<Decimal>,
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut inputs = resolve_inputs(&args.loan)?;
    if let Some(extra) = args.extra {
        inputs.extra_monthly_payment = extra;
    }
    let as_of = reference_date(&args.loan);

    if args.strict {
        LoanState::from_inputs(&inputs, as_of).payoff()?;
    }

    let result = analysis::analyze_payoff(&inputs, as_of);
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare_extra(args: CompareExtraArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = resolve_inputs(&args.loan)?;
    let as_of = reference_date(&args.loan);
    let result = analysis::compare_extra_payments(&inputs, as_of, &args.extra);
    Ok(serde_json::to_value(result)?)
}

pub fn run_defaults() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(LoanInputs::default())?)
}

/// Defaults, then the input file (or piped JSON), then individual flags.
fn resolve_inputs(args: &LoanArgs) -> Result<LoanInputs, Box<dyn std::error::Error>> {
    let base: LoanInputs = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        LoanInputs::from_json(data)?
    } else {
        LoanInputs::default()
    };
    Ok(apply_overrides(base, args))
}

fn apply_overrides(mut inputs: LoanInputs, args: &LoanArgs) -> LoanInputs {
    if let Some(v) = args.initial_loan {
        inputs.initial_loan = v;
    }
    if let Some(v) = args.principal {
        inputs.current_principal = v;
    }
    if let Some(v) = args.term_years {
        inputs.term_years = v;
    }
    if let Some(v) = args.rate.or(args.rate_percent) {
        inputs.annual_interest_rate = v;
    }
    inputs
}

fn reference_date(args: &LoanArgs) -> NaiveDate {
    args.as_of.unwrap_or_else(|| Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let args = LoanArgs {
            principal: Some(dec!(250_000)),
            rate_percent: Some(dec!(0.05)),
            ..LoanArgs::default()
        };
        let inputs = apply_overrides(LoanInputs::default(), &args);
        assert_eq!(
            inputs,
            LoanInputs {
                current_principal: dec!(250_000),
                annual_interest_rate: dec!(0.05),
                ..LoanInputs::default()
            }
        );
    }

    #[test]
    fn test_decimal_rate_wins_over_percent() {
        let args = LoanArgs {
            rate: Some(dec!(0.03)),
            rate_percent: Some(dec!(0.06)),
            ..LoanArgs::default()
        };
        assert_eq!(
            apply_overrides(LoanInputs::default(), &args).annual_interest_rate,
            dec!(0.03)
        );
    }

    #[test]
    fn test_as_of_pins_reference_date() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let args = LoanArgs {
            as_of: Some(day),
            ..LoanArgs::default()
        };
        assert_eq!(reference_date(&args), day);
    }

    #[test]
    fn test_defaults_command_output() {
        let value = run_defaults().unwrap();
        assert_eq!(value["term_years"], 30);
        assert_eq!(value["initial_loan"], "300000");
        assert_eq!(value["annual_interest_rate"], "0.04");
    }
}
