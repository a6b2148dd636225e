use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use log::{debug, LevelFilter};

use crate::error::{LoanError, Result};
use crate::loan::monthly_rate;
use crate::request::{LoanRequest, LoanTerms, Scheme};

/// Loan repayment calculator
#[derive(Parser, Debug)]
#[command(
    name = "creditcalc",
    version,
    about = "Loan repayment calculator",
    long_about = "Computes the monthly payment, the number of payments or the loan \
                  principal of an annuity loan, or the monthly payments of a \
                  differentiated loan, together with the overpayment.",
    allow_negative_numbers = true
)]
pub struct CliArgs {
    /// Repayment scheme
    #[arg(long = "type", value_enum)]
    pub scheme: Option<SchemeArg>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<i64>,

    /// Number of monthly payments
    #[arg(long)]
    pub periods: Option<i64>,

    /// Nominal annual interest rate, in percent
    #[arg(long)]
    pub interest: Option<f64>,

    /// Monthly annuity payment
    #[arg(long)]
    pub payment: Option<i64>,

    /// Date of the first payment (YYYY-MM-DD), to report when the last one is due
    #[arg(long)]
    pub first_payment: Option<NaiveDate>,

    /// Prompt for the inputs instead of reading flags
    #[arg(short, long)]
    pub interactive: bool,

    /// Log level written to stderr
    #[arg(long, default_value = "warn")]
    pub log_level: LevelFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemeArg {
    Annuity,
    Diff,
}

impl From<SchemeArg> for Scheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Annuity => Scheme::Annuity,
            SchemeArg::Diff => Scheme::Differentiated,
        }
    }
}

// zero means the value was left for the calculator to solve
fn known(flag: &str, value: Option<i64>) -> Result<Option<u64>> {
    match value {
        None | Some(0) => Ok(None),
        Some(v) if v < 0 => Err(LoanError::malformed(format!("{flag} cannot be negative"))),
        Some(v) => Ok(Some(v as u64)),
    }
}

impl TryFrom<&CliArgs> for LoanRequest {
    type Error = LoanError;

    fn try_from(args: &CliArgs) -> Result<Self> {
        let supplied = [
            args.scheme.is_some(),
            args.principal.is_some(),
            args.periods.is_some(),
            args.interest.is_some(),
            args.payment.is_some(),
        ]
        .iter()
        .filter(|given| **given)
        .count();
        if supplied < 4 {
            return Err(LoanError::malformed(format!(
                "expected at least four parameters, got {supplied}"
            )));
        }

        let scheme: Scheme = args
            .scheme
            .ok_or_else(|| LoanError::malformed("--type is required"))?
            .into();

        let interest = args
            .interest
            .ok_or_else(|| LoanError::malformed("--interest is required"))?;
        if interest < 0. {
            return Err(LoanError::malformed("--interest cannot be negative"));
        }
        let rate = monthly_rate(interest)?;

        let principal = known("--principal", args.principal)?;
        let periods = known("--periods", args.periods)?;
        let payment = known("--payment", args.payment)?;
        debug!(
            "parsed {} principal={:?} periods={:?} payment={:?} rate={}",
            scheme,
            principal,
            periods,
            payment,
            rate.value()
        );

        let terms = match (scheme, principal, periods, payment) {
            (Scheme::Differentiated, _, _, Some(_)) => {
                return Err(LoanError::malformed(
                    "--payment cannot be combined with --type=diff",
                ))
            }
            (_, Some(principal), Some(periods), None) => {
                LoanTerms::PrincipalPeriods { principal, periods }
            }
            (Scheme::Annuity, Some(principal), None, Some(payment)) => {
                LoanTerms::PrincipalPayment { principal, payment }
            }
            (Scheme::Annuity, None, Some(periods), Some(payment)) => {
                LoanTerms::PaymentPeriods { payment, periods }
            }
            (Scheme::Differentiated, ..) => {
                return Err(LoanError::malformed(
                    "--type=diff needs --principal and --periods",
                ))
            }
            (Scheme::Annuity, ..) => {
                return Err(LoanError::malformed(
                    "--type=annuity needs exactly two of --principal, --periods, --payment",
                ))
            }
        };

        let request = LoanRequest::new(scheme, terms, rate)?;
        Ok(match args.first_payment {
            Some(date) => request.with_first_payment(date),
            None => request,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn parse(args: &[&str]) -> Result<LoanRequest> {
        let argv = std::iter::once("creditcalc").chain(args.iter().copied());
        let args = CliArgs::try_parse_from(argv).map_err(|e| LoanError::malformed(e.to_string()))?;
        LoanRequest::try_from(&args)
    }

    #[test]
    fn test_annuity_variants() {
        let request = parse(&[
            "--type=annuity",
            "--principal=1000000",
            "--periods=60",
            "--interest=10",
        ])
        .unwrap();
        assert_eq!(request.scheme(), Scheme::Annuity);
        assert_eq!(
            request.terms(),
            LoanTerms::PrincipalPeriods {
                principal: 1_000_000,
                periods: 60
            }
        );

        let request = parse(&[
            "--type=annuity",
            "--principal=500000",
            "--payment=23000",
            "--interest=7.8",
        ])
        .unwrap();
        assert_eq!(
            request.terms(),
            LoanTerms::PrincipalPayment {
                principal: 500_000,
                payment: 23_000
            }
        );

        let request = parse(&[
            "--type", "annuity", "--payment", "8722", "--periods", "120", "--interest", "5.6",
        ])
        .unwrap();
        assert_eq!(
            request.terms(),
            LoanTerms::PaymentPeriods {
                payment: 8722,
                periods: 120
            }
        );
    }

    #[test]
    fn test_zero_is_unset() {
        let request = parse(&[
            "--type=annuity",
            "--principal=1000",
            "--periods=12",
            "--payment=0",
            "--interest=10",
        ])
        .unwrap();
        assert_eq!(
            request.terms(),
            LoanTerms::PrincipalPeriods {
                principal: 1_000,
                periods: 12
            }
        );
    }

    #[test]
    fn test_diff() {
        let request = parse(&[
            "--type=diff",
            "--principal=1000000",
            "--periods=10",
            "--interest=10",
        ])
        .unwrap();
        assert_eq!(request.scheme(), Scheme::Differentiated);
    }

    #[test]
    fn test_first_payment() {
        let request = parse(&[
            "--type=diff",
            "--principal=1000",
            "--periods=10",
            "--interest=10",
            "--first-payment=2025-01-15",
        ])
        .unwrap();
        let result = request.solve().unwrap();
        assert_eq!(
            result.last_payment_date(),
            NaiveDate::from_ymd_opt(2025, 10, 15)
        );
    }

    #[test]
    fn test_incorrect_parameters() {
        let rejected: &[&[&str]] = &[
            // missing interest
            &["--type=annuity", "--principal=1000000", "--periods=60"],
            &["--type=annuity", "--principal=1000000", "--periods=60", "--payment=100"],
            // unknown or missing type
            &["--type=fixed", "--principal=1000", "--periods=10", "--interest=10"],
            &["--principal=1000", "--periods=10", "--interest=10", "--payment=100"],
            // diff with a payment
            &["--type=diff", "--principal=1000000", "--interest=10", "--payment=100000"],
            // negative values
            &["--type=diff", "--principal=30000", "--periods=-14", "--interest=10"],
            &["--type", "annuity", "--principal", "-1000", "--periods", "10", "--interest", "10"],
            &["--type=annuity", "--principal=1000", "--periods=10", "--interest=-10"],
            // every quantity known
            &[
                "--type=annuity",
                "--principal=1000",
                "--periods=10",
                "--payment=100",
                "--interest=10",
            ],
            // unparsable
            &["--type=annuity", "--principal=ten", "--periods=10", "--interest=10"],
            &[
                "--type=annuity",
                "--principal=1000",
                "--periods=10",
                "--interest=10",
                "--colour=red",
            ],
        ];

        for args in rejected {
            assert!(
                matches!(parse(args), Err(LoanError::MalformedArguments { .. })),
                "{args:?} should be rejected"
            );
        }
    }
}
