//! Prompt-driven entry point: reads the principal, a mode selector and the
//! numbers that mode needs, then prints one result.

use log::info;
use std::io::{BufRead, Write};

use crate::error::{LoanError, Result};
use crate::loan::{even_payment, even_periods, monthly_rate, pluralize, MonthlyRate};
use crate::request::{LoanRequest, LoanTerms, Scheme};

const SELECTOR_PROMPT: &str = "What do you want to calculate?
type \"n\" for number of monthly payments,
type \"a\" for annuity monthly payment amount,
type \"d\" for differentiated payments,
type \"m\" for number of monthly payments without interest,
type \"p\" for even monthly payment without interest:";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Mode {
    Periods,
    Payment,
    Differentiated,
    InterestFreePeriods,
    InterestFreePayment,
}

impl TryFrom<&str> for Mode {
    type Error = LoanError;

    fn try_from(selector: &str) -> Result<Self> {
        match selector {
            "n" => Ok(Mode::Periods),
            "a" => Ok(Mode::Payment),
            "d" => Ok(Mode::Differentiated),
            "m" => Ok(Mode::InterestFreePeriods),
            "p" | "e" => Ok(Mode::InterestFreePayment),
            other => Err(LoanError::malformed(format!("unknown selector {other:?}"))),
        }
    }
}

/// Runs one interactive session against `input`/`out`.
pub fn run_interactive<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<()> {
    let principal = prompt_positive(input, out, "Enter the loan principal:")?;
    let mode = Mode::try_from(prompt(input, out, SELECTOR_PROMPT)?.as_str())?;
    info!("interactive mode {:?} for principal {}", mode, principal);

    match mode {
        Mode::Periods => {
            let payment = prompt_positive(input, out, "Enter the monthly payment:")?;
            let rate = prompt_interest(input, out)?;
            solve(
                Scheme::Annuity,
                LoanTerms::PrincipalPayment { principal, payment },
                rate,
                out,
            )
        }
        Mode::Payment => {
            let periods = prompt_positive(input, out, "Enter the number of periods:")?;
            let rate = prompt_interest(input, out)?;
            solve(
                Scheme::Annuity,
                LoanTerms::PrincipalPeriods { principal, periods },
                rate,
                out,
            )
        }
        Mode::Differentiated => {
            let periods = prompt_positive(input, out, "Enter the number of periods:")?;
            let rate = prompt_interest(input, out)?;
            solve(
                Scheme::Differentiated,
                LoanTerms::PrincipalPeriods { principal, periods },
                rate,
                out,
            )
        }
        Mode::InterestFreePeriods => {
            let payment = prompt_positive(input, out, "Enter the monthly payment:")?;
            let periods = even_periods(principal, payment)?;
            writeln!(out)?;
            writeln!(
                out,
                "It will take {} to repay the loan",
                pluralize(periods, "month")
            )?;
            Ok(())
        }
        Mode::InterestFreePayment => {
            let periods = prompt_positive(input, out, "Enter the number of months:")?;
            let split = even_payment(principal, periods)?;
            writeln!(out)?;
            if split.is_uniform() {
                writeln!(out, "Your monthly payment = {}", split.payment)?;
            } else {
                writeln!(
                    out,
                    "Your monthly payment = {} and the last payment = {}.",
                    split.payment, split.last_payment
                )?;
            }
            Ok(())
        }
    }
}

fn solve<W: Write>(scheme: Scheme, terms: LoanTerms, rate: MonthlyRate, out: &mut W) -> Result<()> {
    let result = LoanRequest::new(scheme, terms, rate)?.solve()?;
    writeln!(out)?;
    writeln!(out, "{result}")?;
    Ok(())
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<String> {
    writeln!(out, "{question}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(LoanError::malformed(format!(
            "input ended before answering {question:?}"
        )));
    }
    Ok(line.trim().to_string())
}

fn prompt_positive<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    question: &str,
) -> Result<u64> {
    let answer = prompt(input, out, question)?;
    match answer.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(LoanError::malformed(format!(
            "expected a positive whole number, got {answer:?}"
        ))),
    }
}

fn prompt_interest<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<MonthlyRate> {
    let answer = prompt(input, out, "Enter the loan interest:")?;
    match answer.parse::<f64>() {
        Ok(interest) if interest >= 0. => monthly_rate(interest),
        _ => Err(LoanError::malformed(format!(
            "expected a non-negative interest rate, got {answer:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use test_log::test;

    fn session(answers: &str) -> (Result<()>, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut out = Vec::new();
        let outcome = run_interactive(&mut input, &mut out);
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_annuity_payment() {
        let (outcome, out) = session("1000000\na\n60\n10\n");
        outcome.unwrap();
        assert!(out.starts_with("Enter the loan principal:\nWhat do you want to calculate?"));
        assert!(out.contains("Enter the number of periods:\nEnter the loan interest:\n"));
        assert!(out.ends_with("\nYour annuity payment = 21248!\nOverpayment = 274880\n"));
    }

    #[test]
    fn test_number_of_payments() {
        let (outcome, out) = session("500000\nn\n23000\n7.8\n");
        outcome.unwrap();
        assert!(out.contains("Enter the monthly payment:\n"));
        assert!(out.ends_with("It will take 2 years to repay this loan!\nOverpayment = 52000\n"));
    }

    #[test]
    fn test_differentiated() {
        let (outcome, out) = session("1000000\nd\n10\n10\n");
        outcome.unwrap();
        assert!(out.contains("Month 1: payment is 108334\n"));
        assert!(out.contains("Month 10: payment is 100834\n"));
        assert!(out.ends_with("\nOverpayment = 45837\n"));
    }

    #[test]
    fn test_interest_free_periods() {
        let (outcome, out) = session("1000\nm\n150\n");
        outcome.unwrap();
        assert!(out.ends_with("\nIt will take 7 months to repay the loan\n"));

        let (outcome, out) = session("1000\nm\n1000\n");
        outcome.unwrap();
        assert!(out.ends_with("\nIt will take 1 month to repay the loan\n"));
    }

    #[test]
    fn test_interest_free_payment() {
        let (outcome, out) = session("1000\ne\n10\n");
        outcome.unwrap();
        assert!(out.contains("Enter the number of months:\n"));
        assert!(out.ends_with("\nYour monthly payment = 100\n"));

        let (outcome, out) = session("1000\np\n9\n");
        outcome.unwrap();
        assert!(out.contains("type \"p\" for even monthly payment without interest:"));
        assert!(out.ends_with("\nYour monthly payment = 112 and the last payment = 104.\n"));

        let (outcome, out) = session("1000\ne\n9\n");
        outcome.unwrap();
        assert!(out.ends_with("\nYour monthly payment = 112 and the last payment = 104.\n"));
    }

    #[test]
    fn test_rejected_input() {
        for answers in ["abc\n", "-5\n", "0\n", "1000\nx\n", "1000\na\n10\n-3\n", "1000\na\n"] {
            let (outcome, _) = session(answers);
            assert!(
                matches!(outcome, Err(LoanError::MalformedArguments { .. })),
                "{answers:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_interest_is_a_domain_error() {
        let (outcome, _) = session("1000\na\n10\n0\n");
        assert!(matches!(outcome, Err(LoanError::Domain { .. })));
    }
}
