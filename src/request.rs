use chrono::NaiveDate;
use log::info;
use std::fmt;

use crate::error::{LoanError, Result};
use crate::loan::{
    annuity_payment, differentiated_schedule, format_duration, last_payment_date, overpayment,
    periods_from_annuity, principal_from_annuity, MonthlyRate,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scheme {
    Annuity,
    Differentiated,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Annuity => write!(f, "annuity"),
            Scheme::Differentiated => write!(f, "diff"),
        }
    }
}

/// The two known quantities of a request. The third one is what gets solved.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoanTerms {
    PrincipalPeriods { principal: u64, periods: u64 },
    PrincipalPayment { principal: u64, payment: u64 },
    PaymentPeriods { payment: u64, periods: u64 },
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LoanRequest {
    scheme: Scheme,
    terms: LoanTerms,
    rate: MonthlyRate,
    first_payment: Option<NaiveDate>,
}

impl LoanRequest {
    /// Validates the terms against the scheme. The differentiated scheme
    /// only works from a known principal and number of periods.
    pub fn new(scheme: Scheme, terms: LoanTerms, rate: MonthlyRate) -> Result<Self> {
        let values = match terms {
            LoanTerms::PrincipalPeriods { principal, periods } => [principal, periods],
            LoanTerms::PrincipalPayment { principal, payment } => [principal, payment],
            LoanTerms::PaymentPeriods { payment, periods } => [payment, periods],
        };
        if values.contains(&0) {
            return Err(LoanError::malformed(format!(
                "loan terms must be positive: {terms:?}"
            )));
        }

        if scheme == Scheme::Differentiated
            && !matches!(terms, LoanTerms::PrincipalPeriods { .. })
        {
            return Err(LoanError::malformed(
                "differentiated payments need a principal and a number of periods",
            ));
        }

        Ok(Self {
            scheme,
            terms,
            rate,
            first_payment: None,
        })
    }

    pub fn with_first_payment(self, first_payment: NaiveDate) -> Self {
        Self {
            first_payment: Some(first_payment),
            ..self
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn terms(&self) -> LoanTerms {
        self.terms
    }

    pub fn rate(&self) -> MonthlyRate {
        self.rate
    }

    /// Computes the missing quantity, the total paid and the overpayment.
    pub fn solve(&self) -> Result<LoanResult> {
        info!("solving {} request {:?}", self.scheme, self.terms);

        let (solved, principal, periods, total_paid) = match (self.scheme, self.terms) {
            (Scheme::Differentiated, LoanTerms::PrincipalPeriods { principal, periods }) => {
                let schedule = differentiated_schedule(principal, periods, self.rate)?;
                let total = schedule
                    .iter()
                    .try_fold(0u64, |acc, payment| acc.checked_add(*payment))
                    .ok_or_else(|| {
                        LoanError::domain(format!("{periods} payments overflow the total"))
                    })?;
                (Solved::Schedule(schedule), principal, periods, total)
            }
            (Scheme::Differentiated, _) => {
                return Err(LoanError::malformed(
                    "differentiated payments need a principal and a number of periods",
                ))
            }
            (Scheme::Annuity, LoanTerms::PrincipalPeriods { principal, periods }) => {
                let payment = annuity_payment(principal, periods, self.rate)?;
                (
                    Solved::Payment(payment),
                    principal,
                    periods,
                    total_of(payment, periods)?,
                )
            }
            (Scheme::Annuity, LoanTerms::PrincipalPayment { principal, payment }) => {
                let periods = periods_from_annuity(principal, payment, self.rate)?;
                (
                    Solved::Periods(periods),
                    principal,
                    periods,
                    total_of(payment, periods)?,
                )
            }
            (Scheme::Annuity, LoanTerms::PaymentPeriods { payment, periods }) => {
                let principal = principal_from_annuity(payment, periods, self.rate)?;
                (
                    Solved::Principal(principal),
                    principal,
                    periods,
                    total_of(payment, periods)?,
                )
            }
        };

        let last_payment_date = self
            .first_payment
            .map(|first| last_payment_date(first, periods))
            .transpose()?;

        Ok(LoanResult {
            solved,
            periods,
            total_paid,
            overpayment: overpayment(principal, total_paid as f64),
            last_payment_date,
        })
    }
}

fn total_of(payment: u64, periods: u64) -> Result<u64> {
    payment.checked_mul(periods).ok_or_else(|| {
        LoanError::domain(format!("{periods} payments of {payment} overflow the total"))
    })
}

/// The quantity a request solved for.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Solved {
    Payment(u64),
    Principal(u64),
    Periods(u64),
    Schedule(Vec<u64>),
}

#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanResult {
    solved: Solved,
    periods: u64,
    total_paid: u64,
    overpayment: i64,
    last_payment_date: Option<NaiveDate>,
}

impl LoanResult {
    pub fn solved(&self) -> &Solved {
        &self.solved
    }

    pub fn periods(&self) -> u64 {
        self.periods
    }

    pub fn total_paid(&self) -> u64 {
        self.total_paid
    }

    pub fn overpayment(&self) -> i64 {
        self.overpayment
    }

    pub fn last_payment_date(&self) -> Option<NaiveDate> {
        self.last_payment_date
    }
}

impl fmt::Display for LoanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.solved {
            Solved::Payment(payment) => writeln!(f, "Your annuity payment = {payment}!")?,
            Solved::Principal(principal) => writeln!(f, "Your loan principal = {principal}!")?,
            Solved::Periods(periods) => writeln!(
                f,
                "It will take {} to repay this loan!",
                format_duration(*periods)
            )?,
            Solved::Schedule(schedule) => {
                for (month, payment) in schedule.iter().enumerate() {
                    writeln!(f, "Month {}: payment is {}", month + 1, payment)?;
                }
                writeln!(f)?;
            }
        }
        write!(f, "Overpayment = {}", self.overpayment)?;
        if let Some(date) = self.last_payment_date {
            write!(f, "\nLast payment due on {date}.")?;
        }
        Ok(())
    }
}
