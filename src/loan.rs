use chrono::{Months, NaiveDate};
use log::trace;

use crate::error::{LoanError, Result};

/// Interest rate applied per monthly period, as a fraction (0.0065 for 7.8% a year).
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonthlyRate(f64);

impl MonthlyRate {
    pub fn new(rate: f64) -> Result<Self> {
        if !rate.is_finite() || rate < 0. {
            return Err(LoanError::domain(format!(
                "monthly rate must be a finite value >= 0, got {rate}"
            )));
        }
        Ok(Self(rate))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.
    }
}

/// Interest-free split of a principal into equal monthly payments.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvenSplit {
    pub payment: u64,
    pub last_payment: u64,
}

impl EvenSplit {
    pub fn is_uniform(&self) -> bool {
        self.payment == self.last_payment
    }
}

/// Converts a nominal annual percentage (e.g. `7.8`) into a monthly rate.
pub fn monthly_rate(annual_percent: f64) -> Result<MonthlyRate> {
    MonthlyRate::new(annual_percent / 12. / 100.)
}

// i(1+i)^n / ((1+i)^n - 1), shared by the three annuity formulas
fn annuity_ratio(periods: u64, rate: MonthlyRate) -> Result<f64> {
    if rate.is_zero() {
        return Err(LoanError::domain(
            "annuity formulas are undefined for a zero interest rate",
        ));
    }
    require_positive("periods", periods)?;

    let i = rate.value();
    let factor = (1. + i).powf(periods as f64);
    let ratio = i * factor / (factor - 1.);
    trace!("annuity ratio for {} periods at {}: {}", periods, i, ratio);

    if !ratio.is_finite() {
        return Err(LoanError::domain(format!(
            "annuity ratio is not representable for {periods} periods"
        )));
    }
    Ok(ratio)
}

// rounded amount as whole currency units; NaN and overflow never reach the cast
fn to_units(amount: f64, what: &str) -> Result<u64> {
    if !amount.is_finite() || amount < 0. || amount >= u64::MAX as f64 {
        return Err(LoanError::domain(format!(
            "{what} of {amount} is outside the representable range"
        )));
    }
    Ok(amount as u64)
}

fn require_positive(name: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(LoanError::domain(format!("{name} must be greater than zero")));
    }
    Ok(())
}

/// Fixed monthly payment that repays `principal` over `periods` months, rounded up.
///
/// ```text
/// a = p * i(1+i)^n / ((1+i)^n - 1)
/// ```
pub fn annuity_payment(principal: u64, periods: u64, rate: MonthlyRate) -> Result<u64> {
    require_positive("principal", principal)?;
    let ratio = annuity_ratio(periods, rate)?;
    to_units((principal as f64 * ratio).ceil(), "payment")
}

/// Principal that a fixed `payment` repays over `periods` months.
///
/// Rounded down, so the lent amount is never overstated. This is deliberately
/// the opposite rounding of [`annuity_payment`].
pub fn principal_from_annuity(payment: u64, periods: u64, rate: MonthlyRate) -> Result<u64> {
    require_positive("payment", payment)?;
    let ratio = annuity_ratio(periods, rate)?;
    let principal = to_units((payment as f64 / ratio).floor(), "principal")?;
    require_positive("principal", principal)?;
    Ok(principal)
}

/// Number of monthly payments needed to repay `principal`, rounded up so a
/// partial final payment counts as a full period.
///
/// ```text
/// n = log_(1+i)( a / (a - i*p) )
/// ```
///
/// Fails when the payment does not exceed the first month's interest, since
/// such a loan is never repaid.
pub fn periods_from_annuity(principal: u64, payment: u64, rate: MonthlyRate) -> Result<u64> {
    require_positive("principal", principal)?;
    require_positive("payment", payment)?;
    if rate.is_zero() {
        return Err(LoanError::domain(
            "annuity formulas are undefined for a zero interest rate",
        ));
    }

    let i = rate.value();
    let payment = payment as f64;
    let interest = i * principal as f64;
    if payment <= interest {
        return Err(LoanError::domain(format!(
            "monthly payment {payment} does not cover the monthly interest of {interest:.2}"
        )));
    }

    // ln(a / (a - i*p)) / ln(1 + i), kept accurate for rates near zero
    let periods = -(-interest / payment).ln_1p() / i.ln_1p();
    trace!("raw period count: {}", periods);
    if periods.is_nan() || periods <= 0. {
        return Err(LoanError::domain(format!(
            "period count {periods} is not a positive number"
        )));
    }
    to_units(periods.ceil(), "period count")
}

/// Payment for each month under the differentiated scheme: an equal share of
/// the principal plus interest on the balance still outstanding.
///
/// Each payment is rounded up on its own. A zero rate is allowed here and
/// yields an even split of the principal.
pub fn differentiated_schedule(
    principal: u64,
    periods: u64,
    rate: MonthlyRate,
) -> Result<Vec<u64>> {
    require_positive("principal", principal)?;
    require_positive("periods", periods)?;

    let p = principal as f64;
    let n = periods as f64;
    let i = rate.value();

    (1..=periods)
        .map(|k| {
            let amount = p / n + i * (p - p * (k - 1) as f64 / n);
            trace!("month {}: {}", k, amount);
            to_units(amount.ceil(), "monthly payment")
        })
        .collect()
}

/// Amount paid above the principal, truncated toward zero.
pub fn overpayment(principal: u64, total_paid: f64) -> i64 {
    (total_paid - principal as f64).trunc() as i64
}

/// Human readable duration for a number of monthly periods, e.g.
/// `"2 years and 1 month"`.
///
/// Years and months are pluralized independently on their own values.
pub fn format_duration(periods: u64) -> String {
    if periods < 12 {
        return pluralize(periods, "month");
    }

    let years = periods / 12;
    let months = periods % 12;
    if months == 0 {
        pluralize(years, "year")
    } else {
        format!(
            "{} and {}",
            pluralize(years, "year"),
            pluralize(months, "month")
        )
    }
}

pub(crate) fn pluralize(count: u64, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Interest-free monthly payment, rounded up, with the smaller payment that
/// settles the remainder in the final month.
pub fn even_payment(principal: u64, periods: u64) -> Result<EvenSplit> {
    require_positive("principal", principal)?;
    require_positive("periods", periods)?;

    let payment = principal.div_ceil(periods);
    let paid_before_last = (periods - 1) * payment;
    if paid_before_last >= principal {
        // e.g. 10 over 7 months: six payments of 2 already exceed the principal
        return Err(LoanError::domain(format!(
            "{principal} cannot be split into {periods} whole monthly payments"
        )));
    }

    Ok(EvenSplit {
        payment,
        last_payment: principal - paid_before_last,
    })
}

/// Interest-free number of months needed to repay `principal` at `payment` a month.
pub fn even_periods(principal: u64, payment: u64) -> Result<u64> {
    require_positive("principal", principal)?;
    require_positive("payment", payment)?;
    Ok(principal.div_ceil(payment))
}

/// Due date of the final payment when payment 1 falls on `first_payment`
/// and payments follow monthly. Day of month is clamped to the month end.
pub fn last_payment_date(first_payment: NaiveDate, periods: u64) -> Result<NaiveDate> {
    require_positive("periods", periods)?;
    let months = u32::try_from(periods - 1)
        .map_err(|_| LoanError::domain(format!("{periods} periods overflow the calendar")))?;

    first_payment
        .checked_add_months(Months::new(months))
        .ok_or_else(|| {
            LoanError::domain(format!(
                "{first_payment} plus {periods} periods overflows the calendar"
            ))
        })
}
