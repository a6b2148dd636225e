pub mod cli;
pub mod error;
pub mod interactive;
pub mod loan;
pub mod request;

use log::{info, warn};
use std::io::Write;

pub use cli::CliArgs;
pub use error::{LoanError, Result, INCORRECT_PARAMETERS};
pub use interactive::run_interactive;
pub use request::{LoanRequest, LoanResult, LoanTerms, Scheme, Solved};

/// Validates flag-mode arguments, solves the request and writes the result.
pub fn run_flags<W: Write>(args: &CliArgs, out: &mut W) -> Result<()> {
    let request = LoanRequest::try_from(args)?;
    let result = request.solve()?;
    info!("overpayment {} on total {}", result.overpayment(), result.total_paid());
    writeln!(out, "{result}")?;
    Ok(())
}

/// Logs why a request failed and tells the user on `out`.
pub fn report_failure<W: Write>(err: &LoanError, out: &mut W) {
    warn!("{}", err);
    if let Err(e) = writeln!(out, "{INCORRECT_PARAMETERS}") {
        warn!("could not write failure message: {}", e);
    }
}
