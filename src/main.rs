use clap::error::ErrorKind;
use clap::Parser;
use creditcalc::{report_failure, run_flags, run_interactive, CliArgs, LoanError};
use log::{warn, LevelFilter};
use simple_logger::SimpleLogger;
use std::io;
use std::process::ExitCode;

fn init_logging(level: LevelFilter) {
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("logger already initialised: {e}");
    }
}

fn main() -> ExitCode {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            init_logging(LevelFilter::Warn);
            report_failure(&LoanError::malformed(e.to_string()), &mut out);
            return ExitCode::FAILURE;
        }
    };
    init_logging(args.log_level);

    let outcome = if args.interactive {
        if args.scheme.is_some() || args.principal.is_some() {
            warn!("flag values are ignored in interactive mode");
        }
        run_interactive(&mut io::stdin().lock(), &mut out)
    } else {
        run_flags(&args, &mut out)
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e, &mut out);
            ExitCode::FAILURE
        }
    }
}

// verifies that results can be shared across threads
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<creditcalc::LoanResult>();
    is_normal::<creditcalc::LoanRequest>();
}
