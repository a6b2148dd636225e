use thiserror::Error;

/// Message shown to the user for every rejected request.
pub const INCORRECT_PARAMETERS: &str = "Incorrect parameters";

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("malformed arguments: {message}")]
    MalformedArguments { message: String },

    #[error("domain error: {message}")]
    Domain { message: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoanError {
    pub fn malformed(message: impl Into<String>) -> Self {
        LoanError::MalformedArguments {
            message: message.into(),
        }
    }

    pub fn domain(message: impl Into<String>) -> Self {
        LoanError::Domain {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
