//! Error taxonomy for wallet analysis.
//!
//! Every variant is an input problem on the caller's side; the pipeline is
//! deterministic, so none of them is worth retrying.

/// Errors surfaced by the analyzer and its input decoders.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller supplied zero transaction records.
    #[error("transaction list is empty")]
    EmptyInput,

    /// Records exist but none of them reference the requested address.
    #[error("no transactions found for address {address}")]
    NoTransactions { address: String },

    /// An uploaded file could not be decoded into transaction records.
    #[error("malformed transaction file: {0}")]
    MalformedRow(String),
}

impl Error {
    /// Whether the error should be reported as a bad request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::NoTransactions { .. } | Self::MalformedRow(_)
        )
    }

    /// Short machine-readable reason, used as a metrics label.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::NoTransactions { .. } => "no_transactions",
            Self::MalformedRow(_) => "malformed_row",
        }
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Self::MalformedRow(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::NoTransactions {
            address: "0xabc".into(),
        };
        assert_eq!(err.to_string(), "no transactions found for address 0xabc");
        assert_eq!(Error::EmptyInput.to_string(), "transaction list is empty");
    }

    #[test]
    fn test_all_errors_are_client_errors() {
        assert!(Error::EmptyInput.is_client_error());
        assert!(Error::MalformedRow("bad".into()).is_client_error());
        assert_eq!(Error::MalformedRow("x".into()).reason(), "malformed_row");
    }
}
