//! Error types for building and submitting multisig proposals.

use thiserror::Error;

/// Errors raised by the proposal pipeline.
#[derive(Error, Debug)]
pub enum ProposalError {
    /// Nothing to propose
    #[error("transaction batch is empty")]
    EmptyBatch,

    /// No function with this name in the ABI
    #[error("function `{0}` not found in ABI")]
    UnknownFunction(String),

    /// No overload of the function takes this many arguments
    #[error("function `{name}` takes {expected} argument(s), got {got}")]
    ArgumentCount {
        name: String,
        expected: String,
        got: usize,
    },

    /// Argument could not be coerced into the parameter type
    #[error("failed to encode function call for {name}: {reason}")]
    Encoding { name: String, reason: String },

    /// No Safe Transaction Service known for this chain
    #[error("no Safe Transaction Service known for chain {0}")]
    UnsupportedChain(u64),

    #[error("signer error: {0}")]
    Signer(String),

    /// Reading the Safe nonce failed
    #[error("query error: {0}")]
    Query(#[from] crate::domain::QueryError),

    /// Service answered with a non-success status
    #[error("Safe Transaction Service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for ProposalError {
    fn from(err: reqwest::Error) -> Self {
        ProposalError::Http(err.to_string())
    }
}

/// Result type for proposal operations.
pub type ProposalResult<T> = std::result::Result<T, ProposalError>;
