//! Error types for the contract-read transport.

use alloy_transport::TransportError;
use thiserror::Error;

/// Errors raised while talking to an Ethereum node.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("invalid RPC endpoint {0}")]
    InvalidEndpoint(String),

    /// Request never produced a response
    #[error("transport error: {0}")]
    Transport(String),

    /// Node answered with a JSON-RPC error object
    #[error("node returned error {code}: {message}")]
    Node { code: i64, message: String },

    /// Return data did not match the expected ABI type
    #[error("ABI decode error: {0}")]
    Decode(#[from] alloy_sol_types::Error),
}

impl From<TransportError> for RpcError {
    fn from(err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => RpcError::Node {
                code: payload.code,
                message: payload.message.to_string(),
            },
            None => RpcError::Transport(err.to_string()),
        }
    }
}

/// Result type for RPC operations.
pub type RpcResult<T> = std::result::Result<T, RpcError>;
