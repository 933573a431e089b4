// src/error.rs

use thiserror::Error;

/// Failures while reading from the token contract.
#[derive(Error, Debug)]
pub enum RpcError {
    /// Node unreachable, malformed response or reverted call
    #[error("contract call `{call}` failed: {message}")]
    Call { call: String, message: String },

    /// The node did not answer within the configured timeout
    #[error("contract call `{call}` timed out after {secs}s")]
    Timeout { call: String, secs: u64 },
}

/// Failures of the cache store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cache store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache document is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can fail while serving an adjusted supply request.
#[derive(Error, Debug)]
pub enum SupplyError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

pub type SupplyResult<T> = Result<T, SupplyError>;
pub type StorageResult<T> = Result<T, StorageError>;
pub type RpcResult<T> = Result<T, RpcError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
