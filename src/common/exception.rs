use thiserror::Error;

use crate::common::config::TxnId;

/// Failures raised while building or querying a [`Schema`](crate::catalog::schema::Schema).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    #[error("No such field: {0}")]
    NoSuchField(String),
}

/// Errors surfaced by the page cache, heap files and scan cursors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DBError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Transaction {0} aborted")]
    TransactionAborted(TxnId),
    #[error("No more rows")]
    NoMoreRows,
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::error::EncodeError> for DBError {
    fn from(e: bincode::error::EncodeError) -> Self {
        DBError::Serialization(e.to_string())
    }
}

impl From<bincode::error::DecodeError> for DBError {
    fn from(e: bincode::error::DecodeError) -> Self {
        DBError::Serialization(e.to_string())
    }
}
