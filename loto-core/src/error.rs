use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LotoError>;

#[derive(Error, Debug)]
pub enum LotoError {
    #[error("Lottery not found: {lottery_id}")]
    NotFound { lottery_id: String },

    #[error("Invalid combination: {0}")]
    InvalidCombination(String),

    #[error("Combination repeated in block at positions {positions:?}")]
    DuplicateInBlock { positions: Vec<usize> },

    #[error("Generation exhausted: requested {requested}, only {available} possible")]
    GenerationExhausted { requested: usize, available: u128 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LotoError {
    pub fn not_found(lottery_id: impl Into<String>) -> Self {
        Self::NotFound {
            lottery_id: lottery_id.into(),
        }
    }

    pub fn invalid_combination(msg: impl Into<String>) -> Self {
        Self::InvalidCombination(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidCombination(_) => ErrorKind::InvalidCombination,
            Self::DuplicateInBlock { .. } => ErrorKind::DuplicateInBlock,
            Self::GenerationExhausted { .. } => ErrorKind::GenerationExhausted,
            Self::InvalidRequest(_) | Self::Serialization(_) => ErrorKind::InvalidRequest,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Storage(_) | Self::Io(_) => ErrorKind::Storage,
            Self::Config(_) => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Failure category exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    InvalidCombination,
    DuplicateInBlock,
    GenerationExhausted,
    InvalidRequest,
    Conflict,
    Storage,
    Config,
    Internal,
}

/// Serialized `{kind, message}` form of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}
