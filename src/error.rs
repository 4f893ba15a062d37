//! Unified join error model.
//! Every failure raised while configuring a join tree or arranging rows maps to
//! one `JoinError` variant. All of them are deterministic: callers fix the join
//! definition or the upstream query, retrying never helps.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JoinError {
    /// Two sibling join ids collapse to the same alpha-numeric key.
    #[error("ambiguous_join: join '{join_id}' is ambiguous with existing join '{conflicts_with}'")]
    AmbiguousJoin { join_id: String, conflicts_with: String },
    #[error("join_not_found: join '{join}' not found")]
    JoinNotFound { join: String },
    #[error("missing_key: missing key '{key}' for table '{table}'")]
    MissingKey { key: String, table: String },
    #[error("unsplittable_field: field '{field}' cannot be split by separator '{separator}'")]
    UnsplittableField { field: String, separator: String },
    #[error("config_error: {message}")]
    Config { message: String },
    #[error("io_error: {message}")]
    Io { message: String },
}

impl JoinError {
    pub fn code_str(&self) -> &'static str {
        match self {
            JoinError::AmbiguousJoin { .. } => "ambiguous_join",
            JoinError::JoinNotFound { .. } => "join_not_found",
            JoinError::MissingKey { .. } => "missing_key",
            JoinError::UnsplittableField { .. } => "unsplittable_field",
            JoinError::Config { .. } => "config_error",
            JoinError::Io { .. } => "io_error",
        }
    }

    /// Human readable message without the leading code.
    pub fn message(&self) -> String {
        let full = self.to_string();
        match full.split_once(": ") {
            Some((_, msg)) => msg.to_string(),
            None => full,
        }
    }

    /// Raised while arranging rows, as opposed to configuration, lookups and I/O.
    pub fn is_structural(&self) -> bool {
        matches!(self, JoinError::MissingKey { .. } | JoinError::UnsplittableField { .. })
    }

    pub fn ambiguous<S: Into<String>>(join_id: S, conflicts_with: S) -> Self {
        JoinError::AmbiguousJoin { join_id: join_id.into(), conflicts_with: conflicts_with.into() }
    }
    pub fn not_found<S: Into<String>>(join: S) -> Self { JoinError::JoinNotFound { join: join.into() } }
    pub fn missing_key<S: Into<String>>(key: S, table: S) -> Self { JoinError::MissingKey { key: key.into(), table: table.into() } }
    pub fn unsplittable<S: Into<String>>(field: S, separator: S) -> Self {
        JoinError::UnsplittableField { field: field.into(), separator: separator.into() }
    }
    pub fn config<S: Into<String>>(msg: S) -> Self { JoinError::Config { message: msg.into() } }
}

pub type JoinResult<T> = Result<T, JoinError>;

impl From<serde_json::Error> for JoinError {
    fn from(err: serde_json::Error) -> Self {
        JoinError::Config { message: err.to_string() }
    }
}

impl From<std::io::Error> for JoinError {
    fn from(err: std::io::Error) -> Self {
        JoinError::Io { message: err.to_string() }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
