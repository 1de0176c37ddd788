use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Per-field validation messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding exactly one message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when empty, otherwise a [`ChirpError::Validation`].
    pub fn into_result(self) -> ChirpResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ChirpError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field} {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ChirpError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("account has not been activated")]
    AccountNotActivated,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("notification error: {0}")]
    Notification(String),

    #[error("crypto error: {0}")]
    Crypto(String),
}

impl ChirpError {
    /// Persistence failures may or may not have been applied; callers may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChirpError::Storage(_))
    }
}

pub type ChirpResult<T> = Result<T, ChirpError>;
