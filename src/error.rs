//! Error type shared by the table engine and the dictionary layer.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DictError {
    /// The requested key has no entry and no default was supplied.
    #[error("key not found: {0:?}")]
    KeyNotFound(String),
    /// Growing past `bucket_count` would overflow `usize` or the
    /// replacement bucket array could not be allocated.
    #[error("capacity overflow while growing from {bucket_count} buckets")]
    CapacityOverflow { bucket_count: usize },
}

impl DictError {
    pub(crate) fn key_not_found(key: &str) -> Self {
        DictError::KeyNotFound(key.to_owned())
    }
}

pub type Result<T> = core::result::Result<T, DictError>;
