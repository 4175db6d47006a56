use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("hostname lookup failed: {0}")]
    Lookup(#[from] std::io::Error),
    #[error("hostname is not valid unicode")]
    NotUnicode,
    #[error("hostname lookup returned an empty name")]
    Empty,
    #[error("hostname lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("hostname lookup task aborted: {0}")]
    Aborted(String),
}
