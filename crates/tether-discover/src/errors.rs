use std::time::Duration;

use tether_core::ResolveError;
use tether_model::LeaseState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("discovery server answered {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("invalid discover config: {0}")]
    InvalidConfig(String),

    #[error("cannot {action} while lease is {state}")]
    InvalidTransition {
        action: &'static str,
        state: LeaseState,
    },

    #[error("no tokio runtime available to drive heartbeats")]
    NoRuntime,

    #[error("hostname unavailable: {0}")]
    Hostname(#[from] ResolveError),
}
