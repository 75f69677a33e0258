use std::time::Duration;

use thiserror::Error;

use crate::client::ClientError;

/// Why a poll session did not converge.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The refresh call itself failed. Never retried by the poller.
    #[error("refreshing status: {0}")]
    Transport(#[from] ClientError),

    /// The resource reached a status outside both the pending and target sets.
    #[error("unexpected state '{status}', wanted target '{target}'{}", last_error_suffix(.last_error))]
    TerminalStatus {
        status: String,
        target: String,
        last_error: Option<String>,
    },

    #[error("timeout while waiting for state to become '{target}' (last state: '{last_status}', timeout: {timeout:?}){}", last_error_suffix(.last_error))]
    Timeout {
        target: String,
        last_status: String,
        timeout: Duration,
        last_error: Option<String>,
    },

    /// The resource never appeared even though a target status was expected.
    #[error("couldn't find resource ({checks} retries)")]
    NotFound { checks: u32 },
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(message) => format!(". last error: {}", message),
        None => String::new(),
    }
}

impl WaitError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
