use crate::client::ClientError;
use crate::resource::RemoteResource;

use super::{PollSpec, WaitError};

/// How a poll session ended.
#[derive(Debug)]
pub enum PollResult {
    Succeeded,
    TimedOut,
    Failed(FailureCause),
    NotFound,
}

#[derive(Debug)]
pub enum FailureCause {
    Transport(ClientError),
    /// A status in neither the pending nor the target set.
    TerminalStatus(String),
}

/// The terminal state of a poll session together with the last thing it saw.
#[derive(Debug)]
pub struct PollOutcome {
    pub resource: Option<RemoteResource>,
    pub result: PollResult,
    pub attempts: u32,
    /// Sub-errors attached to the last observed resource, one message each.
    /// Advisory: they are reported even when the session succeeded.
    pub diagnostics: Vec<String>,
}

impl PollOutcome {
    pub(super) fn new(resource: Option<RemoteResource>, result: PollResult, attempts: u32) -> Self {
        let diagnostics = resource
            .as_ref()
            .map(RemoteResource::error_messages)
            .unwrap_or_default();
        Self {
            resource,
            result,
            attempts,
            diagnostics,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, PollResult::Succeeded)
    }

    pub fn last_status(&self) -> Option<&str> {
        self.resource.as_ref().map(|r| r.status.as_str())
    }

    fn joined_diagnostics(&self) -> Option<String> {
        if self.diagnostics.is_empty() {
            None
        } else {
            Some(self.diagnostics.join("\n"))
        }
    }

    /// Collapse the outcome into the error taxonomy, keeping the resource on
    /// success. Sub-error text is attached to failures so callers can surface
    /// the richest message available.
    pub fn into_result(self, spec: &PollSpec) -> Result<Option<RemoteResource>, WaitError> {
        let last_error = self.joined_diagnostics();
        match self.result {
            PollResult::Succeeded => Ok(self.resource),
            PollResult::TimedOut => Err(WaitError::Timeout {
                target: spec.target_label(),
                last_status: self
                    .resource
                    .map(|r| r.status)
                    .unwrap_or_else(|| "absent".to_string()),
                timeout: spec.timeout(),
                last_error,
            }),
            PollResult::Failed(FailureCause::Transport(err)) => Err(WaitError::Transport(err)),
            PollResult::Failed(FailureCause::TerminalStatus(status)) => {
                Err(WaitError::TerminalStatus {
                    status,
                    target: spec.target_label(),
                    last_error,
                })
            }
            PollResult::NotFound => Err(WaitError::NotFound {
                checks: spec.not_found_checks(),
            }),
        }
    }
}
