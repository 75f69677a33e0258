//! Lifecycle adapters: each mutating call against a remote service followed
//! by one poll session.

pub mod opsworks;
pub mod redshift;

use std::fmt;

use thiserror::Error;

use crate::client::ClientError;
use crate::waiter::WaitError;
use opsworks::LayerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Creating,
    Reading,
    Updating,
    Deleting,
    Registering,
    Deregistering,
    Attaching,
    Detaching,
}

impl Action {
    /// Noun form used in wait messages, e.g. `create`.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Creating => "create",
            Self::Reading => "read",
            Self::Updating => "update",
            Self::Deleting => "delete",
            Self::Registering => "register",
            Self::Deregistering => "deregister",
            Self::Attaching => "attach",
            Self::Detaching => "detach",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Creating => "creating",
            Self::Reading => "reading",
            Self::Updating => "updating",
            Self::Deleting => "deleting",
            Self::Registering => "registering",
            Self::Deregistering => "deregistering",
            Self::Attaching => "attaching",
            Self::Detaching => "detaching",
        };
        f.write_str(verb)
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{action} {resource} ({name}): {source}")]
    Client {
        action: Action,
        resource: &'static str,
        name: String,
        source: ClientError,
    },

    /// The mutating call went through but the resource never converged. The
    /// identifier is kept so the caller can record the object as tainted.
    #[error("waiting for {resource} ({id}) {op}: {source}", op = .action.operation())]
    Wait {
        action: Action,
        resource: &'static str,
        id: String,
        source: WaitError,
    },

    /// A side call tied to the resource, e.g. attaching a load balancer.
    /// `target` names the other object involved.
    #[error("{action} {resource} ({name}) {target}: {source}")]
    Association {
        action: Action,
        resource: &'static str,
        name: String,
        target: String,
        source: ClientError,
    },

    #[error("{action} {resource}: empty output")]
    EmptyOutput {
        action: Action,
        resource: &'static str,
    },

    #[error("changing '{attribute}' requires replacing the resource")]
    RequiresReplacement { attribute: String },

    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error("invalid {resource} JSON: {source}")]
    Json {
        resource: &'static str,
        source: serde_json::Error,
    },
}

impl LifecycleError {
    /// Identifier of a resource that exists remotely but failed to settle.
    pub fn tainted_id(&self) -> Option<&str> {
        match self {
            Self::Wait { id, .. } => Some(id),
            _ => None,
        }
    }
}
