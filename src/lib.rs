//! tfwait - status reconciliation for eventually consistent cloud resources
//!
//! A poller that waits for a remote status field to converge, the client
//! seam it polls through, and lifecycle adapters for Redshift integrations
//! and the OpsWorks layer family.

pub mod client;
pub mod resource;
pub mod services;
pub mod waiter;

mod error;

pub use client::{ClientError, HttpResourceClient, ResourceClient, StatusRefresh};
pub use error::{Error, Result};
pub use resource::{RemoteResource, ResourceError};
pub use waiter::{PollOutcome, PollResult, PollSpec, Refresh, WaitError, poll};
