//! Poll-until-converged against an eventually consistent status field.
//!
//! A [`PollSpec`] says which statuses are still in flight and which mean the
//! operation is done; [`poll`] keeps asking a [`Refresh`] implementation until
//! the answer settles, the deadline passes, or something goes terminally
//! wrong. The poller never mutates the remote resource.

mod error;
mod outcome;
mod spec;

pub use error::WaitError;
pub use outcome::{FailureCause, PollOutcome, PollResult};
pub use spec::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, MIN_POLL_INTERVAL, PollSpec, PollSpecBuilder};

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep_until, timeout_at};

use crate::client::ClientError;
use crate::resource::RemoteResource;

/// One status lookup. `Ok(None)` is an explicit absence.
///
/// Implementations must be idempotent; the poller calls them repeatedly.
#[async_trait]
pub trait Refresh: Send + Sync {
    async fn refresh(&self) -> Result<Option<RemoteResource>, ClientError>;
}

/// Adapts an async closure into a [`Refresh`].
pub struct FnRefresh<F>(F);

pub fn refresh_fn<F, Fut>(f: F) -> FnRefresh<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<RemoteResource>, ClientError>> + Send,
{
    FnRefresh(f)
}

#[async_trait]
impl<F, Fut> Refresh for FnRefresh<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<RemoteResource>, ClientError>> + Send,
{
    async fn refresh(&self) -> Result<Option<RemoteResource>, ClientError> {
        (self.0)().await
    }
}

/// Drive one poll session to a terminal outcome.
///
/// The deadline bounds both the sleep between attempts and the refresh call
/// in flight, so a hung lookup cannot hold the session past its timeout.
pub async fn poll<R>(spec: &PollSpec, refresh: &R) -> PollOutcome
where
    R: Refresh + ?Sized,
{
    let deadline = instant_after(spec.timeout());

    let mut attempts = 0u32;
    let mut not_found = 0u32;
    let mut target_seen = 0u32;
    let mut last: Option<RemoteResource> = None;

    if !spec.delay().is_zero() {
        sleep_until(deadline.min(instant_after(spec.delay()))).await;
    }

    loop {
        if Instant::now() >= deadline {
            tracing::debug!(attempts, "poll deadline exceeded");
            return PollOutcome::new(last, PollResult::TimedOut, attempts);
        }

        attempts += 1;
        let observed = match timeout_at(deadline, refresh.refresh()).await {
            Err(_) => {
                tracing::debug!(attempts, "refresh still in flight at deadline");
                return PollOutcome::new(last, PollResult::TimedOut, attempts);
            }
            Ok(Err(err)) => {
                tracing::debug!(attempts, error = %err, "refresh failed");
                return PollOutcome::new(
                    last,
                    PollResult::Failed(FailureCause::Transport(err)),
                    attempts,
                );
            }
            Ok(Ok(observed)) => observed,
        };

        match observed {
            None => {
                not_found += 1;
                target_seen = 0;
                tracing::debug!(attempts, not_found, "resource absent");

                if not_found >= spec.not_found_checks() {
                    if spec.waits_for_absence() {
                        return PollOutcome::new(None, PollResult::Succeeded, attempts);
                    }
                    return PollOutcome::new(last, PollResult::NotFound, attempts);
                }
            }
            Some(resource) => {
                not_found = 0;
                tracing::debug!(
                    attempts,
                    id = %resource.id,
                    status = %resource.status,
                    "resource observed"
                );

                if spec.is_target(&resource.status) {
                    target_seen += 1;
                    if target_seen >= spec.target_occurrences() {
                        let outcome =
                            PollOutcome::new(Some(resource), PollResult::Succeeded, attempts);
                        for message in &outcome.diagnostics {
                            tracing::warn!(
                                diagnostic = %message,
                                "resource converged with errors attached"
                            );
                        }
                        return outcome;
                    }
                } else if spec.is_pending(&resource.status) {
                    target_seen = 0;
                } else {
                    let status = resource.status.clone();
                    return PollOutcome::new(
                        Some(resource),
                        PollResult::Failed(FailureCause::TerminalStatus(status)),
                        attempts,
                    );
                }

                last = Some(resource);
            }
        }

        sleep_until(deadline.min(instant_after(spec.interval()))).await;
    }
}

// Roughly 30 years; the same horizon tokio uses for "never".
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + duration`, saturating at a far-future instant instead of
/// overflowing for huge durations.
fn instant_after(duration: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(duration.min(FAR_FUTURE)).unwrap_or(now)
}
