use std::collections::BTreeSet;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Floor for the pause between attempts; shorter intervals are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Describes one poll session: which statuses mean "keep waiting", which mean
/// "done", and how long to keep asking.
///
/// An empty target set means the session waits for the resource to disappear.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSpec {
    pending: BTreeSet<String>,
    target: BTreeSet<String>,
    interval: Duration,
    timeout: Duration,
    delay: Duration,
    not_found_checks: u32,
    target_occurrences: u32,
}

impl PollSpec {
    pub fn builder() -> PollSpecBuilder {
        PollSpecBuilder::default()
    }

    pub fn is_pending(&self, status: &str) -> bool {
        self.pending.contains(status)
    }

    pub fn is_target(&self, status: &str) -> bool {
        self.target.contains(status)
    }

    pub fn waits_for_absence(&self) -> bool {
        self.target.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn target(&self) -> impl Iterator<Item = &str> {
        self.target.iter().map(String::as_str)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn not_found_checks(&self) -> u32 {
        self.not_found_checks
    }

    pub fn target_occurrences(&self) -> u32 {
        self.target_occurrences
    }

    /// Human readable target, used in error messages.
    pub fn target_label(&self) -> String {
        if self.target.is_empty() {
            "absent".to_string()
        } else {
            self.target().collect::<Vec<_>>().join(", ")
        }
    }

    /// Same spec with a different deadline. Lifecycle adapters use this to
    /// apply per-operation timeouts to a shared status set.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }
}

#[derive(Debug, Clone)]
pub struct PollSpecBuilder {
    pending: BTreeSet<String>,
    target: BTreeSet<String>,
    interval: Duration,
    timeout: Duration,
    delay: Duration,
    not_found_checks: u32,
    target_occurrences: u32,
}

impl Default for PollSpecBuilder {
    fn default() -> Self {
        Self {
            pending: BTreeSet::new(),
            target: BTreeSet::new(),
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            delay: Duration::ZERO,
            not_found_checks: 1,
            target_occurrences: 1,
        }
    }
}

impl PollSpecBuilder {
    pub fn pending<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending.extend(statuses.into_iter().map(Into::into));
        self
    }

    pub fn target<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target.extend(statuses.into_iter().map(Into::into));
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait this long before the first refresh.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Consecutive absent observations required before absence is final.
    pub fn not_found_checks(mut self, checks: u32) -> Self {
        self.not_found_checks = checks;
        self
    }

    /// Consecutive target observations required before success.
    pub fn target_occurrences(mut self, occurrences: u32) -> Self {
        self.target_occurrences = occurrences;
        self
    }

    pub fn build(self) -> PollSpec {
        PollSpec {
            pending: self.pending,
            target: self.target,
            interval: self.interval.max(MIN_POLL_INTERVAL),
            timeout: self.timeout,
            delay: self.delay,
            not_found_checks: self.not_found_checks.max(1),
            target_occurrences: self.target_occurrences.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let spec = PollSpec::builder().build();
        assert_eq!(spec.interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(spec.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(spec.delay(), Duration::ZERO);
        assert_eq!(spec.not_found_checks(), 1);
        assert_eq!(spec.target_occurrences(), 1);
        assert!(spec.waits_for_absence());
    }

    #[test]
    fn test_zero_interval_raised_to_floor() {
        let spec = PollSpec::builder().interval(Duration::ZERO).build();
        assert_eq!(spec.interval(), MIN_POLL_INTERVAL);

        let spec = spec.with_interval(Duration::ZERO);
        assert_eq!(spec.interval(), MIN_POLL_INTERVAL);
    }

    #[test]
    fn test_builder_keeps_huge_timeout() {
        let spec = PollSpec::builder()
            .timeout(Duration::from_secs(u64::MAX))
            .delay(Duration::MAX)
            .build();
        assert_eq!(spec.timeout(), Duration::from_secs(u64::MAX));
        assert_eq!(spec.delay(), Duration::MAX);
    }

    #[test]
    fn test_builder_status_sets() {
        let spec = PollSpec::builder()
            .pending(["creating", "modifying"])
            .target(["active"])
            .build();
        assert!(spec.is_pending("creating"));
        assert!(spec.is_pending("modifying"));
        assert!(!spec.is_pending("active"));
        assert!(spec.is_target("active"));
        assert!(!spec.is_target("failed"));
        assert!(!spec.waits_for_absence());
    }

    #[test]
    fn test_counters_never_zero() {
        let spec = PollSpec::builder()
            .not_found_checks(0)
            .target_occurrences(0)
            .build();
        assert_eq!(spec.not_found_checks(), 1);
        assert_eq!(spec.target_occurrences(), 1);
    }

    #[test]
    fn test_target_label() {
        let deletion = PollSpec::builder().pending(["deleting"]).build();
        assert_eq!(deletion.target_label(), "absent");

        let creation = PollSpec::builder().target(["syncing", "active"]).build();
        assert_eq!(creation.target_label(), "active, syncing");
    }

    #[test]
    fn test_with_timeout_keeps_status_sets() {
        let spec = PollSpec::builder()
            .pending(["modifying"])
            .target(["active"])
            .build()
            .with_timeout(Duration::from_secs(5));
        assert_eq!(spec.timeout(), Duration::from_secs(5));
        assert!(spec.is_pending("modifying"));
        assert!(spec.is_target("active"));
    }
}
