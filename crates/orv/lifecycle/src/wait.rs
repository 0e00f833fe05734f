//! Bounded polling for an observed container status.

use crate::error::{LifecycleError, LifecycleResult};
use async_trait::async_trait;
use orv_runtime::{ContainerStatus, RuntimeCli, RuntimeResult};
use std::time::Duration;
use tokio::time::Instant;

/// Smallest poll interval used, so a zero interval cannot spin.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Longest wait honored; larger `max_wait` values are clamped to it.
pub const MAX_WAIT_CEILING: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Deadline and cadence of a status wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

impl WaitPolicy {
    pub fn new(max_wait: Duration, poll_interval: Duration) -> Self {
        Self {
            max_wait,
            poll_interval,
        }
    }

    /// Poll interval actually slept between queries.
    pub fn effective_poll_interval(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Anything that can report the current status of an instance.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn status(&self, id: &str) -> RuntimeResult<ContainerStatus>;
}

#[async_trait]
impl<T: RuntimeCli + ?Sized> StatusSource for T {
    async fn status(&self, id: &str) -> RuntimeResult<ContainerStatus> {
        Ok(self.state(id).await?.status)
    }
}

/// Query `source` until it reports `target` or `policy.max_wait` elapses.
///
/// The first query happens immediately. Sleeps never overshoot the deadline,
/// and one last query is made at the deadline before giving up, so the call
/// returns within `max_wait` plus query time. A failed query ends the wait.
pub async fn wait_for_status<S>(
    source: &S,
    id: &str,
    target: ContainerStatus,
    policy: WaitPolicy,
) -> LifecycleResult<ContainerStatus>
where
    S: StatusSource + ?Sized,
{
    let poll = policy.effective_poll_interval();
    let started = Instant::now();
    let deadline = started
        .checked_add(policy.max_wait)
        .unwrap_or_else(|| started + MAX_WAIT_CEILING);

    loop {
        let status = source.status(id).await?;
        tracing::debug!(id, %status, %target, "polled status");
        if status == target {
            return Ok(status);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(LifecycleError::StatusWaitTimeout {
                target,
                last_observed: status,
                waited: now - started,
            });
        }
        tokio::time::sleep(poll.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orv_runtime::{RuntimeAction, RuntimeError};
    use std::sync::Mutex;

    /// Replays a fixed sequence of statuses; the last one repeats forever.
    struct Scripted {
        statuses: Mutex<Vec<ContainerStatus>>,
        queries: Mutex<usize>,
    }

    impl Scripted {
        fn new(statuses: &[ContainerStatus]) -> Self {
            let mut statuses = statuses.to_vec();
            statuses.reverse();
            Self {
                statuses: Mutex::new(statuses),
                queries: Mutex::new(0),
            }
        }

        fn queries(&self) -> usize {
            *self.queries.lock().unwrap()
        }
    }

    #[async_trait]
    impl StatusSource for Scripted {
        async fn status(&self, _id: &str) -> RuntimeResult<ContainerStatus> {
            *self.queries.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                Ok(statuses.pop().unwrap())
            } else {
                Ok(statuses[0])
            }
        }
    }

    struct Failing;

    #[async_trait]
    impl StatusSource for Failing {
        async fn status(&self, id: &str) -> RuntimeResult<ContainerStatus> {
            Err(RuntimeError::ActionFailed {
                action: RuntimeAction::State,
                id: id.to_string(),
                code: Some(1),
                stderr: "container does not exist".into(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_immediately_when_already_in_target() {
        let source = Scripted::new(&[ContainerStatus::Stopped]);
        let started = Instant::now();
        let status = wait_for_status(&source, "c1", ContainerStatus::Stopped, WaitPolicy::default())
            .await
            .unwrap();
        assert_eq!(status, ContainerStatus::Stopped);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(source.queries(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_target_observed() {
        let source = Scripted::new(&[
            ContainerStatus::Running,
            ContainerStatus::Running,
            ContainerStatus::Running,
            ContainerStatus::Stopped,
        ]);
        let started = Instant::now();
        wait_for_status(&source, "c1", ContainerStatus::Stopped, WaitPolicy::default())
            .await
            .unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(3));
        assert_eq!(source.queries(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_at_deadline() {
        let source = Scripted::new(&[ContainerStatus::Running]);
        let policy = WaitPolicy::new(Duration::from_secs(10), Duration::from_secs(3));
        let started = Instant::now();

        let err = wait_for_status(&source, "c1", ContainerStatus::Stopped, policy)
            .await
            .unwrap_err();

        match err {
            LifecycleError::StatusWaitTimeout {
                target,
                last_observed,
                waited,
            } => {
                assert_eq!(target, ContainerStatus::Stopped);
                assert_eq!(last_observed, ContainerStatus::Running);
                assert_eq!(waited, Duration::from_secs(10));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(started.elapsed() <= policy.max_wait + policy.poll_interval);
        // queries at 0s, 3s, 6s, 9s and the deadline
        assert_eq!(source.queries(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_max_wait_queries_once() {
        let source = Scripted::new(&[ContainerStatus::Created]);
        let policy = WaitPolicy::new(Duration::ZERO, Duration::from_secs(1));
        let err = wait_for_status(&source, "c1", ContainerStatus::Stopped, policy)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(source.queries(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_poll_interval_is_clamped() {
        let source = Scripted::new(&[ContainerStatus::Running]);
        let policy = WaitPolicy::new(Duration::from_millis(5), Duration::ZERO);
        let err = wait_for_status(&source, "c1", ContainerStatus::Stopped, policy)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(source.queries(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_max_wait_still_polls() {
        let source = Scripted::new(&[ContainerStatus::Running, ContainerStatus::Stopped]);
        let policy = WaitPolicy::new(Duration::from_secs(u64::MAX), Duration::from_millis(1));

        let status = tokio::time::timeout(
            Duration::from_millis(50),
            wait_for_status(&source, "c1", ContainerStatus::Stopped, policy),
        )
        .await
        .expect("wait finished")
        .unwrap();

        assert_eq!(status, ContainerStatus::Stopped);
        assert_eq!(source.queries(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_failure_ends_wait() {
        let err = wait_for_status(&Failing, "c1", ContainerStatus::Stopped, WaitPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Runtime(_)));
        assert_eq!(err.stderr(), Some("container does not exist"));
    }
}
