use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

use crate::models::{ProbeOutcome, Status};
use crate::notify::NotificationSink;
use crate::store::StatusStore;

/// What to do with a fresh probe outcome given the stored status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub next: Status,
    pub notify: bool,
}

/// Alerts only on entering `Down`. Recoveries are silent.
pub fn decide(previous: Status, outcome: &ProbeOutcome) -> Decision {
    match outcome {
        ProbeOutcome::Up => Decision { next: Status::Up, notify: false },
        ProbeOutcome::Down(_) => Decision {
            next: Status::Down,
            notify: previous != Status::Down,
        },
    }
}

/// Upper bound on one notification call before the status is committed anyway.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TransitionDetector {
    store: StatusStore,
    sink: Arc<dyn NotificationSink>,
    notify_timeout: Duration,
}

impl TransitionDetector {
    pub fn new(store: StatusStore, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink, notify_timeout: DEFAULT_NOTIFY_TIMEOUT }
    }

    pub fn with_notify_timeout(mut self, notify_timeout: Duration) -> Self {
        self.notify_timeout = notify_timeout;
        self
    }

    /// Applies one probe outcome for `target` and returns the stored status.
    ///
    /// Each target has at most one probe in flight, so reading, notifying
    /// and then writing is atomic per target. The store lock is not held
    /// across the notification call.
    pub async fn apply(&self, target: &str, outcome: &ProbeOutcome) -> Status {
        let previous = self.store.get(target).await;
        let decision = decide(previous, outcome);

        if decision.notify {
            error!(url = target, from = %previous, reason = ?outcome, "[CHANGE] website went down");
            match timeout(self.notify_timeout, self.sink.notify(target)).await {
                Ok(Ok(())) => info!(url = target, "Notification sent"),
                Ok(Err(e)) => error!(url = target, error = %e, "Failed to send notification"),
                Err(_) => error!(
                    url = target,
                    timeout_ms = self.notify_timeout.as_millis() as u64,
                    "Notification timed out"
                ),
            }
        }

        self.store.set(target, decision.next).await;
        decision.next
    }
}
