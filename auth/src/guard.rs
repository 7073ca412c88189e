//! Wall-clock guard around one logical operation.

use std::fmt;
use std::time::Duration;

use crate::error::AuthError;

/// The three guarded operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    SignUp,
    SignIn,
    SignOut,
}

impl OpKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::SignUp => "sign_up",
            OpKind::SignIn => "sign_in",
            OpKind::SignOut => "sign_out",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one guarded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpState {
    Idle,
    Pending,
    Succeeded,
    Failed,
    TimedOut,
}

/// Per-operation wall-clock budgets. Injectable so tests can shrink them.
#[derive(Debug, Clone, Copy)]
pub struct GuardBudgets {
    pub sign_up: Duration,
    pub sign_in: Duration,
    pub sign_out: Duration,
}

impl Default for GuardBudgets {
    fn default() -> Self {
        Self {
            sign_up: Duration::from_secs(10),
            sign_in: Duration::from_secs(10),
            sign_out: Duration::from_secs(5),
        }
    }
}

impl GuardBudgets {
    #[must_use]
    pub fn for_op(&self, op: OpKind) -> Duration {
        match op {
            OpKind::SignUp => self.sign_up,
            OpKind::SignIn => self.sign_in,
            OpKind::SignOut => self.sign_out,
        }
    }
}

/// Runs `future` under `budget`.
///
/// The work is spawned, not raced in place: on expiry the caller stops
/// waiting and the in-flight request keeps running to completion, whose
/// late result is discarded. This mirrors a backend SDK with no
/// cancellation; the tolerated consequence is a late idempotent write to
/// the store.
pub(crate) async fn guarded<T, F>(op: OpKind, budget: Duration, future: F) -> Result<T, AuthError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, AuthError>> + Send + 'static,
{
    tracing::debug!(op = op.as_str(), state = ?OpState::Pending, "Auth operation started");

    let in_flight = tokio::spawn(future);
    match tokio::time::timeout(budget, in_flight).await {
        Ok(Ok(Ok(value))) => {
            tracing::debug!(op = op.as_str(), state = ?OpState::Succeeded, "Auth operation finished");
            Ok(value)
        }
        Ok(Ok(Err(err))) => {
            tracing::debug!(
                op = op.as_str(),
                state = ?OpState::Failed,
                kind = %err.kind,
                "Auth operation failed"
            );
            Err(err)
        }
        Ok(Err(join_err)) => {
            tracing::error!(op = op.as_str(), %join_err, "Auth operation task died");
            Err(AuthError::new(
                kampos_types::ErrorKind::Backend,
                format!("internal failure in {op}: {join_err}"),
            ))
        }
        Err(_elapsed) => {
            tracing::warn!(
                op = op.as_str(),
                state = ?OpState::TimedOut,
                ?budget,
                "Auth operation exceeded its budget; the in-flight request is left to finish"
            );
            Err(AuthError::timeout(op))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{GuardBudgets, OpKind, guarded};
    use kampos_types::ErrorKind;

    #[test]
    fn default_budgets_match_the_contract() {
        let budgets = GuardBudgets::default();
        assert_eq!(budgets.for_op(OpKind::SignUp), Duration::from_secs(10));
        assert_eq!(budgets.for_op(OpKind::SignIn), Duration::from_secs(10));
        assert_eq!(budgets.for_op(OpKind::SignOut), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn fast_operation_passes_through() {
        let result = guarded(OpKind::SignIn, Duration::from_secs(1), async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn slow_operation_times_out_without_killing_it() {
        let result: Result<u32, _> = guarded(OpKind::SignIn, Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(1)
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn late_completion_is_discarded_but_still_runs() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let result: Result<(), _> = guarded(OpKind::SignOut, Duration::from_millis(10), async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;
        assert_eq!(result.unwrap_err().kind, ErrorKind::Timeout);

        // The spawned work was not cancelled by the expiry.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(finished.load(Ordering::SeqCst));
    }
}
