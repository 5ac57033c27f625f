//! Polling of long-running backend operations.

use super::SdkError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_THROTTLE: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_TEMP_ERROR_RETRY_LIMIT: usize = 5;

/// Lifecycle of a backend operation as observed by polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Deleted,
    Cancelled,
}

impl OperationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationState::Pending | OperationState::Running)
    }

    fn as_str(&self) -> &'static str {
        match self {
            OperationState::Pending => "pending",
            OperationState::Running => "running",
            OperationState::Succeeded => "succeeded",
            OperationState::Failed => "failed",
            OperationState::Deleted => "deleted",
            OperationState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single poll.
#[derive(Debug)]
pub enum WaitStatus<T> {
    InProgress(OperationState),
    Done(T),
    Failed {
        state: OperationState,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("timed out after {timeout:?}, last observed state: {last_state}")]
    Timeout {
        timeout: Duration,
        last_state: OperationState,
    },

    #[error("operation ended in state {state}: {message}")]
    Failed {
        state: OperationState,
        message: String,
    },

    #[error("wait cancelled")]
    Cancelled,

    #[error(transparent)]
    Request(#[from] SdkError),
}

/// Drives an operation to a terminal state.
#[async_trait]
pub trait WaitHandler: Send {
    type Output: Send;

    async fn wait_with_context(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, WaitError>;
}

type CheckFn<T> = Box<dyn FnMut() -> BoxFuture<'static, Result<WaitStatus<T>, SdkError>> + Send>;

/// Wait handler that calls `check` every `throttle` until it reports a terminal status.
///
/// Gateway errors (502, 503, 504) and transport timeouts are tolerated up to
/// `temp_error_retry_limit` times in a row.
pub struct AsyncHandler<T> {
    check: CheckFn<T>,
    throttle: Duration,
    timeout: Duration,
    sleep_before_wait: Duration,
    temp_error_retry_limit: usize,
}

impl<T: Send + 'static> AsyncHandler<T> {
    pub fn new<F>(check: F) -> Self
    where
        F: FnMut() -> BoxFuture<'static, Result<WaitStatus<T>, SdkError>> + Send + 'static,
    {
        Self {
            check: Box::new(check),
            throttle: DEFAULT_THROTTLE,
            timeout: DEFAULT_TIMEOUT,
            sleep_before_wait: Duration::ZERO,
            temp_error_retry_limit: DEFAULT_TEMP_ERROR_RETRY_LIMIT,
        }
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sleep_before_wait(mut self, sleep: Duration) -> Self {
        self.sleep_before_wait = sleep;
        self
    }

    pub fn with_temp_error_retry_limit(mut self, limit: usize) -> Self {
        self.temp_error_retry_limit = limit;
        self
    }
}

async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> Result<(), WaitError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(WaitError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

#[async_trait]
impl<T: Send + 'static> WaitHandler for AsyncHandler<T> {
    type Output = T;

    async fn wait_with_context(&mut self, cancel: &CancellationToken) -> Result<T, WaitError> {
        if !self.sleep_before_wait.is_zero() {
            sleep_or_cancel(self.sleep_before_wait, cancel).await?;
        }

        let deadline = Instant::now() + self.timeout;
        let mut last_state = OperationState::Pending;
        let mut temp_errors = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(WaitError::Cancelled);
            }
            let poll = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(WaitError::Cancelled),
                r = (self.check)() => r,
            };

            match poll {
                Ok(WaitStatus::Done(value)) => return Ok(value),
                Ok(WaitStatus::Failed { state, message }) => {
                    return Err(WaitError::Failed { state, message })
                }
                Ok(WaitStatus::InProgress(state)) => {
                    last_state = state;
                    temp_errors = 0;
                }
                Err(SdkError::Cancelled) => return Err(WaitError::Cancelled),
                Err(e) if e.is_transient() && temp_errors < self.temp_error_retry_limit => {
                    temp_errors += 1;
                    tracing::debug!(
                        "transient error while waiting ({}/{}): {}",
                        temp_errors,
                        self.temp_error_retry_limit,
                        e
                    );
                }
                Err(e) => return Err(WaitError::Request(e)),
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(WaitError::Timeout {
                    timeout: self.timeout,
                    last_state,
                });
            }
            sleep_or_cancel(self.throttle.min(remaining), cancel).await?;
        }
    }
}
