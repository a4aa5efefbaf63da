//! Cancellation and deadline handling for long-running operations

use crate::error::CloudError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a sleep ended early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    /// The context was cancelled by its owner (e.g. Ctrl-C)
    Cancelled,
    /// The caller's deadline passed
    DeadlineExceeded,
}

impl std::fmt::Display for Interrupted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interrupted::Cancelled => write!(f, "operation cancelled"),
            Interrupted::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Per-invocation context carried through every lifecycle operation
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl OperationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline_in(timeout)
    }

    /// Narrow the deadline; an earlier existing deadline is kept
    pub fn deadline_in(mut self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        });
        self
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns why the context is no longer usable, if it is not
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.token.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Interrupted::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive `fut` to completion unless the context ends first
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Interrupted> {
        self.check()?;

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => Err(Interrupted::Cancelled),
                    _ = tokio::time::sleep_until(deadline) => Err(Interrupted::DeadlineExceeded),
                    out = fut => Ok(out),
                }
            }
            None => {
                tokio::select! {
                    _ = self.token.cancelled() => Err(Interrupted::Cancelled),
                    out = fut => Ok(out),
                }
            }
        }
    }

    /// Like [`run`](Self::run) for an API call on `kind` `id`; an
    /// interruption becomes [`CloudError::Cancelled`]
    pub async fn call<T, F>(&self, kind: &'static str, id: &str, fut: F) -> crate::Result<T>
    where
        F: Future<Output = crate::Result<T>>,
    {
        self.run(fut)
            .await
            .map_err(|reason| CloudError::interrupted(kind, id, reason))?
    }

    /// Sleep for `duration` unless cancelled or past the deadline first
    pub async fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        self.check()?;

        let wake = Instant::now() + duration;
        match self.deadline {
            Some(deadline) if deadline <= wake => {
                tokio::select! {
                    _ = self.token.cancelled() => Err(Interrupted::Cancelled),
                    _ = tokio::time::sleep_until(deadline) => Err(Interrupted::DeadlineExceeded),
                }
            }
            _ => {
                tokio::select! {
                    _ = self.token.cancelled() => Err(Interrupted::Cancelled),
                    _ = tokio::time::sleep_until(wake) => Ok(()),
                }
            }
        }
    }
}
