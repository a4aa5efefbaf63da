//! Condition poller
//!
//! Drives a caller-supplied check until the resource converges, the check
//! reports a permanent failure, the backoff budget runs out, or the
//! operation context is cancelled.
//!
//! ```ignore
//! poll_until(&ctx, &target, &policy, || async {
//!     match api.get(&endpoint, &id).await {
//!         Ok(p) if p.status() == "AVAILABLE" => Progress::Converged,
//!         Ok(p) => Progress::pending(p.status()),
//!         Err(e) => Progress::Failed(e),
//!     }
//! })
//! .await?;
//! ```

use crate::backoff::BackoffPolicy;
use crate::context::{Interrupted, OperationContext};
use crate::error::{CloudError, Result};
use crate::resource::{ResourceRef, ResourceStatus};
use std::future::Future;

/// Status reported while no observation has been made yet
const NOT_OBSERVED: &str = "not observed";

/// Outcome of one convergence check
#[derive(Debug)]
pub enum Progress {
    /// Desired state reached (available for create/update, gone for delete)
    Converged,
    /// Not there yet; the observed status is kept for the timeout message
    Pending { status: String },
    /// Retrying cannot help
    Failed(CloudError),
}

impl Progress {
    pub fn pending(status: impl Into<String>) -> Self {
        Progress::Pending {
            status: status.into(),
        }
    }
}

/// Poll `check` until it converges.
///
/// Exactly one call of `check` happens per iteration; sleeps between calls
/// follow `policy` and end early when `ctx` is cancelled or expires.
pub async fn poll_until<F, Fut>(
    ctx: &OperationContext,
    target: &ResourceRef,
    policy: &BackoffPolicy,
    mut check: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Progress>,
{
    let mut backoff = policy.start();
    let mut last_status = NOT_OBSERVED.to_string();
    let mut attempt = 0u32;

    loop {
        if let Err(reason) = ctx.check() {
            return Err(cancelled(target, reason));
        }

        attempt += 1;
        let progress = match ctx.run(check()).await {
            Ok(progress) => progress,
            Err(reason) => return Err(cancelled(target, reason)),
        };
        match progress {
            Progress::Converged => {
                tracing::info!(
                    kind = target.kind,
                    id = %target.id,
                    attempt,
                    elapsed_ms = backoff.elapsed().as_millis() as u64,
                    "Resource converged"
                );
                return Ok(());
            }
            Progress::Failed(e) => {
                tracing::debug!(kind = target.kind, id = %target.id, attempt, error = %e, "Check failed permanently");
                return Err(e.during("wait for", target.kind, target.id.clone()));
            }
            Progress::Pending { status } => {
                last_status = status;
            }
        }

        let Some(delay) = backoff.next_delay() else {
            tracing::warn!(
                kind = target.kind,
                id = %target.id,
                status = %last_status,
                attempt,
                "Gave up waiting for resource"
            );
            return Err(CloudError::Timeout {
                kind: target.kind,
                id: target.id.clone(),
                last_status,
                elapsed: backoff.elapsed(),
            });
        };

        tracing::debug!(
            kind = target.kind,
            id = %target.id,
            status = %last_status,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Resource not ready, retrying"
        );

        if let Err(reason) = ctx.sleep(delay).await {
            return Err(cancelled(target, reason));
        }
    }
}

fn cancelled(target: &ResourceRef, reason: Interrupted) -> CloudError {
    CloudError::interrupted(target.kind, target.id.clone(), reason)
}

/// An API representation that carries a lifecycle status string
pub trait Observed {
    /// Raw status, `UNKNOWN` when the API sent none
    fn status(&self) -> &str;

    fn status_message(&self) -> Option<&str> {
        None
    }

    fn resource_status(&self) -> ResourceStatus {
        ResourceStatus::from_api(self.status())
    }
}

/// Readiness check after create or update.
///
/// Available converges and a failed state is final. A 404 stays pending,
/// since freshly created resources can lag behind in reads.
pub fn ready<T: Observed>(target: &ResourceRef, observed: Result<T>) -> Progress {
    match observed {
        Ok(resource) => match resource.resource_status() {
            ResourceStatus::Available => Progress::Converged,
            ResourceStatus::Failed => Progress::Failed(CloudError::Failed {
                kind: target.kind,
                id: target.id.clone(),
                status: resource.status().to_string(),
                message: resource
                    .status_message()
                    .unwrap_or("provisioning failed")
                    .to_string(),
            }),
            _ => Progress::pending(resource.status()),
        },
        Err(e) if e.is_not_found() => Progress::pending("NOT_FOUND"),
        Err(e) => Progress::Failed(e),
    }
}

/// Deletion check: 404 converges, anything still readable is pending
pub fn gone<T: Observed>(observed: Result<T>) -> Progress {
    match observed {
        Ok(resource) => Progress::pending(resource.status()),
        Err(e) if e.is_not_found() => Progress::Converged,
        Err(e) => Progress::Failed(e),
    }
}

/// Poll `read` with [`ready`] until the resource is available
pub async fn wait_ready<T, F, Fut>(
    ctx: &OperationContext,
    target: &ResourceRef,
    policy: &BackoffPolicy,
    read: F,
) -> Result<()>
where
    T: Observed,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    poll_until(ctx, target, policy, || {
        let observed = read();
        async move { ready(target, observed.await) }
    })
    .await
}

/// Poll `read` with [`gone`] until the resource reads as 404
pub async fn wait_gone<T, F, Fut>(
    ctx: &OperationContext,
    target: &ResourceRef,
    policy: &BackoffPolicy,
    read: F,
) -> Result<()>
where
    T: Observed,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    poll_until(ctx, target, policy, || {
        let observed = read();
        async move { gone(observed.await) }
    })
    .await
}
