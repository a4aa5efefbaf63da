//! Resource lifecycle contract
//!
//! Every managed IONOS resource (monitoring pipeline, access key, ...)
//! implements [`ManagedResource`] so that callers can drive create, read,
//! update and delete the same way regardless of the product behind it.

use crate::backoff::BackoffPolicy;
use crate::context::OperationContext;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout applied to each lifecycle operation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Identifies a cloud entity by ID and location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Human readable resource kind (e.g., "pipeline", "access key")
    pub kind: &'static str,

    /// Server-assigned ID
    pub id: String,

    /// Location code selecting the regional endpoint (may be empty)
    pub location: String,
}

impl ResourceRef {
    pub fn new(kind: &'static str, id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            location: location.into(),
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.location.is_empty() {
            write!(f, "{} {}", self.kind, self.id)
        } else {
            write!(f, "{} {} ({})", self.kind, self.id, self.location)
        }
    }
}

/// Lifecycle operation, used to label errors and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed lifecycle state of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    /// Provisioning or updating
    Pending,
    /// Ready for use
    Available,
    /// Provisioning failed; will not converge
    Failed,
    /// Deletion in progress
    PendingDelete,
    /// Deleted
    Gone,
    /// Status string not recognised
    Unknown,
}

impl ResourceStatus {
    /// Map an API metadata status string onto the lifecycle states
    pub fn from_api(status: &str) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "AVAILABLE" | "ACTIVE" | "READY" => ResourceStatus::Available,
            "PROVISIONING" | "BUSY" | "UPDATING" | "DEPLOYING" | "CREATING" | "PENDING" => {
                ResourceStatus::Pending
            }
            "FAILED" | "FAILED_PROVISIONING" | "FAILED_UPDATING" | "FAILED_DESTROYING" | "ERROR" => {
                ResourceStatus::Failed
            }
            "DESTROYING" | "DELETING" => ResourceStatus::PendingDelete,
            "DELETED" | "GONE" => ResourceStatus::Gone,
            _ => ResourceStatus::Unknown,
        }
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceStatus::Pending => "pending",
            ResourceStatus::Available => "available",
            ResourceStatus::Failed => "failed",
            ResourceStatus::PendingDelete => "pending delete",
            ResourceStatus::Gone => "gone",
            ResourceStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Per-operation timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::uniform(DEFAULT_TIMEOUT)
    }
}

impl Timeouts {
    /// Same timeout for every operation; zero selects [`DEFAULT_TIMEOUT`]
    pub fn uniform(timeout: Duration) -> Self {
        let timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };
        Self {
            create: timeout,
            read: timeout,
            update: timeout,
            delete: timeout,
        }
    }

    pub fn for_operation(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
            Operation::Read => self.read,
        }
    }

    /// Backoff policy whose budget is the timeout of `operation`
    pub fn backoff(&self, operation: Operation) -> BackoffPolicy {
        BackoffPolicy::with_max_elapsed(self.for_operation(operation))
    }
}

/// Lifecycle of a managed resource
///
/// `Spec` is the desired state (the mutable inputs), `State` the full observed
/// state including computed fields.
#[async_trait]
pub trait ManagedResource: Send + Sync {
    type Spec: Send + Sync;
    type State: Send + Sync;

    /// Resource kind used in errors and logs
    fn kind(&self) -> &'static str;

    /// Create the resource and wait until it is available.
    ///
    /// Fails with `PartialCreate` when the create request succeeded but the
    /// resource did not settle or could not be read back; the error carries
    /// the state built from the create response.
    async fn create(
        &self,
        ctx: &OperationContext,
        location: &str,
        spec: &Self::Spec,
    ) -> Result<Self::State>;

    /// Read the resource. `Ok(None)` means it was deleted out-of-band and
    /// should be dropped from tracked state.
    async fn read(
        &self,
        ctx: &OperationContext,
        id: &str,
        location: &str,
    ) -> Result<Option<Self::State>>;

    /// Apply `spec` and wait until the resource is available again.
    ///
    /// Fields missing from the API response keep their `prior` values.
    async fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        location: &str,
        spec: &Self::Spec,
        prior: &Self::State,
    ) -> Result<Self::State>;

    /// Delete the resource and wait until reads report it gone.
    async fn delete(&self, ctx: &OperationContext, id: &str, location: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ResourceStatus::from_api("AVAILABLE"), ResourceStatus::Available);
        assert_eq!(ResourceStatus::from_api("provisioning"), ResourceStatus::Pending);
        assert_eq!(ResourceStatus::from_api("FAILED"), ResourceStatus::Failed);
        assert_eq!(ResourceStatus::from_api("DESTROYING"), ResourceStatus::PendingDelete);
        assert_eq!(ResourceStatus::from_api("deleted"), ResourceStatus::Gone);
        assert_eq!(ResourceStatus::from_api("SOMETHING"), ResourceStatus::Unknown);
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let timeouts = Timeouts::uniform(Duration::ZERO);
        assert_eq!(timeouts.create, DEFAULT_TIMEOUT);
        assert_eq!(timeouts.backoff(Operation::Delete).max_elapsed, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_resource_ref_display() {
        let r = ResourceRef::new("pipeline", "p-1", "de/fra");
        assert_eq!(r.to_string(), "pipeline p-1 (de/fra)");
        let r = ResourceRef::new("access key", "ak-1", "");
        assert_eq!(r.to_string(), "access key ak-1");
    }
}
