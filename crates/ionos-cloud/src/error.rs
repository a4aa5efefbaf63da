//! Cloud error types

use crate::context::Interrupted;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by every IONOS Cloud lifecycle operation
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("no {kind} found with {field} = {value:?}")]
    NoMatch {
        kind: &'static str,
        field: &'static str,
        value: String,
    },

    #[error(
        "more than one {kind} found with {field} = {value:?} ({count} matches); \
         look the {kind} up by ID instead"
    )]
    Ambiguous {
        kind: &'static str,
        field: &'static str,
        value: String,
        count: usize,
    },

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error(
        "timed out after {elapsed:?} waiting for {kind} {id} (last status: {last_status}); \
         the operation may still complete in the background"
    )]
    Timeout {
        kind: &'static str,
        id: String,
        last_status: String,
        elapsed: Duration,
    },

    #[error("{reason} while waiting for {kind} {id}")]
    Cancelled {
        kind: &'static str,
        id: String,
        reason: String,
    },

    #[error("{kind} {id} reported status {status}: {message}")]
    Failed {
        kind: &'static str,
        id: String,
        status: String,
        message: String,
    },

    /// The create request succeeded but the resource never settled or could
    /// not be read back. `created` holds the state built from the create
    /// response, including values the API returns only once.
    #[error("{kind} {id} was created but did not become ready: {source}")]
    PartialCreate {
        kind: &'static str,
        id: String,
        created: serde_json::Value,
        #[source]
        source: Box<CloudError>,
    },

    #[error("{operation} {kind} {id}: {source}")]
    Operation {
        operation: &'static str,
        kind: &'static str,
        id: String,
        #[source]
        source: Box<CloudError>,
    },

    #[error("Unknown location {location:?} for {product} (known: {known})")]
    UnknownLocation {
        product: &'static str,
        location: String,
        known: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Cancellation or deadline expiry observed while working on `kind` `id`
    pub fn interrupted(kind: &'static str, id: impl Into<String>, reason: Interrupted) -> Self {
        CloudError::Cancelled {
            kind,
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// Failure after a successful create request, keeping the created state
    pub fn partial_create<S: serde::Serialize>(
        kind: &'static str,
        id: impl Into<String>,
        created: &S,
        source: CloudError,
    ) -> Self {
        let created = serde_json::to_value(created).unwrap_or_else(|e| {
            tracing::warn!(kind, error = %e, "Could not serialize created state");
            serde_json::Value::Null
        });
        CloudError::PartialCreate {
            kind,
            id: id.into(),
            created,
            source: Box::new(source),
        }
    }

    /// State captured from the create response of a partially created resource
    pub fn created(&self) -> Option<&serde_json::Value> {
        match self {
            CloudError::PartialCreate { created, .. } if !created.is_null() => Some(created),
            CloudError::Operation { source, .. } => source.created(),
            _ => None,
        }
    }

    /// Wrap an error with the operation, resource kind and ID it belongs to.
    ///
    /// Errors that already name their resource are returned untouched.
    pub fn during(self, operation: &'static str, kind: &'static str, id: impl Into<String>) -> Self {
        match self {
            e @ (CloudError::Operation { .. }
            | CloudError::Timeout { .. }
            | CloudError::Cancelled { .. }
            | CloudError::Failed { .. }
            | CloudError::PartialCreate { .. }
            | CloudError::NotFound { .. }) => e,
            other => CloudError::Operation {
                operation,
                kind,
                id: id.into(),
                source: Box::new(other),
            },
        }
    }

    /// HTTP status code of the underlying API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            CloudError::Api { status, .. } => Some(*status),
            CloudError::Http(e) => e.status().map(|s| s.as_u16()),
            CloudError::Operation { source, .. } | CloudError::PartialCreate { source, .. } => {
                source.status()
            }
            _ => None,
        }
    }

    /// Whether this error means the resource does not exist
    ///
    /// A partially created resource exists, whatever its read-back returned.
    pub fn is_not_found(&self) -> bool {
        match self {
            CloudError::NotFound { .. } => true,
            CloudError::PartialCreate { .. } => false,
            _ => self.status() == Some(404),
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            CloudError::Timeout { .. } => true,
            CloudError::Operation { source, .. } | CloudError::PartialCreate { source, .. } => {
                source.is_timeout()
            }
            _ => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            CloudError::Cancelled { .. } => true,
            CloudError::Operation { source, .. } | CloudError::PartialCreate { source, .. } => {
                source.is_cancelled()
            }
            _ => false,
        }
    }

    /// Whether retrying the same request cannot succeed without a change of input
    pub fn is_permanent(&self) -> bool {
        !(self.is_timeout() || self.is_cancelled())
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
